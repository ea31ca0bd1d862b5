use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub auth: FileAuthConfig,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileDatabaseConfig {
    pub url: Option<String>,
    pub max_open_conns: Option<u32>,
    pub max_idle_conns: Option<u32>,
    /// humantime string, e.g. `"15m"`.
    pub max_idle_time: Option<String>,
    /// humantime string, e.g. `"3s"`.
    pub query_timeout: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileAuthConfig {
    pub password_pepper: Option<String>,
}

/// Environment-derived configuration values, still unparsed.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub database_url: Option<String>,
    pub max_open_conns: Option<String>,
    pub max_idle_conns: Option<String>,
    pub max_idle_time: Option<String>,
    pub query_timeout: Option<String>,
    pub auth_password_pepper: Option<String>,
}

impl EnvConfig {
    pub const CONFIG_PATH: &'static str = "MARQUEE_CONFIG";
    pub const DATABASE_URL: &'static str = "DATABASE_URL";
    pub const MAX_OPEN_CONNS: &'static str = "DB_MAX_OPEN_CONNS";
    pub const MAX_IDLE_CONNS: &'static str = "DB_MAX_IDLE_CONNS";
    pub const MAX_IDLE_TIME: &'static str = "DB_MAX_IDLE_TIME";
    pub const QUERY_TIMEOUT: &'static str = "DB_QUERY_TIMEOUT";
    pub const AUTH_PASSWORD_PEPPER: &'static str = "AUTH_PASSWORD_PEPPER";

    /// Read from the process environment.
    pub fn gather() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read from a fixed set of variables instead of the process environment.
    pub fn from_map(vars: &HashMap<String, String>) -> Self {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            config_path: var(Self::CONFIG_PATH).map(PathBuf::from),
            database_url: var(Self::DATABASE_URL),
            max_open_conns: var(Self::MAX_OPEN_CONNS),
            max_idle_conns: var(Self::MAX_IDLE_CONNS),
            max_idle_time: var(Self::MAX_IDLE_TIME),
            query_timeout: var(Self::QUERY_TIMEOUT),
            // An explicitly empty pepper is a deliberate choice, keep it.
            auth_password_pepper: lookup(Self::AUTH_PASSWORD_PEPPER),
        }
    }
}
