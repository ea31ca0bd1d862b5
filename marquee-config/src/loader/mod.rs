pub mod error;

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use once_cell::sync::Lazy;
use url::Url;

use crate::models::sources::{EnvConfig, FileConfig};
use crate::models::{
    AuthConfig, Config, ConfigMetadata, DEFAULT_MAX_IDLE_CONNS,
    DEFAULT_MAX_IDLE_TIME, DEFAULT_MAX_OPEN_CONNS, DEFAULT_QUERY_TIMEOUT,
    DatabaseConfig,
};
use crate::validation::{self, ConfigWarnings};
use error::ConfigLoadError;

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("marquee.toml"),
        PathBuf::from("config/marquee.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    pub skip_env_file: bool,
    /// Read variables from this map instead of the process environment.
    /// Implies `skip_env_file`.
    pub env_vars: Option<HashMap<String, String>>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn without_env_file(mut self) -> Self {
        self.options.skip_env_file = true;
        self
    }

    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.options.env_vars = Some(
            vars.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = self.load_env_file()?;

        let env_config = match &self.options.env_vars {
            Some(vars) => EnvConfig::from_map(vars),
            None => EnvConfig::gather(),
        };

        let (file_config, config_path) = self.load_file_config(&env_config)?;

        let (config, warnings) = compose_config(
            file_config.unwrap_or_default(),
            env_config,
            ConfigMetadata {
                config_path,
                env_file_loaded,
            },
        )?;

        Ok(ConfigLoad { config, warnings })
    }

    fn load_env_file(&self) -> Result<bool, ConfigLoadError> {
        if self.options.skip_env_file || self.options.env_vars.is_some() {
            return Ok(false);
        }

        let loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true),
            None => dotenvy::dotenv().map(|_| true),
        };

        Ok(loaded.or_else(|err| match err {
            dotenvy::Error::Io(_) => Ok(false),
            _ => Err(err),
        })?)
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let requested = self
            .options
            .config_path
            .clone()
            .or_else(|| env_config.config_path.clone());

        let path = match requested {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
            {
                Some(path) => path.clone(),
                None => return Ok((None, None)),
            },
        };

        let contents = fs::read_to_string(&path).map_err(|source| ConfigLoadError::Io {
            path: path.clone(),
            source,
        })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
                path: path.clone(),
                source,
            })?;

        Ok((Some(file_config), Some(path)))
    }
}

fn compose_config(
    file: FileConfig,
    env: EnvConfig,
    metadata: ConfigMetadata,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let FileConfig {
        database: file_database,
        auth: file_auth,
    } = file;

    let url = env
        .database_url
        .or(file_database.url)
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or(ConfigLoadError::MissingDatabaseUrl)?;
    Url::parse(&url).map_err(|source| ConfigLoadError::InvalidDatabaseUrl { source })?;

    let database = DatabaseConfig {
        url,
        max_open_conns: parse_count(EnvConfig::MAX_OPEN_CONNS, env.max_open_conns)?
            .or(file_database.max_open_conns)
            .unwrap_or(DEFAULT_MAX_OPEN_CONNS),
        max_idle_conns: parse_count(EnvConfig::MAX_IDLE_CONNS, env.max_idle_conns)?
            .or(file_database.max_idle_conns)
            .unwrap_or(DEFAULT_MAX_IDLE_CONNS),
        max_idle_time: parse_duration(
            EnvConfig::MAX_IDLE_TIME,
            env.max_idle_time.or(file_database.max_idle_time),
        )?
        .unwrap_or(DEFAULT_MAX_IDLE_TIME),
        query_timeout: parse_duration(
            EnvConfig::QUERY_TIMEOUT,
            env.query_timeout.or(file_database.query_timeout),
        )?
        .unwrap_or(DEFAULT_QUERY_TIMEOUT),
    };

    let auth = AuthConfig {
        password_pepper: env
            .auth_password_pepper
            .or(file_auth.password_pepper)
            .unwrap_or_default(),
    };

    let mut config = Config {
        database,
        auth,
        metadata,
    };
    let warnings = validation::apply_guard_rails(&mut config)?;

    Ok((config, warnings))
}

fn parse_count(key: &'static str, raw: Option<String>) -> Result<Option<u32>, ConfigLoadError> {
    raw.map(|value| {
        value
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigLoadError::InvalidNumber { key, value })
    })
    .transpose()
}

fn parse_duration(
    key: &'static str,
    raw: Option<String>,
) -> Result<Option<Duration>, ConfigLoadError> {
    raw.map(|value| {
        humantime::parse_duration(value.trim())
            .map_err(|source| ConfigLoadError::InvalidDuration { key, value, source })
    })
    .transpose()
}
