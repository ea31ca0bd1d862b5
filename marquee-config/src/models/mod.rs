pub mod sources;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use marquee_core::auth::{CredentialCodec, CredentialError};
use url::Url;

pub const DEFAULT_MAX_OPEN_CONNS: u32 = 25;
pub const DEFAULT_MAX_IDLE_CONNS: u32 = 25;
pub const DEFAULT_MAX_IDLE_TIME: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_QUERY_TIMEOUT: Duration = marquee_core::DEFAULT_DEADLINE;

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub metadata: ConfigMetadata,
}

#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_open_conns: u32,
    /// Connections the pool keeps warm. Never more than `max_open_conns`.
    pub max_idle_conns: u32,
    pub max_idle_time: Duration,
    /// Per-statement deadline, also used as the pool acquire timeout.
    pub query_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_open_conns: DEFAULT_MAX_OPEN_CONNS,
            max_idle_conns: DEFAULT_MAX_IDLE_CONNS,
            max_idle_time: DEFAULT_MAX_IDLE_TIME,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// The connection URL with any password masked, for logs.
    pub fn redacted_url(&self) -> String {
        match Url::parse(&self.url) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("****"));
                }
                url.to_string()
            }
            Err(_) => "<unparseable>".to_string(),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.redacted_url())
            .field("max_open_conns", &self.max_open_conns)
            .field("max_idle_conns", &self.max_idle_conns)
            .field("max_idle_time", &self.max_idle_time)
            .field("query_timeout", &self.query_timeout)
            .finish()
    }
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
    /// Server-side secret mixed into every password hash. Empty disables it.
    pub password_pepper: String,
}

impl AuthConfig {
    pub fn has_pepper(&self) -> bool {
        !self.password_pepper.is_empty()
    }

    pub fn credential_codec(&self) -> Result<CredentialCodec, CredentialError> {
        CredentialCodec::new(self.password_pepper.as_bytes())
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("password_pepper", &if self.has_pepper() { "<set>" } else { "<empty>" })
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
