use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::models::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    /// Emit every warning through `tracing`.
    pub fn log(&self) {
        for warning in &self.items {
            match &warning.hint {
                Some(hint) => {
                    warn!(message = %warning.message, hint = %hint, "configuration warning")
                }
                None => warn!(message = %warning.message, "configuration warning"),
            }
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigGuardRailError {
    #[error("DB_MAX_OPEN_CONNS must be at least 1")]
    NoConnections,
    #[error("DB_QUERY_TIMEOUT must be greater than zero")]
    ZeroQueryTimeout,
    #[error("unsupported database scheme '{scheme}', expected postgres or postgresql")]
    UnsupportedDatabaseScheme { scheme: String },
}

/// Reject unusable settings and normalise the rest, reporting adjustments.
pub fn apply_guard_rails(
    config: &mut Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();
    let database = &mut config.database;

    if let Ok(url) = url::Url::parse(&database.url)
        && !matches!(url.scheme(), "postgres" | "postgresql")
    {
        return Err(ConfigGuardRailError::UnsupportedDatabaseScheme {
            scheme: url.scheme().to_string(),
        });
    }
    if database.max_open_conns == 0 {
        return Err(ConfigGuardRailError::NoConnections);
    }
    if database.query_timeout == Duration::ZERO {
        return Err(ConfigGuardRailError::ZeroQueryTimeout);
    }

    if database.max_idle_conns > database.max_open_conns {
        warnings.push(format!(
            "DB_MAX_IDLE_CONNS ({}) exceeds DB_MAX_OPEN_CONNS ({}); clamping",
            database.max_idle_conns, database.max_open_conns
        ));
        database.max_idle_conns = database.max_open_conns;
    }

    if !config.auth.has_pepper() {
        warnings.push_with_hint(
            "AUTH_PASSWORD_PEPPER is not set; password hashes use no server-side secret",
            "Set AUTH_PASSWORD_PEPPER to a long random value before creating users",
        );
    }

    Ok(warnings)
}
