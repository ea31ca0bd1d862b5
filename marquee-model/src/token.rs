use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// SHA-256 digest of a token's plaintext; the only form that is persisted.
pub type TokenDigest = [u8; 32];

/// Purpose a token was minted for. Lookups never cross scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TokenScope {
    /// Single-use token mailed to confirm an address.
    Activation,
    /// Bearer token presented on authenticated requests.
    Authentication,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown token scope: {0}")]
pub struct UnknownTokenScope(pub String);

impl TokenScope {
    pub const ACTIVATION: &'static str = "activation";
    pub const AUTHENTICATION: &'static str = "authentication";

    pub fn as_str(self) -> &'static str {
        match self {
            TokenScope::Activation => Self::ACTIVATION,
            TokenScope::Authentication => Self::AUTHENTICATION,
        }
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenScope {
    type Err = UnknownTokenScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::ACTIVATION => Ok(TokenScope::Activation),
            Self::AUTHENTICATION => Ok(TokenScope::Authentication),
            other => Err(UnknownTokenScope(other.to_string())),
        }
    }
}

impl TryFrom<&str> for TokenScope {
    type Error = UnknownTokenScope;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        TokenScope::from_str(value)
    }
}

/// An issued token.
///
/// `plaintext` is handed back to the caller exactly once at issuance and is
/// never written to storage; only `hash` is.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Token {
    #[cfg_attr(feature = "serde", serde(rename = "token"))]
    pub plaintext: String,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub hash: TokenDigest,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub user_id: i64,
    pub expiry: DateTime<Utc>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub scope: TokenScope,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("user_id", &self.user_id)
            .field("scope", &self.scope)
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}
