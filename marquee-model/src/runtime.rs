//! Movie runtime expressed in whole minutes.
//!
//! On the wire a runtime is always the literal two-token string
//! `"<N> mins"`. Anything else (a bare number, a different unit, extra
//! whitespace) is rejected with [`RuntimeFormatError::InvalidFormat`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const UNIT: &str = "mins";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RuntimeFormatError {
    #[error("invalid runtime format")]
    InvalidFormat,
}

/// Runtime of a movie in minutes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Runtime(pub i32);

impl Runtime {
    pub const fn minutes(self) -> i32 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl From<i32> for Runtime {
    fn from(minutes: i32) -> Self {
        Runtime(minutes)
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {UNIT}", self.0)
    }
}

impl FromStr for Runtime {
    type Err = RuntimeFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(' ').collect();
        let [count, unit] = parts.as_slice() else {
            return Err(RuntimeFormatError::InvalidFormat);
        };

        if *unit != UNIT {
            return Err(RuntimeFormatError::InvalidFormat);
        }

        count
            .parse::<i32>()
            .map(Runtime)
            .map_err(|_| RuntimeFormatError::InvalidFormat)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Runtime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Runtime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        // Non-string JSON values are a format error too, not a type error.
        let raw = String::deserialize(deserializer)
            .map_err(|_| D::Error::custom(RuntimeFormatError::InvalidFormat))?;
        raw.parse().map_err(D::Error::custom)
    }
}
