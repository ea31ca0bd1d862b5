use chrono::{DateTime, Utc};

use crate::runtime::Runtime;

/// A catalogue entry.
///
/// `id`, `created_at` and `version` are assigned by the store; `version`
/// starts at 1 and is bumped on every successful update.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Movie {
    pub id: i64,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub created_at: DateTime<Utc>,
    pub title: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "is_zero")
    )]
    pub year: i32,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Runtime::is_zero")
    )]
    pub runtime: Runtime,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub genres: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub version: i32,
}

impl Movie {
    /// A movie that has not been persisted yet.
    pub fn new(
        title: impl Into<String>,
        year: i32,
        runtime: Runtime,
        genres: Vec<String>,
    ) -> Self {
        Self {
            id: 0,
            created_at: DateTime::<Utc>::default(),
            title: title.into(),
            year,
            runtime,
            genres,
            version: 0,
        }
    }
}

#[cfg(feature = "serde")]
fn is_zero(value: &i32) -> bool {
    *value == 0
}
