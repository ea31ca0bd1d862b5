use chrono::{DateTime, Utc};

use crate::credential::StoredCredential;

/// A registered account.
///
/// The password hash and the concurrency version never leave the process.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct User {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub password: StoredCredential,
    pub activated: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub version: i32,
}

impl User {
    /// An account that has not been persisted yet.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: StoredCredential,
    ) -> Self {
        Self {
            id: 0,
            created_at: DateTime::<Utc>::default(),
            name: name.into(),
            email: email.into(),
            password,
            activated: false,
            version: 0,
        }
    }
}
