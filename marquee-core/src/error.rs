use thiserror::Error;

use crate::auth::CredentialError;

/// Constraint backing the unique e-mail address rule on `users`.
pub const USERS_EMAIL_CONSTRAINT: &str = "users_email_key";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// The row changed (or vanished) since the caller read it.
    #[error("edit conflict")]
    EditConflict,

    #[error("duplicate key violates unique constraint {constraint}")]
    DuplicateKey { constraint: String },

    #[error("store operation exceeded its deadline")]
    Timeout,

    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    pub fn duplicate(constraint: impl Into<String>) -> Self {
        StoreError::DuplicateKey {
            constraint: constraint.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }

    pub fn is_edit_conflict(&self) -> bool {
        matches!(self, StoreError::EditConflict)
    }

    pub fn is_duplicate_email(&self) -> bool {
        matches!(
            self,
            StoreError::DuplicateKey { constraint } if constraint == USERS_EMAIL_CONSTRAINT
        )
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => StoreError::Timeout,
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::duplicate(db_err.constraint().unwrap_or("unknown"))
            }
            other => StoreError::Database(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
