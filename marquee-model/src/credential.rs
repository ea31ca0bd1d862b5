//! Password carriers.
//!
//! A plaintext password only ever lives in a [`CandidateCredential`], which is
//! zeroed on drop and has no serialisation support. Records handed to the
//! store carry a [`StoredCredential`] holding the one-way hash.

use std::fmt;

use zeroize::Zeroizing;

/// Plaintext password supplied by a caller, held only for validation and
/// hashing.
#[derive(Clone)]
pub struct CandidateCredential {
    plaintext: Zeroizing<String>,
}

impl CandidateCredential {
    pub fn new(plaintext: impl Into<String>) -> Self {
        Self {
            plaintext: Zeroizing::new(plaintext.into()),
        }
    }

    pub fn expose(&self) -> &str {
        self.plaintext.as_str()
    }
}

impl fmt::Debug for CandidateCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CandidateCredential(<redacted>)")
    }
}

/// PHC-formatted password hash as persisted in `users.password_hash`.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredCredential {
    hash: String,
}

impl StoredCredential {
    /// Wrap a hash that was produced by the credential codec or read back
    /// from storage.
    pub fn from_phc(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    pub fn as_phc(&self) -> &str {
        &self.hash
    }

    /// Whether a hash is actually present.
    pub fn is_set(&self) -> bool {
        !self.hash.is_empty()
    }
}

impl fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredential")
            .field("set", &self.is_set())
            .finish()
    }
}
