use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, ParamsBuilder, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher,
        PasswordVerifier, Salt, SaltString,
    },
};
use marquee_model::{CandidateCredential, StoredCredential};
use rand::{TryRngCore, rngs::OsRng};
use thiserror::Error;
use zeroize::Zeroizing;

/// One-way password hashing for user accounts.
///
/// Argon2id with a random per-password salt and an optional server-side
/// pepper. Hashes are emitted as PHC strings and verified in constant time by
/// the argon2 verifier.
pub struct CredentialCodec {
    argon2: Argon2<'static>,
    password_pepper: Zeroizing<Vec<u8>>,
}

impl fmt::Debug for CredentialCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialCodec")
            .field("argon2", &self.argon2)
            .field("peppered", &!self.password_pepper.is_empty())
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum CredentialError {
    /// The stored hash is not a PHC string this codec can verify.
    #[error("malformed password hash: {0}")]
    MalformedHash(String),
    #[error("password hashing error: {0}")]
    Hashing(String),
    #[error("secure random source unavailable: {0}")]
    RandomSource(String),
    #[error("invalid Argon2 parameters: {0}")]
    InvalidArgon2Params(String),
}

impl CredentialCodec {
    /// Defaults target ~64 MiB and 3 passes, a few tens of milliseconds per
    /// verification on server hardware.
    const DEFAULT_MEMORY_KIB: u32 = 64 * 1024;
    const DEFAULT_ITERATIONS: u32 = 3;
    const DEFAULT_PARALLELISM: u32 = 1;
    const SALT_LENGTH: usize = Salt::RECOMMENDED_LENGTH;

    pub fn new(password_pepper: impl AsRef<[u8]>) -> Result<Self, CredentialError> {
        Self::with_params(
            password_pepper,
            ParamsBuilder::new()
                .m_cost(Self::DEFAULT_MEMORY_KIB)
                .t_cost(Self::DEFAULT_ITERATIONS)
                .p_cost(Self::DEFAULT_PARALLELISM)
                .output_len(32)
                .build()
                .map_err(|err| CredentialError::InvalidArgon2Params(err.to_string()))?,
        )
    }

    /// Build a codec with caller-specified Argon2 parameters (useful for
    /// tests or constrained environments). An empty pepper disables peppering.
    pub fn with_params(
        password_pepper: impl AsRef<[u8]>,
        params: Params,
    ) -> Result<Self, CredentialError> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::default(), params);

        Ok(Self {
            argon2,
            password_pepper: Zeroizing::new(password_pepper.as_ref().to_vec()),
        })
    }

    /// Hash a candidate password. The plaintext is only borrowed; the returned
    /// credential is the sole form that should reach the store.
    pub fn hash(
        &self,
        candidate: &CandidateCredential,
    ) -> Result<StoredCredential, CredentialError> {
        let material = self.peppered(candidate.expose());

        let mut salt_bytes = [0u8; Self::SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|err| CredentialError::RandomSource(err.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|err| CredentialError::Hashing(err.to_string()))?;

        let hash = self
            .argon2
            .hash_password(&material, &salt)
            .map_err(|err| CredentialError::Hashing(err.to_string()))?;

        Ok(StoredCredential::from_phc(hash.to_string()))
    }

    /// Check `plaintext` against a stored hash.
    ///
    /// A wrong password is `Ok(false)`. A hash that cannot be parsed or was
    /// produced by a foreign scheme is an error, never `false`.
    pub fn matches(
        &self,
        plaintext: &str,
        stored: &StoredCredential,
    ) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(stored.as_phc())
            .map_err(|err| CredentialError::MalformedHash(err.to_string()))?;

        let material = self.peppered(plaintext);
        match self.argon2.verify_password(&material, &parsed) {
            Ok(()) => Ok(true),
            Err(PasswordHashError::Password) => Ok(false),
            Err(err) => Err(CredentialError::MalformedHash(err.to_string())),
        }
    }

    fn peppered(&self, plaintext: &str) -> Zeroizing<Vec<u8>> {
        let mut material = Zeroizing::new(Vec::with_capacity(
            plaintext.len() + self.password_pepper.len(),
        ));
        material.extend_from_slice(plaintext.as_bytes());
        material.extend_from_slice(&self.password_pepper);
        material
    }
}
