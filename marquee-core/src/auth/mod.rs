//! Credential hashing and bearer token minting.

mod crypto;
mod token;

pub use crypto::{CredentialCodec, CredentialError};
pub use token::{
    TOKEN_ENTROPY_BYTES, TOKEN_PLAINTEXT_LEN, generate_token, hash_token,
};
