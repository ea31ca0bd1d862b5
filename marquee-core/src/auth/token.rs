//! Opaque bearer tokens.
//!
//! A token is [`TOKEN_ENTROPY_BYTES`] bytes from the OS CSPRNG rendered as
//! unpadded RFC 4648 base-32. Only the SHA-256 digest of that text is stored or
//! compared.

use chrono::{Duration, Utc};
use marquee_model::{Token, TokenDigest, TokenScope};
use rand::{TryRngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

use super::CredentialError;

pub const TOKEN_ENTROPY_BYTES: usize = 16;

/// Length of a plaintext token. Derived from [`TOKEN_ENTROPY_BYTES`] so the
/// two cannot drift apart.
pub const TOKEN_PLAINTEXT_LEN: usize = (TOKEN_ENTROPY_BYTES * 8).div_ceil(BASE32_BITS);

const BASE32_BITS: usize = 5;
const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Mint a token for `user_id` that expires `ttl` from now.
pub fn generate_token(
    user_id: i64,
    ttl: Duration,
    scope: TokenScope,
) -> Result<Token, CredentialError> {
    let mut random = [0u8; TOKEN_ENTROPY_BYTES];
    OsRng
        .try_fill_bytes(&mut random)
        .map_err(|err| CredentialError::RandomSource(err.to_string()))?;

    let plaintext = encode_base32(&random);
    let hash = hash_token(&plaintext);

    Ok(Token {
        plaintext,
        hash,
        user_id,
        expiry: Utc::now() + ttl,
        scope,
    })
}

/// Digest under which a token plaintext is stored and looked up.
pub fn hash_token(plaintext: &str) -> TokenDigest {
    let digest = Sha256::digest(plaintext.as_bytes());
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

fn encode_base32(bytes: &[u8]) -> String {
    let mut out = String::with_capacity((bytes.len() * 8).div_ceil(BASE32_BITS));
    let mut buffer: u32 = 0;
    let mut bits: usize = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= BASE32_BITS {
            bits -= BASE32_BITS;
            out.push(BASE32_ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }

    if bits > 0 {
        out.push(BASE32_ALPHABET[((buffer << (BASE32_BITS - bits)) & 0x1f) as usize] as char);
    }

    out
}
