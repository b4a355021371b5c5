//! Credential codec: Argon2id hashing and verification.
//!
//! Hashes are PHC strings, so the algorithm, version, parameters, and salt
//! travel with the hash and verification needs no external state.

use anyhow::{Result, anyhow};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Hash a plaintext password with a fresh random salt.
///
/// Two calls with the same input produce distinct outputs; the default
/// Argon2id cost (19 MiB, t=2, p=1) is at or above a bcrypt cost-10
/// work factor.
///
/// # Errors
/// Returns an error if the hash computation itself fails.
pub fn hash(plaintext: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {err}"))?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC string.
///
/// Malformed hashes are a verification failure, not an error.
#[must_use]
pub fn verify(plaintext: &str, credential_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(credential_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}
