//! Password hashing and verification.
//! Argon2 in PHC string format with a fresh random salt per hash. Verification
//! is pure: a wrong password is `Ok(false)`, only a corrupted stored hash is
//! an error.

use anyhow::{anyhow, Result};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};

/// A stored credential that cannot be parsed as a PHC string. Not recoverable
/// locally; callers must not leak this distinction to API clients.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("invalid password hash format")]
    InvalidFormat,
}

/// Hash a plaintext password into a salted Argon2 PHC string.
/// The salt is randomized, so two hashes of the same input differ.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2.hash_password(password.as_bytes(), &salt).map_err(|e| anyhow!(e.to_string()))?.to_string();
    Ok(phc)
}

/// Verify a plaintext password against a stored PHC hash.
pub fn verify_password(hash: &str, password: &str) -> Result<bool, HashError> {
    let parsed = PasswordHash::new(hash).map_err(|_| HashError::InvalidFormat)?;
    let argon2 = Argon2::default();
    Ok(argon2.verify_password(password.as_bytes(), &parsed).is_ok())
}
