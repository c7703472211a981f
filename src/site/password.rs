//! Password generation and hashing for site accounts.
//!
//! Hashing goes through Argon2; the stored value is a PHC string. The reset
//! procedure also copies pre-existing hashes around verbatim — that path never
//! comes through this module, see
//! [`overwrite_password_hash`](crate::site::users::overwrite_password_hash).

use anyhow::{anyhow, Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng as HashOsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use rand::distributions::{Alphanumeric, DistString};
use rand::rngs::OsRng;

/// Generate a random alphanumeric password of the given length.
pub fn generate_password(len: usize) -> String {
    Alphanumeric.sample_string(&mut OsRng, len)
}

/// Hash a plaintext password into a PHC-format Argon2 string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut HashOsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!(e))
        .context("failed to hash password")
}

/// Verify a plaintext password against a stored PHC hash.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| anyhow!(e))
        .context("failed to parse stored password hash")?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_password_has_requested_length_and_charset() {
        let password = generate_password(16);
        assert_eq!(password.len(), 16);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn generated_passwords_differ() {
        assert_ne!(generate_password(20), generate_password(20));
    }

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }
}
