//! Password hashing
//!
//! Argon2 with a random salt per hash. Verification is the slow comparison
//! used by the sign-in flow; a wrong password is an `Ok(false)`, not an error.

use crate::utils::error::{AuthError, Result};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::crypto(format!("failed to hash password: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verify a password against its stored hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AuthError::crypto(format!("failed to parse password hash: {}", e)))?;

    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::crypto(format!(
            "password verification failed: {}",
            e
        ))),
    }
}
