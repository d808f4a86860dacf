//! Password hashing and verification (Argon2id).
//!
//! Digests are PHC strings with a random per-hash salt. Hashing happens
//! exactly once per password value change — callers hash a plaintext at the
//! moment the stored field is set and never re-hash an existing digest.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    /// Hashing itself failed. Not user-correctable; aborts the save.
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// The stored digest is not a valid PHC string.
    #[error("stored password digest is malformed: {0}")]
    MalformedDigest(String),

    /// Verification failed for a reason other than a wrong password.
    #[error("password verification failed: {0}")]
    Verify(String),
}

/// Hash a plaintext password into a PHC-formatted digest.
pub fn hash(plain: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let digest = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;

    Ok(digest.to_string())
}

/// Verify a plaintext password against a stored digest.
///
/// A wrong password is `Ok(false)`; a digest that cannot be parsed is an
/// error (it means the stored record is corrupt, not that the caller typed
/// the wrong password).
pub fn verify(plain: &str, digest: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(digest)
        .map_err(|e| PasswordError::MalformedDigest(e.to_string()))?;

    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Verify(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_the_hashed_plaintext() {
        let digest = hash("Abc12345!").unwrap();
        assert!(verify("Abc12345!", &digest).unwrap());
        assert!(!verify("Abc12345?", &digest).unwrap());
    }

    #[test]
    fn same_plaintext_hashes_differently_but_both_verify() {
        let a = hash("correct horse battery staple").unwrap();
        let b = hash("correct horse battery staple").unwrap();

        assert_ne!(a, b);
        assert!(verify("correct horse battery staple", &a).unwrap());
        assert!(verify("correct horse battery staple", &b).unwrap());
    }

    #[test]
    fn verification_is_case_sensitive() {
        let digest = hash("Password1!").unwrap();
        assert!(!verify("password1!", &digest).unwrap());
    }

    #[test]
    fn malformed_digest_is_an_error_not_a_mismatch() {
        let result = verify("anything", "not-a-phc-string");
        assert!(matches!(result, Err(PasswordError::MalformedDigest(_))));
    }
}
