//! Credential hashing.
//!
//! The stored hash is opaque to the rest of the system; only this module
//! knows it is an Argon2id PHC string.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("failed to hash credential")]
    Hash,

    #[error("stored credential hash is malformed")]
    MalformedHash,
}

/// Hashes and verifies plain-text credentials.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, CredentialError>;

    /// `Ok(false)` on mismatch; `Err` only if the stored hash is unusable.
    fn verify(&self, plain: &str, hash: &str) -> Result<bool, CredentialError>;
}

/// Argon2id with default parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| CredentialError::Hash)
    }

    fn verify(&self, plain: &str, hash: &str) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(hash).map_err(|_| CredentialError::MalformedHash)?;
        Ok(Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hasher = Argon2Hasher;
        let hash = hasher.hash("Admin123!").unwrap();

        assert_ne!(hash, "Admin123!");
        assert!(hasher.verify("Admin123!", &hash).unwrap());
        assert!(!hasher.verify("Admin123?", &hash).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert_eq!(
            Argon2Hasher.verify("Admin123!", "not-a-phc-string"),
            Err(CredentialError::MalformedHash)
        );
    }
}
