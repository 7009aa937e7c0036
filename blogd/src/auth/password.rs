//! Password hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::errors::{Error, Result};

/// Argon2 hashing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Argon2Params {
    /// Create Argon2 instance with these parameters.
    fn to_argon2(self) -> Result<Argon2<'static>> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None).map_err(|e| Error::Internal {
            operation: format!("create argon2 params: {e}"),
        })?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for Argon2Params {
    /// Secure defaults for production (Argon2id RFC recommendations)
    fn default() -> Self {
        Self {
            memory_kib: 19456, // 19 MB
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// The password capability: turn a password into a digest and check a password against one.
///
/// Hashing is CPU-heavy by construction, so async callers should go through
/// [`Passwords::hash_blocking`] and [`Passwords::verify_blocking`], which run on the blocking
/// thread pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passwords {
    params: Argon2Params,
}

impl Passwords {
    pub fn new(params: Argon2Params) -> Self {
        Self { params }
    }

    /// Hash a password into a PHC-format digest with a fresh salt.
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = self.params.to_argon2()?;

        let hash = argon2.hash_password(password.as_bytes(), &salt).map_err(|e| Error::Internal {
            operation: format!("hash password: {e}"),
        })?;

        Ok(hash.to_string())
    }

    /// Check `password` against `digest`.
    ///
    /// Verification uses the parameters embedded in the digest, not `self.params`.
    pub fn verify(&self, digest: &str, password: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(digest).map_err(|e| Error::Internal {
            operation: format!("parse password hash: {e}"),
        })?;

        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed_hash).is_ok())
    }

    pub async fn hash_blocking(&self, password: String) -> Result<String> {
        let passwords = *self;
        tokio::task::spawn_blocking(move || passwords.hash(&password))
            .await
            .map_err(|e| Error::Internal {
                operation: format!("join password hashing task: {e}"),
            })?
    }

    pub async fn verify_blocking(&self, digest: String, password: String) -> Result<bool> {
        let passwords = *self;
        tokio::task::spawn_blocking(move || passwords.verify(&digest, &password))
            .await
            .map_err(|e| Error::Internal {
                operation: format!("join password verification task: {e}"),
            })?
    }
}
