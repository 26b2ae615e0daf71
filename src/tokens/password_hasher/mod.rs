pub mod error;

use std::sync::Arc;

use argon2::{password_hash::{rand_core::OsRng, PasswordHash, SaltString}, Argon2, PasswordHasher as _, PasswordVerifier};
#[cfg(test)]
use mockall::automock;

use error::*;

pub type DynPasswordHasher = Arc<dyn PasswordHasher + Send + Sync>;

#[cfg_attr(test, automock)]
pub trait PasswordHasher {
    fn hash_password(&self, password: &str) -> Result<String>;
    fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool>;
}

pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new_dyn() -> DynPasswordHasher {
        Arc::new(Argon2PasswordHasher)
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::HashError(e.to_string()))?;

        Ok(hash.to_string())
    }

    fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| Error::ParseHashError(e.to_string()))?;

        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    }
}
