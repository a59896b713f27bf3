//! bcrypt-backed [`PasswordHasher`].

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{PasswordHashError, PasswordHasher};
use crate::domain::{Password, PasswordHash};

/// Work factor used for stored hashes.
pub const DEFAULT_BCRYPT_COST: u32 = 11;

/// Bytes of input bcrypt reads. Anything past this is silently ignored.
pub const BCRYPT_INPUT_LIMIT: usize = 72;

/// Hashes passwords with bcrypt on the blocking thread pool.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl BcryptPasswordHasher {
    /// Hasher using [`DEFAULT_BCRYPT_COST`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cost: DEFAULT_BCRYPT_COST,
        }
    }

    /// Hasher with a custom work factor. Low costs are only suitable for
    /// tests.
    #[must_use]
    pub const fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    /// Configured work factor.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError> {
        let secret = password.clone();
        let cost = self.cost;
        let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(secret.expose(), cost))
            .await
            .map_err(|error| PasswordHashError::hashing(error.to_string()))?
            .map_err(|error| PasswordHashError::hashing(error.to_string()))?;
        debug!(cost, "password hashed");
        Ok(PasswordHash::new(hashed))
    }

    async fn verify(
        &self,
        password: &Password,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHashError> {
        let secret = password.clone();
        let encoded = hash.as_str().to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(secret.expose(), &encoded))
            .await
            .map_err(|error| PasswordHashError::verification(error.to_string()))?
            .map_err(|error| PasswordHashError::verification(error.to_string()))
    }
}
