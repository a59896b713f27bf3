//! Driven port for one-way password hashing.

use async_trait::async_trait;

use crate::domain::{Password, PasswordHash};

use super::define_port_error;

define_port_error! {
    /// Failures raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Producing a new hash failed.
        Hashing { message: String } => "password hashing failed: {message}",
        /// A stored hash could not be parsed or compared.
        Verification { message: String } => "password verification failed: {message}",
    }
}

/// Hashes and verifies passwords. Implementations may be CPU heavy and
/// should keep that work off the async executor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Produce a salted hash for storage.
    async fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError>;

    /// Check `password` against a stored hash in constant time.
    async fn verify(
        &self,
        password: &Password,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHashError>;
}
