//! Driven port for account persistence.

use async_trait::async_trait;

use crate::domain::{EmailAddress, PasswordHash, User, UserId, UserName};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique name or email constraint rejected the write.
        Duplicate { message: String } => "user already exists: {message}",
    }
}

/// A user together with the credential material needed to log in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub user: User,
    pub password_hash: PasswordHash,
}

/// Storage for registered accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account.
    ///
    /// Returns [`UserPersistenceError::Duplicate`] when the name or email is
    /// already taken.
    async fn create(&self, account: &UserAccount) -> Result<(), UserPersistenceError>;

    /// Fetch an account, including its password hash, by unique name.
    async fn find_by_name(&self, name: &UserName)
    -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Whether any account already uses `name` or `email`.
    async fn name_or_email_taken(
        &self,
        name: &UserName,
        email: &EmailAddress,
    ) -> Result<bool, UserPersistenceError>;
}
