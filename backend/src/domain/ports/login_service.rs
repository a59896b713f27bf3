//! Driving ports for account use-cases: login and registration.
//!
//! Inbound adapters call these without knowing how accounts are stored or
//! how tokens are signed, so handler tests can substitute mocks.

use async_trait::async_trait;

use crate::domain::{Error, IssuedToken, LoginCredentials, Registration, User};

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub token: IssuedToken,
    pub user: User,
}

/// Authenticate credentials and issue a token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials against the stored account.
    ///
    /// # Errors
    ///
    /// - `not_found` when no account has the given name.
    /// - `unauthorized` when the password does not match.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error>;
}

/// Create new accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Register a new account and return its public view.
    ///
    /// # Errors
    ///
    /// - `conflict` when the name or email is already registered.
    async fn register(&self, registration: &Registration) -> Result<User, Error>;
}
