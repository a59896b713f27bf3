//! Account service implementing registration and login.
//!
//! Wires the user repository, password hasher, and token issuer behind the
//! [`RegistrationService`] and [`LoginService`] driving ports.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{
    LoginOutcome, LoginService, PasswordHashError, PasswordHasher, RegistrationService,
    TokenError, TokenIssuer, UserAccount, UserPersistenceError, UserRepository,
};
use crate::domain::{Error, LoginCredentials, Registration, User, UserId};

pub(crate) const USER_EXISTS: &str = "User already exists";
pub(crate) const USER_NOT_FOUND: &str = "User not found";
const INVALID_PASSWORD: &str = "Invalid password";

/// Registration and login backed by driven ports.
#[derive(Clone)]
pub struct AccountService<U, H, T> {
    users: Arc<U>,
    hasher: Arc<H>,
    tokens: Arc<T>,
}

impl<U, H, T> AccountService<U, H, T> {
    /// Create a service over the given adapters.
    #[must_use]
    pub const fn new(users: Arc<U>, hasher: Arc<H>, tokens: Arc<T>) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }
}

pub(crate) fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Duplicate { .. } => Error::conflict(USER_EXISTS),
        failure @ (UserPersistenceError::Connection { .. }
        | UserPersistenceError::Query { .. }) => Error::store_failure(failure.to_string()),
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    match error {
        PasswordHashError::Hashing { message } | PasswordHashError::Verification { message } => {
            Error::internal(format!("password hasher failed: {message}"))
        }
    }
}

fn map_token_error(error: TokenError) -> Error {
    match error {
        TokenError::Signing { message } | TokenError::Invalid { message } => {
            Error::internal(format!("token issuer failed: {message}"))
        }
        TokenError::Expired => Error::internal("token issuer rejected its own token"),
    }
}

#[async_trait]
impl<U, H, T> RegistrationService for AccountService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenIssuer,
{
    async fn register(&self, registration: &Registration) -> Result<User, Error> {
        let taken = self
            .users
            .name_or_email_taken(registration.name(), registration.email())
            .await
            .map_err(map_user_persistence_error)?;
        if taken {
            debug!(name = %registration.name(), "registration rejected: name or email in use");
            return Err(Error::conflict(USER_EXISTS));
        }

        let password_hash = self
            .hasher
            .hash(registration.password())
            .await
            .map_err(map_hash_error)?;
        let user = User::new(
            UserId::random(),
            registration.name().clone(),
            registration.email().clone(),
        )
        .with_external_account(registration.external_account().cloned());

        let account = UserAccount {
            user,
            password_hash,
        };
        self.users
            .create(&account)
            .await
            .map_err(map_user_persistence_error)?;

        info!(user_id = %account.user.id(), "user registered");
        Ok(account.user)
    }
}

#[async_trait]
impl<U, H, T> LoginService for AccountService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenIssuer,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error> {
        let account = self
            .users
            .find_by_name(credentials.name())
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))?;

        let matches = self
            .hasher
            .verify(credentials.password(), &account.password_hash)
            .await
            .map_err(map_hash_error)?;
        if !matches {
            debug!(user_id = %account.user.id(), "login rejected: password mismatch");
            return Err(Error::unauthorized(INVALID_PASSWORD));
        }

        let token = self.tokens.issue(&account.user).map_err(map_token_error)?;
        info!(user_id = %account.user.id(), "user logged in");
        Ok(LoginOutcome {
            token,
            user: account.user,
        })
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
