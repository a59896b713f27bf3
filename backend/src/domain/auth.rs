//! Authentication primitives: passwords, login credentials, and
//! registration requests.
//!
//! Inbound adapters validate each raw field into these types before calling
//! a driving port, so services only ever see well-formed input.

use std::fmt;

use thiserror::Error;
use zeroize::Zeroizing;

use super::{EmailAddress, ExternalAccount, UserName};

/// Minimum password length, in characters.
pub const PASSWORD_MIN: usize = 6;
/// Maximum password length, in characters.
///
/// bcrypt only reads the first 72 bytes of its input, so passwords sharing a
/// 72-byte prefix verify against each other's hash.
pub const PASSWORD_MAX: usize = 128;

/// Validation errors for [`Password`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordValidationError {
    #[error("password must be between {min} and {max} characters")]
    Length { min: usize, max: usize },
}

impl PasswordValidationError {
    /// Machine-readable code reported alongside the field name.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Length { .. } => "invalid_length",
        }
    }
}

/// Plain-text password supplied by a caller.
///
/// The length bounds apply to the raw input; the stored secret is trimmed,
/// so registration and login agree on surrounding whitespace. The buffer is
/// zeroed on drop and the value never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate and wrap a password.
    ///
    /// # Examples
    /// ```
    /// use tokku::domain::Password;
    ///
    /// assert!(Password::new("secret1").is_ok());
    /// assert!(Password::new("short").is_err());
    /// assert_eq!(Password::new(" secret1 ").expect("valid").expose(), "secret1");
    /// ```
    pub fn new(raw: &str) -> Result<Self, PasswordValidationError> {
        let length = raw.chars().count();
        if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&length) {
            return Err(PasswordValidationError::Length {
                min: PASSWORD_MIN,
                max: PASSWORD_MAX,
            });
        }
        Ok(Self(Zeroizing::new(raw.trim().to_owned())))
    }

    /// Expose the secret for hashing or verification.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Stored bcrypt hash of a password.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a hash produced by a password hasher or loaded from storage.
    #[must_use]
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Borrow the encoded hash.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Validated login credentials.
///
/// # Examples
/// ```
/// use tokku::domain::{LoginCredentials, Password, UserName};
///
/// let creds = LoginCredentials::new(
///     UserName::new("alice123").expect("name"),
///     Password::new("secret1").expect("password"),
/// );
/// assert_eq!(creds.name().as_ref(), "alice123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    name: UserName,
    password: Password,
}

impl LoginCredentials {
    /// Bundle a validated name and password.
    #[must_use]
    pub const fn new(name: UserName, password: Password) -> Self {
        Self { name, password }
    }

    /// Name used for the account lookup.
    #[must_use]
    pub const fn name(&self) -> &UserName {
        &self.name
    }

    /// Password to verify against the stored hash.
    #[must_use]
    pub const fn password(&self) -> &Password {
        &self.password
    }
}

/// Validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    name: UserName,
    email: EmailAddress,
    password: Password,
    external_account: Option<ExternalAccount>,
}

impl Registration {
    /// Bundle validated registration fields.
    #[must_use]
    pub const fn new(name: UserName, email: EmailAddress, password: Password) -> Self {
        Self {
            name,
            email,
            password,
            external_account: None,
        }
    }

    /// Attach an optional external account reference.
    #[must_use]
    pub fn with_external_account(mut self, account: Option<ExternalAccount>) -> Self {
        self.external_account = account;
        self
    }

    /// Requested unique name.
    #[must_use]
    pub const fn name(&self) -> &UserName {
        &self.name
    }

    /// Requested unique email address.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password to hash.
    #[must_use]
    pub const fn password(&self) -> &Password {
        &self.password
    }

    /// Optional external account reference.
    #[must_use]
    pub const fn external_account(&self) -> Option<&ExternalAccount> {
        self.external_account.as_ref()
    }
}
