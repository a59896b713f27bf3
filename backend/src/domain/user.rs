//! User account model.
//!
//! Value types validate on construction so a [`User`] can only hold a
//! well-formed identifier, name, and email address.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Minimum length of a user name, in characters.
pub const USER_NAME_MIN: usize = 3;
/// Maximum length of a user name, in characters.
pub const USER_NAME_MAX: usize = 50;
/// Maximum length of an email address.
pub const EMAIL_MAX: usize = 254;
/// Maximum length of an external account reference.
pub const EXTERNAL_ACCOUNT_MAX: usize = 255;

/// Validation errors for user value types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("name must not be empty")]
    EmptyName,
    #[error("name must be between {min} and {max} characters")]
    NameLength { min: usize, max: usize },
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email must be a valid email address")]
    InvalidEmail,
    #[error("email must be at most {max} characters")]
    EmailTooLong { max: usize },
    #[error("external account must not be blank")]
    EmptyExternalAccount,
    #[error("external account must be at most {max} characters")]
    ExternalAccountTooLong { max: usize },
}

impl UserValidationError {
    /// Machine-readable code reported alongside the field name.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_uuid",
            Self::EmptyName | Self::EmptyEmail | Self::EmptyExternalAccount => "empty",
            Self::NameLength { .. } => "invalid_length",
            Self::InvalidEmail => "invalid_email",
            Self::EmailTooLong { .. } | Self::ExternalAccountTooLong { .. } => "too_long",
        }
    }
}

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Parse an identifier from its hyphenated UUID form.
    ///
    /// # Examples
    /// ```
    /// use tokku::domain::UserId;
    ///
    /// assert!(UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").is_ok());
    /// assert!(UserId::new("42").is_err());
    /// ```
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID, e.g. one loaded from storage.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static EMAIL_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@.]+$"));

/// An uncompilable pattern rejects every address.
fn is_email_shaped(candidate: &str) -> bool {
    EMAIL_RE
        .as_ref()
        .is_ok_and(|pattern| pattern.is_match(candidate))
}

/// Unique public name of an account. Surrounding whitespace is trimmed; any
/// characters are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Validate and construct a [`UserName`].
    ///
    /// # Examples
    /// ```
    /// use tokku::domain::UserName;
    ///
    /// let name = UserName::new("  alice123 ").expect("valid name");
    /// assert_eq!(name.as_ref(), "alice123");
    /// assert!(UserName::new("al").is_err());
    /// ```
    pub fn new(name: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        let length = trimmed.chars().count();
        if !(USER_NAME_MIN..=USER_NAME_MAX).contains(&length) {
            return Err(UserValidationError::NameLength {
                min: USER_NAME_MIN,
                max: USER_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unique contact address of an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = email.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if trimmed.len() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !is_email_shaped(trimmed) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Reference to the user's account on an external anime tracker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExternalAccount(String);

impl ExternalAccount {
    /// Validate and construct an [`ExternalAccount`].
    pub fn new(account: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = account.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyExternalAccount);
        }
        if trimmed.chars().count() > EXTERNAL_ACCOUNT_MAX {
            return Err(UserValidationError::ExternalAccountTooLong {
                max: EXTERNAL_ACCOUNT_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ExternalAccount {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Public view of an account. Never carries credential material.
///
/// # Examples
/// ```
/// use tokku::domain::{EmailAddress, User, UserId, UserName};
///
/// let user = User::new(
///     UserId::random(),
///     UserName::new("alice123").expect("name"),
///     EmailAddress::new("a@x.com").expect("email"),
/// );
/// assert_eq!(user.name().as_ref(), "alice123");
/// assert!(user.external_account().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: UserName,
    email: EmailAddress,
    external_account: Option<ExternalAccount>,
}

impl User {
    /// Build a user without an external account reference.
    #[must_use]
    pub const fn new(id: UserId, name: UserName, email: EmailAddress) -> Self {
        Self {
            id,
            name,
            email,
            external_account: None,
        }
    }

    /// Attach an external account reference.
    #[must_use]
    pub fn with_external_account(mut self, account: Option<ExternalAccount>) -> Self {
        self.external_account = account;
        self
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Unique name.
    #[must_use]
    pub const fn name(&self) -> &UserName {
        &self.name
    }

    /// Unique email address.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Optional external account reference.
    #[must_use]
    pub const fn external_account(&self) -> Option<&ExternalAccount> {
        self.external_account.as_ref()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("abc")]
    #[case("alice_123")]
    #[case("j.doe-2")]
    #[case("alice smith")]
    #[case("Zoë Ōkami")]
    #[case("<script>")]
    fn accepts_valid_names(#[case] raw: &str) {
        assert_eq!(UserName::new(raw).expect("valid").as_ref(), raw);
    }

    #[rstest]
    #[case("", UserValidationError::EmptyName)]
    #[case("   ", UserValidationError::EmptyName)]
    #[case("ab", UserValidationError::NameLength { min: 3, max: 50 })]
    fn rejects_invalid_names(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(UserName::new(raw), Err(expected));
    }

    #[rstest]
    fn rejects_names_over_limit() {
        let raw = "a".repeat(USER_NAME_MAX + 1);
        assert!(matches!(
            UserName::new(raw),
            Err(UserValidationError::NameLength { .. })
        ));
    }

    #[rstest]
    fn length_counts_characters_not_bytes() {
        let raw = "é".repeat(USER_NAME_MAX);
        assert_eq!(UserName::new(&raw).expect("valid").as_ref(), raw);
    }

    #[rstest]
    #[case("a@x.com", Ok(()))]
    #[case(" a@x.com ", Ok(()))]
    #[case("no-at-sign.com", Err(UserValidationError::InvalidEmail))]
    #[case("a@nodot", Err(UserValidationError::InvalidEmail))]
    #[case("a b@x.com", Err(UserValidationError::InvalidEmail))]
    #[case("", Err(UserValidationError::EmptyEmail))]
    fn validates_email(#[case] raw: &str, #[case] expected: Result<(), UserValidationError>) {
        assert_eq!(EmailAddress::new(raw).map(|_| ()), expected);
    }

    #[rstest]
    fn email_pattern_compiles() {
        assert!(EMAIL_RE.is_ok(), "{:?}", EMAIL_RE.as_ref().err());
    }

    #[rstest]
    fn user_id_rejects_non_uuid_and_padding() {
        assert_eq!(UserId::new("12"), Err(UserValidationError::InvalidId));
        assert_eq!(
            UserId::new(" 3fa85f64-5717-4562-b3fc-2c963f66afa6"),
            Err(UserValidationError::InvalidId)
        );
    }

    #[rstest]
    fn user_id_serializes_as_string() {
        let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("uuid");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"3fa85f64-5717-4562-b3fc-2c963f66afa6\"");
    }

    #[rstest]
    fn external_account_is_trimmed() {
        let account = ExternalAccount::new("  mal_fan ").expect("valid");
        assert_eq!(account.as_ref(), "mal_fan");
        assert_eq!(
            ExternalAccount::new("  "),
            Err(UserValidationError::EmptyExternalAccount)
        );
    }
}
