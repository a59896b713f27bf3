//! Bearer token model shared by the token issuer port and its adapters.

use chrono::{DateTime, Duration, Utc};

use super::{EmailAddress, User, UserId, UserName};

/// Lifetime of an issued access token.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Token lifetime as a [`Duration`].
#[must_use]
pub const fn token_ttl() -> Duration {
    Duration::hours(TOKEN_TTL_HOURS)
}

/// Identity asserted by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    user_id: UserId,
    name: UserName,
    email: EmailAddress,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl TokenClaims {
    /// Claims for `user`, valid from `issued_at` for [`TOKEN_TTL_HOURS`].
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use tokku::domain::{EmailAddress, TokenClaims, User, UserId, UserName};
    ///
    /// let user = User::new(
    ///     UserId::random(),
    ///     UserName::new("alice123").expect("name"),
    ///     EmailAddress::new("a@x.com").expect("email"),
    /// );
    /// let now = Utc::now();
    /// let claims = TokenClaims::for_user(&user, now);
    /// assert_eq!((claims.expires_at() - now).num_hours(), 24);
    /// ```
    #[must_use]
    pub fn for_user(user: &User, issued_at: DateTime<Utc>) -> Self {
        Self {
            user_id: *user.id(),
            name: user.name().clone(),
            email: user.email().clone(),
            issued_at,
            expires_at: issued_at + token_ttl(),
        }
    }

    /// Rebuild claims decoded from a token.
    #[must_use]
    pub const fn from_parts(
        user_id: UserId,
        name: UserName,
        email: EmailAddress,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            name,
            email,
            issued_at,
            expires_at,
        }
    }

    /// Subject of the token.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Name at issue time.
    #[must_use]
    pub const fn name(&self) -> &UserName {
        &self.name
    }

    /// Email at issue time.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Issue instant.
    #[must_use]
    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Expiry instant.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

/// Signed token handed to a client after login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Wrap an encoded token and its expiry.
    #[must_use]
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Encoded bearer token.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.token.as_str()
    }

    /// Expiry instant.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}
