//! HS256 JSON Web Token implementation of [`TokenIssuer`].
//!
//! The payload carries `id`, `name`, and `email` alongside the registered
//! `iat` and `exp` claims.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::ports::{TokenError, TokenIssuer};
use crate::domain::{EmailAddress, IssuedToken, TokenClaims, User, UserId, UserName};

#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    id: Uuid,
    name: String,
    email: String,
    iat: i64,
    exp: i64,
}

impl From<&TokenClaims> for WireClaims {
    fn from(claims: &TokenClaims) -> Self {
        Self {
            id: *claims.user_id().as_uuid(),
            name: claims.name().as_ref().to_owned(),
            email: claims.email().as_ref().to_owned(),
            iat: claims.issued_at().timestamp(),
            exp: claims.expires_at().timestamp(),
        }
    }
}

fn timestamp(seconds: i64, claim: &str) -> Result<DateTime<Utc>, TokenError> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| TokenError::invalid(format!("{claim} is out of range")))
}

impl TryFrom<WireClaims> for TokenClaims {
    type Error = TokenError;

    fn try_from(wire: WireClaims) -> Result<Self, Self::Error> {
        let name =
            UserName::new(&wire.name).map_err(|error| TokenError::invalid(error.to_string()))?;
        let email =
            EmailAddress::new(&wire.email).map_err(|error| TokenError::invalid(error.to_string()))?;
        Ok(Self::from_parts(
            UserId::from_uuid(wire.id),
            name,
            email,
            timestamp(wire.iat, "iat")?,
            timestamp(wire.exp, "exp")?,
        ))
    }
}

/// Signs and verifies tokens with a shared HMAC secret.
pub struct JwtTokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtTokenIssuer {
    /// Build an issuer from the signing secret. The caller's copy is wiped
    /// once the keys are derived.
    #[must_use]
    pub fn new(secret: Zeroizing<String>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    fn sign(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        encode(
            &Header::new(Algorithm::HS256),
            &WireClaims::from(claims),
            &self.encoding,
        )
        .map_err(|error| TokenError::signing(error.to_string()))
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, user: &User) -> Result<IssuedToken, TokenError> {
        let claims = TokenClaims::for_user(user, Utc::now());
        let token = self.sign(&claims)?;
        debug!(user_id = %user.id(), expires_at = %claims.expires_at(), "issued token");
        Ok(IssuedToken::new(token, claims.expires_at()))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let decoded = decode::<WireClaims>(token, &self.decoding, &self.validation).map_err(
            |error| match error.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::invalid(error.to_string()),
            },
        )?;
        TokenClaims::try_from(decoded.claims)
    }
}
