//! Driven port for signing and verifying bearer tokens.

use crate::domain::{IssuedToken, TokenClaims, User};

use super::define_port_error;

define_port_error! {
    /// Failures raised by token adapters.
    pub enum TokenError {
        /// The token could not be signed.
        Signing { message: String } => "token signing failed: {message}",
        /// The token is past its expiry.
        Expired => "token has expired",
        /// The token is malformed, tampered with, or signed with another key.
        Invalid { message: String } => "token is invalid: {message}",
    }
}

/// Issues and verifies signed, time-limited access tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    /// Sign a token asserting `user`'s identity.
    fn issue(&self, user: &User) -> Result<IssuedToken, TokenError>;

    /// Verify a token's signature and expiry and return its claims.
    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError>;
}
