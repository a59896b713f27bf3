//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::domain::ports::{
    MockLoginService, MockPreferencesCommand, MockPreferencesQuery, MockRegistrationService,
    MockTokenIssuer,
};
use crate::domain::{EmailAddress, TokenClaims, User, UserId, UserName};

use super::auth::BearerPolicy;
use super::state::{HttpState, HttpStatePorts};

/// Mocks for every port; tests set expectations on the ones they exercise.
#[derive(Default)]
pub struct MockPorts {
    pub login: MockLoginService,
    pub registration: MockRegistrationService,
    pub preferences: MockPreferencesCommand,
    pub preferences_query: MockPreferencesQuery,
    pub tokens: MockTokenIssuer,
}

impl MockPorts {
    /// Build state from the mocks.
    pub fn into_state(self, policy: BearerPolicy) -> HttpState {
        HttpState::new(HttpStatePorts {
            login: Arc::new(self.login),
            registration: Arc::new(self.registration),
            preferences: Arc::new(self.preferences),
            preferences_query: Arc::new(self.preferences_query),
            tokens: Arc::new(self.tokens),
        })
        .with_bearer_policy(policy)
    }
}

/// State where only the token issuer is configured.
pub fn state_with_tokens(tokens: MockTokenIssuer, policy: BearerPolicy) -> HttpState {
    MockPorts {
        tokens,
        ..MockPorts::default()
    }
    .into_state(policy)
}

/// A valid user named `alice123`.
pub fn sample_user(id: UserId) -> User {
    User::new(
        id,
        UserName::new("alice123").expect("fixture name"),
        EmailAddress::new("a@x.com").expect("fixture email"),
    )
}

/// Unexpired claims for `user_id`.
pub fn token_claims(user_id: UserId) -> TokenClaims {
    let now = Utc::now();
    TokenClaims::from_parts(
        user_id,
        UserName::new("alice123").expect("fixture name"),
        EmailAddress::new("a@x.com").expect("fixture email"),
        now,
        now + Duration::hours(24),
    )
}
