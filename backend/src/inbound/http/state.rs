//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` and depend only on domain ports, so
//! they stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    LoginService, PreferencesCommand, PreferencesQuery, RegistrationService, TokenIssuer,
};

use super::auth::BearerPolicy;

/// Parameter object bundling the port implementations handlers need.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
    pub preferences: Arc<dyn PreferencesCommand>,
    pub preferences_query: Arc<dyn PreferencesQuery>,
    pub tokens: Arc<dyn TokenIssuer>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
    pub preferences: Arc<dyn PreferencesCommand>,
    pub preferences_query: Arc<dyn PreferencesQuery>,
    pub tokens: Arc<dyn TokenIssuer>,
    pub bearer_policy: BearerPolicy,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state with bearer tokens optional.
    #[must_use]
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            registration,
            preferences,
            preferences_query,
            tokens,
        } = ports;
        Self {
            login,
            registration,
            preferences,
            preferences_query,
            tokens,
            bearer_policy: BearerPolicy::default(),
        }
    }

    /// Replace the bearer policy.
    #[must_use]
    pub const fn with_bearer_policy(mut self, policy: BearerPolicy) -> Self {
        self.bearer_policy = policy;
        self
    }
}
