//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use tokku::inbound::http::auth::BearerPolicy;
use tokku::outbound::persistence::DbPool;
use zeroize::Zeroizing;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) jwt_secret: Zeroizing<String>,
    pub(crate) bearer_policy: BearerPolicy,
    pub(crate) expose_error_details: bool,
}

impl ServerConfig {
    /// Bearer tokens optional, server-fault messages redacted.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool, jwt_secret: Zeroizing<String>) -> Self {
        Self {
            bind_addr,
            db_pool,
            jwt_secret,
            bearer_policy: BearerPolicy::default(),
            expose_error_details: false,
        }
    }

    #[must_use]
    pub fn with_bearer_policy(mut self, policy: BearerPolicy) -> Self {
        self.bearer_policy = policy;
        self
    }

    /// Keep server-fault messages in error bodies. Never enable in production.
    #[must_use]
    pub fn exposing_error_details(mut self, expose: bool) -> Self {
        self.expose_error_details = expose;
        self
    }
}
