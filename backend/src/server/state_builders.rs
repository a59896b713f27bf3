//! Wires the database-backed adapters into the HTTP state ports.

use std::sync::Arc;

use actix_web::web;

use tokku::domain::{AccountService, PreferencesService};
use tokku::inbound::http::state::{HttpState, HttpStatePorts};
use tokku::outbound::persistence::{DbPool, DieselPreferenceRepository, DieselUserRepository};
use tokku::outbound::security::{BcryptPasswordHasher, JwtTokenIssuer};

use super::ServerConfig;

/// Build handler state from the pool and signing secret in `config`.
pub(crate) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let users = Arc::new(DieselUserRepository::new(config.db_pool.clone()));
    let preferences = Arc::new(DieselPreferenceRepository::new(config.db_pool.clone()));
    let tokens = Arc::new(JwtTokenIssuer::new(config.jwt_secret.clone()));

    let accounts = Arc::new(AccountService::new(
        users.clone(),
        Arc::new(BcryptPasswordHasher::new()),
        tokens.clone(),
    ));
    let preference_service = Arc::new(PreferencesService::new(preferences, users));

    let ports = HttpStatePorts {
        login: accounts.clone(),
        registration: accounts,
        preferences: preference_service.clone(),
        preferences_query: preference_service,
        tokens,
    };
    web::Data::new(HttpState::new(ports).with_bearer_policy(config.bearer_policy))
}
