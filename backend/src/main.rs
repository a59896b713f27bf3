//! Backend entry-point: loads settings, migrates the store, and serves the API.

mod server;

use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{WrapErr, eyre};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use tokku::inbound::http::auth::BearerPolicy;
use tokku::inbound::http::health::HealthState;
use tokku::outbound::persistence::{DbPool, run_migrations};
use tokku::settings::AppSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let settings = AppSettings::load_with_env_file(std::env::args_os())?;
    init_tracing();

    let environment = settings.environment()?;
    let jwt_secret = settings.jwt_secret()?;
    let bind_addr = resolve_bind_addr(settings.host(), settings.port())?;

    let applied = run_migrations(settings.database_url()?)
        .await
        .wrap_err("database migrations failed")?;
    info!(applied, "database schema is current");

    let pool = DbPool::new(settings.pool_config()?)
        .await
        .wrap_err("failed to create database pool")?;

    let health_state = web::Data::new(HealthState::new().with_store_probe(Arc::new(pool.clone())));
    let config = ServerConfig::new(bind_addr, pool, jwt_secret)
        .with_bearer_policy(BearerPolicy::from_required(settings.require_bearer_token))
        .exposing_error_details(environment.exposes_error_details());

    info!(
        %bind_addr,
        %environment,
        require_bearer_token = settings.require_bearer_token,
        "starting server"
    );
    create_server(health_state, config)?.await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %e, "tracing init failed");
    }
}

fn resolve_bind_addr(host: &str, port: u16) -> color_eyre::Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()
        .wrap_err_with(|| format!("invalid bind address {host}:{port}"))?
        .next()
        .ok_or_else(|| eyre!("{host}:{port} resolved to no address"))
}
