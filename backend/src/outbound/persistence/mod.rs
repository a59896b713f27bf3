//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories translate between internal row structs and domain types;
//! no business rules live here. Connections come from a `bb8` pool of
//! `diesel-async` connections, and every driver failure is classified once in
//! `error_mapping` before being turned into the relevant port error.
//!
//! ```ignore
//! use tokku::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/tokku")).await?;
//! let users = DieselUserRepository::new(pool.clone());
//! ```

mod diesel_preference_repository;
mod diesel_user_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_preference_repository::DieselPreferenceRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
