//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports (`UserRepository`, `PreferenceRepository`, `PasswordHasher`,
//! `TokenIssuer`, `StoreProbe`) describe what the domain needs from infrastructure and
//! expose closed error enums instead of driver errors. Driving ports
//! (`LoginService`, `RegistrationService`, `PreferencesCommand`,
//! `PreferencesQuery`) are what inbound adapters call.

mod macros;

mod login_service;
mod password_hasher;
mod preference_repository;
mod preferences_command;
mod preferences_query;
mod store_probe;
mod token_issuer;
mod user_repository;

pub(crate) use macros::define_port_error;

pub use login_service::{LoginOutcome, LoginService, RegistrationService};
#[cfg(test)]
pub use login_service::{MockLoginService, MockRegistrationService};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use preference_repository::MockPreferenceRepository;
pub use preference_repository::{
    PreferenceFilter, PreferenceRepository, PreferenceRepositoryError,
};
#[cfg(test)]
pub use preferences_command::MockPreferencesCommand;
pub use preferences_command::PreferencesCommand;
#[cfg(test)]
pub use preferences_query::MockPreferencesQuery;
pub use preferences_query::PreferencesQuery;
#[cfg(test)]
pub use store_probe::MockStoreProbe;
pub use store_probe::{StoreProbe, StoreProbeError};
#[cfg(test)]
pub use token_issuer::MockTokenIssuer;
pub use token_issuer::{TokenError, TokenIssuer};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserAccount, UserPersistenceError, UserRepository};
