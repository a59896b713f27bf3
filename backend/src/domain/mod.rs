//! Domain core: value types, services, and the ports they depend on.
//!
//! Nothing in this module knows about HTTP, Diesel, bcrypt, or JWT; those
//! live in the inbound and outbound adapters.

pub mod account_service;
pub mod auth;
pub mod error;
pub mod ports;
pub mod preferences;
pub mod preferences_service;
pub mod token;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{
    LoginCredentials, Password, PasswordHash, PasswordValidationError, Registration,
};
pub use self::error::{Error, ErrorCode};
pub use self::preferences::{
    Category, CategoryId, CategoryName, Preference, PreferenceId, PreferenceLevel,
    PreferenceValidationError, UserWithPreferences,
};
pub use self::preferences_service::PreferencesService;
pub use self::token::{IssuedToken, TokenClaims};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EmailAddress, ExternalAccount, User, UserId, UserName, UserValidationError,
};
