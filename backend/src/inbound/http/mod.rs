//! HTTP inbound adapter exposing the REST endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod preferences;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub(crate) mod validation;

use actix_web::{Scope, web};

pub use error::ApiResult;

/// Every `/api` route, with extractor failures rendered as validation
/// errors. Handlers expect [`state::HttpState`] in app data.
pub fn api_scope() -> Scope {
    web::scope("/api")
        .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .service(users::register)
        .service(users::login)
        .service(preferences::create_preference)
        .service(preferences::get_essential_preferences)
        .service(preferences::get_preferences_by_category)
        .service(preferences::get_user_preferences)
        .service(preferences::update_preference)
        .service(preferences::delete_preference)
        .service(preferences::find_users_by_preference)
}
