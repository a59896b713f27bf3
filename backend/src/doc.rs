//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer together
//! with the request and response DTOs and the shared [`Error`] body. The
//! document backs Swagger UI in debug builds and is exported by
//! `cargo run --bin openapi-dump`.

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::preferences::{
    CreatePreferenceRequest, PreferenceResponse, UpdatePreferenceRequest,
    UserPreferencesResponse,
};
use crate::inbound::http::users::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserResponse,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer security scheme in the generated document.
pub const BEARER_SCHEME: &str = "BearerToken";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let bearer = HttpBuilder::new()
            .scheme(HttpAuthScheme::Bearer)
            .bearer_format("JWT")
            .description(Some("Token returned by POST /api/login."))
            .build();
        components.add_security_scheme(BEARER_SCHEME, SecurityScheme::Http(bearer));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Tokku API",
        description = "Accounts and anime genre preferences."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::preferences::create_preference,
        crate::inbound::http::preferences::get_user_preferences,
        crate::inbound::http::preferences::get_essential_preferences,
        crate::inbound::http::preferences::get_preferences_by_category,
        crate::inbound::http::preferences::update_preference,
        crate::inbound::http::preferences::delete_preference,
        crate::inbound::http::preferences::find_users_by_preference,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        RegisterRequest,
        RegisterResponse,
        LoginRequest,
        LoginResponse,
        UserResponse,
        CreatePreferenceRequest,
        UpdatePreferenceRequest,
        PreferenceResponse,
        UserPreferencesResponse,
    )),
    tags(
        (name = "users", description = "Registration and login"),
        (name = "preferences", description = "Per-user genre preferences"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Structure of the generated document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn object_has_field(schema: &RefOr<Schema>, field: &str) -> bool {
        matches!(schema, RefOr::T(Schema::Object(obj)) if obj.properties.contains_key(field))
    }

    #[rstest]
    #[case("Error", "code")]
    #[case("Error", "message")]
    #[case("PreferenceResponse", "level")]
    #[case("UserResponse", "email")]
    #[case("LoginResponse", "token")]
    fn schemas_carry_their_fields(#[case] schema: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let found = schemas.get(schema).expect("schema registered");
        assert!(object_has_field(found, field), "{schema} lacks {field}");
    }

    #[rstest]
    #[case("/api/register")]
    #[case("/api/login")]
    #[case("/api/preferences")]
    #[case("/api/preferences/{user_id}")]
    #[case("/api/preferences/{user_id}/essential")]
    #[case("/api/preferences/{user_id}/categories/{category}")]
    #[case("/api/preferences/{user_id}/{category}")]
    #[case("/api/categories/{category}/users")]
    #[case("/health/ready")]
    fn every_route_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "{path} missing");
    }

    #[rstest]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key(BEARER_SCHEME));
    }
}
