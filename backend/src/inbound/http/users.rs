//! Account HTTP handlers.
//!
//! ```text
//! POST /api/register {"name":"alice123","email":"a@x.com","password":"secret1"}
//! POST /api/login {"name":"alice123","password":"secret1"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    EmailAddress, Error, ExternalAccount, LoginCredentials, Password, Registration, User, UserName,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, FieldViolations};

const NAME: FieldName = FieldName::new("name");
const EMAIL: FieldName = FieldName::new("email");
const PASSWORD: FieldName = FieldName::new("password");
const EXTERNAL_ACCOUNT: FieldName = FieldName::new("external_account");

/// Registration body for `POST /api/register`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Optional anime-tracker account name.
    pub external_account: Option<String>,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        let mut violations = FieldViolations::new();
        let parsed_name = violations.require(NAME, value.name, UserName::new);
        let parsed_email = violations.require(EMAIL, value.email, EmailAddress::new);
        let parsed_password =
            violations.require(PASSWORD, value.password, |raw| Password::new(&raw));
        let parsed_account = match value.external_account {
            Some(raw) if !raw.trim().is_empty() => {
                violations.check(EXTERNAL_ACCOUNT, ExternalAccount::new(raw).map(Some))
            }
            _ => Some(None),
        };
        match (parsed_name, parsed_email, parsed_password, parsed_account) {
            (Some(name), Some(email), Some(password), Some(external_account)) => {
                Ok(Self::new(name, email, password).with_external_account(external_account))
            }
            _ => Err(violations.into_error()),
        }
    }
}

/// Login body for `POST /api/login`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = Error;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        let mut violations = FieldViolations::new();
        let parsed_name = violations.require(NAME, value.name, UserName::new);
        let parsed_password =
            violations.require(PASSWORD, value.password, |raw| Password::new(&raw));
        match (parsed_name, parsed_password) {
            (Some(name), Some(password)) => Ok(Self::new(name, password)),
            _ => Err(violations.into_error()),
        }
    }
}

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id().as_uuid(),
            name: user.name().as_ref().to_owned(),
            email: user.email().as_ref().to_owned(),
        }
    }
}

/// Body returned after registration.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserResponse,
}

/// Body returned after login.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    /// HS256 bearer token valid for 24 hours.
    pub token: String,
    pub user: UserResponse,
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Name or email taken", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from(payload.into_inner())?;
    let user = state.registration.register(&registration).await?;
    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "Success!".to_owned(),
        user: UserResponse::from(&user),
    }))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid password", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from(payload.into_inner())?;
    let outcome = state.login.authenticate(&credentials).await?;
    Ok(HttpResponse::Ok().json(LoginResponse {
        message: "Login successful".to_owned(),
        token: outcome.token.as_str().to_owned(),
        user: UserResponse::from(&outcome.user),
    }))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
