//! Genre preference HTTP handlers.
//!
//! ```text
//! POST   /api/preferences {"user_id":"…","category":"Romance","level":5}
//! GET    /api/preferences/{user_id}
//! GET    /api/preferences/{user_id}/essential
//! GET    /api/preferences/{user_id}/categories/{category}
//! PUT    /api/preferences/{user_id}/{category} {"level":3}
//! DELETE /api/preferences/{user_id}/{category}
//! GET    /api/categories/{category}/users?level=5
//! ```
//!
//! Every route accepts an optional bearer token; see [`BearerIdentity`].

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    CategoryName, Error, Preference, PreferenceLevel, UserId, UserWithPreferences,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::BearerIdentity;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::UserResponse;
use crate::inbound::http::validation::{
    FieldName, FieldViolations, parse_level_text, parse_level_value, parse_user_id,
};

const USER_ID: FieldName = FieldName::new("user_id");
const CATEGORY: FieldName = FieldName::new("category");
const LEVEL: FieldName = FieldName::new("level");

/// Message returned when a delete finds nothing.
pub const PREFERENCE_NOT_FOUND: &str = "Preference not found";

/// Body for `POST /api/preferences`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreatePreferenceRequest {
    pub user_id: Option<String>,
    pub category: Option<String>,
    /// Integer in 1..=5; defaults to 1.
    #[schema(value_type = Option<i64>)]
    pub level: Option<Value>,
}

/// Validated form of [`CreatePreferenceRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPreference {
    pub user_id: UserId,
    pub category: CategoryName,
    pub level: PreferenceLevel,
}

impl TryFrom<CreatePreferenceRequest> for NewPreference {
    type Error = Error;

    fn try_from(value: CreatePreferenceRequest) -> Result<Self, Self::Error> {
        let mut violations = FieldViolations::new();
        let parsed_user = violations.require(USER_ID, value.user_id, UserId::new);
        let parsed_category = violations.require(CATEGORY, value.category, CategoryName::new);
        let parsed_level = match value.level {
            None | Some(Value::Null) => Some(PreferenceLevel::default()),
            Some(raw) => violations.check(LEVEL, parse_level_value(&raw)),
        };
        match (parsed_user, parsed_category, parsed_level) {
            (Some(user_id), Some(category), Some(level)) => Ok(Self {
                user_id,
                category,
                level,
            }),
            _ => Err(violations.into_error()),
        }
    }
}

/// Body for `PUT /api/preferences/{user_id}/{category}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdatePreferenceRequest {
    /// Integer in 1..=5.
    #[schema(value_type = i64)]
    pub level: Option<Value>,
}

/// Query string for `GET /api/categories/{category}/users`.
#[derive(Debug, Default, Deserialize)]
pub struct LevelQuery {
    pub level: Option<String>,
}

/// Wire shape of one preference.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct PreferenceResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    pub level: u8,
}

impl From<&Preference> for PreferenceResponse {
    fn from(preference: &Preference) -> Self {
        Self {
            id: *preference.id.as_uuid(),
            user_id: *preference.user_id.as_uuid(),
            category: preference.category.as_ref().to_owned(),
            level: preference.level.value(),
        }
    }
}

fn preference_list(preferences: &[Preference]) -> Vec<PreferenceResponse> {
    preferences.iter().map(PreferenceResponse::from).collect()
}

/// A user with every preference they hold.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UserPreferencesResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub preferences: Vec<PreferenceResponse>,
}

impl From<UserWithPreferences> for UserPreferencesResponse {
    fn from(value: UserWithPreferences) -> Self {
        let UserResponse { id, name, email } = UserResponse::from(&value.user);
        Self {
            id,
            name,
            email,
            preferences: preference_list(&value.preferences),
        }
    }
}

fn path_user(raw: &str) -> ApiResult<UserId> {
    parse_user_id(raw, USER_ID)
}

fn path_user_and_category(raw_user: &str, raw_category: &str) -> ApiResult<(UserId, CategoryName)> {
    let mut violations = FieldViolations::new();
    let parsed_user = violations.check(USER_ID, UserId::new(raw_user));
    let parsed_category = violations.check(CATEGORY, CategoryName::new(raw_category));
    match (parsed_user, parsed_category) {
        (Some(user_id), Some(category)) => Ok((user_id, category)),
        _ => Err(violations.into_error()),
    }
}

/// Record a preference, creating the category when it is new.
#[utoipa::path(
    post,
    path = "/api/preferences",
    request_body = CreatePreferenceRequest,
    responses(
        (status = 201, description = "Preference created", body = PreferenceResponse),
        (status = 400, description = "Invalid request or unknown user", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 403, description = "Token names another user", body = Error),
        (status = 409, description = "Preference already exists", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["preferences"],
    operation_id = "createPreference"
)]
#[post("/preferences")]
pub async fn create_preference(
    state: web::Data<HttpState>,
    identity: BearerIdentity,
    payload: web::Json<CreatePreferenceRequest>,
) -> ApiResult<HttpResponse> {
    let request = NewPreference::try_from(payload.into_inner())?;
    identity.authorize_user(&request.user_id)?;
    let preference = state
        .preferences
        .add(&request.user_id, &request.category, request.level)
        .await?;
    Ok(HttpResponse::Created().json(PreferenceResponse::from(&preference)))
}

/// A user and all of their preferences.
#[utoipa::path(
    get,
    path = "/api/preferences/{user_id}",
    params(("user_id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User with preferences", body = UserPreferencesResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 403, description = "Token names another user", body = Error),
        (status = 404, description = "User not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["preferences"],
    operation_id = "getUserPreferences"
)]
#[get("/preferences/{user_id}")]
pub async fn get_user_preferences(
    state: web::Data<HttpState>,
    identity: BearerIdentity,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserPreferencesResponse>> {
    let user_id = path_user(&path)?;
    identity.authorize_user(&user_id)?;
    let found = state.preferences_query.user_with_preferences(&user_id).await?;
    Ok(web::Json(UserPreferencesResponse::from(found)))
}

/// The user's level-5 preferences.
#[utoipa::path(
    get,
    path = "/api/preferences/{user_id}/essential",
    params(("user_id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Essential preferences", body = [PreferenceResponse]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 403, description = "Token names another user", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["preferences"],
    operation_id = "getEssentialPreferences"
)]
#[get("/preferences/{user_id}/essential")]
pub async fn get_essential_preferences(
    state: web::Data<HttpState>,
    identity: BearerIdentity,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<PreferenceResponse>>> {
    let user_id = path_user(&path)?;
    identity.authorize_user(&user_id)?;
    let preferences = state.preferences_query.essential(&user_id).await?;
    Ok(web::Json(preference_list(&preferences)))
}

/// The user's preferences within one category.
#[utoipa::path(
    get,
    path = "/api/preferences/{user_id}/categories/{category}",
    params(
        ("user_id" = Uuid, Path, description = "User identifier"),
        ("category" = String, Path, description = "Category name, case-insensitive")
    ),
    responses(
        (status = 200, description = "Preferences in the category", body = [PreferenceResponse]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 403, description = "Token names another user", body = Error),
        (status = 404, description = "Category not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["preferences"],
    operation_id = "getPreferencesByCategory"
)]
#[get("/preferences/{user_id}/categories/{category}")]
pub async fn get_preferences_by_category(
    state: web::Data<HttpState>,
    identity: BearerIdentity,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Vec<PreferenceResponse>>> {
    let (raw_user, raw_category) = path.into_inner();
    let (user_id, category) = path_user_and_category(&raw_user, &raw_category)?;
    identity.authorize_user(&user_id)?;
    let preferences = state
        .preferences_query
        .in_category(&user_id, &category)
        .await?;
    Ok(web::Json(preference_list(&preferences)))
}

/// Change the level of an existing preference.
#[utoipa::path(
    put,
    path = "/api/preferences/{user_id}/{category}",
    params(
        ("user_id" = Uuid, Path, description = "User identifier"),
        ("category" = String, Path, description = "Category name, case-insensitive")
    ),
    request_body = UpdatePreferenceRequest,
    responses(
        (status = 200, description = "Updated preference", body = PreferenceResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 403, description = "Token names another user", body = Error),
        (status = 404, description = "Category or preference not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["preferences"],
    operation_id = "updatePreference"
)]
#[put("/preferences/{user_id}/{category}")]
pub async fn update_preference(
    state: web::Data<HttpState>,
    identity: BearerIdentity,
    path: web::Path<(String, String)>,
    payload: web::Json<UpdatePreferenceRequest>,
) -> ApiResult<web::Json<PreferenceResponse>> {
    let (raw_user, raw_category) = path.into_inner();
    let mut violations = FieldViolations::new();
    let user_id = violations.check(USER_ID, UserId::new(&raw_user));
    let category = violations.check(CATEGORY, CategoryName::new(&raw_category));
    let level = match payload.into_inner().level {
        None | Some(Value::Null) => {
            violations.missing(LEVEL);
            None
        }
        Some(raw) => violations.check(LEVEL, parse_level_value(&raw)),
    };
    let (Some(user_id), Some(category), Some(level)) = (user_id, category, level) else {
        return Err(violations.into_error());
    };

    identity.authorize_user(&user_id)?;
    let updated = state
        .preferences
        .update(&user_id, &category, level)
        .await?;
    Ok(web::Json(PreferenceResponse::from(&updated)))
}

/// Delete a preference.
#[utoipa::path(
    delete,
    path = "/api/preferences/{user_id}/{category}",
    params(
        ("user_id" = Uuid, Path, description = "User identifier"),
        ("category" = String, Path, description = "Category name, case-insensitive")
    ),
    responses(
        (status = 200, description = "Preference deleted"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 403, description = "Token names another user", body = Error),
        (status = 404, description = "Preference not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["preferences"],
    operation_id = "deletePreference"
)]
#[delete("/preferences/{user_id}/{category}")]
pub async fn delete_preference(
    state: web::Data<HttpState>,
    identity: BearerIdentity,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (raw_user, raw_category) = path.into_inner();
    let (user_id, category) = path_user_and_category(&raw_user, &raw_category)?;
    identity.authorize_user(&user_id)?;
    if !state.preferences.remove(&user_id, &category).await? {
        return Err(Error::not_found(PREFERENCE_NOT_FOUND));
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Preference deleted successfully" })))
}

/// Users holding exactly `level` for a category.
#[utoipa::path(
    get,
    path = "/api/categories/{category}/users",
    params(
        ("category" = String, Path, description = "Category name, case-insensitive"),
        ("level" = i64, Query, description = "Level in 1..=5")
    ),
    responses(
        (status = 200, description = "Matching users", body = [UserResponse]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "Category not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["preferences"],
    operation_id = "findUsersByPreference"
)]
#[get("/categories/{category}/users")]
pub async fn find_users_by_preference(
    state: web::Data<HttpState>,
    _identity: BearerIdentity,
    path: web::Path<String>,
    query: web::Query<LevelQuery>,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let mut violations = FieldViolations::new();
    let category = violations.check(CATEGORY, CategoryName::new(path.as_str()));
    let level = violations.require(LEVEL, query.into_inner().level, |raw| parse_level_text(&raw));
    let (Some(category), Some(level)) = (category, level) else {
        return Err(violations.into_error());
    };

    let users = state
        .preferences_query
        .users_with_preference(&category, level)
        .await?;
    Ok(web::Json(users.iter().map(UserResponse::from).collect()))
}

#[cfg(test)]
#[path = "preferences_tests.rs"]
mod tests;
