//! Tests for HTTP error mapping.

use super::*;
use crate::middleware::trace::scope_error_details;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn store_failure_case() -> Error {
    Error::store_failure("connection refused on 10.0.0.5:5432")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"constraint": "users_pkey"}))
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::invalid_reference("dangling"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("dup"), StatusCode::CONFLICT)]
#[case(Error::store_failure("db"), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

async fn render(error: Error, expose: bool) -> (StatusCode, Option<String>, Value) {
    let response =
        scope_error_details(expose, async { ResponseError::error_response(&error) }).await;
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let body = serde_json::from_slice(&bytes).expect("error JSON");
    (status, header, body)
}

#[rstest]
#[actix_web::test]
async fn production_redacts_store_failures(store_failure_case: Error) {
    let (status, header, body) = render(store_failure_case, false).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(body["code"], "store_failure");
    assert_eq!(body["message"], STORE_FAILURE_MESSAGE);
    assert_eq!(body["traceId"], TRACE_ID);
    assert!(body.get("details").is_none());
}

#[rstest]
#[actix_web::test]
async fn production_redacts_internal_errors() {
    let (_, _, body) = render(Error::internal("token signing failed: key"), false).await;
    assert_eq!(body["code"], "internal_error");
    assert_eq!(body["message"], INTERNAL_ERROR_MESSAGE);
}

#[rstest]
#[actix_web::test]
async fn development_keeps_failure_details(store_failure_case: Error) {
    let (_, _, body) = render(store_failure_case, true).await;
    assert_eq!(body["message"], "connection refused on 10.0.0.5:5432");
    assert_eq!(body["details"]["constraint"], "users_pkey");
}

#[rstest]
#[actix_web::test]
async fn client_errors_are_never_redacted() {
    let error = Error::conflict("User already exists").with_details(json!({"field": "name"}));
    let (status, header, body) = render(error, false).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(header.is_none());
    assert_eq!(body["message"], "User already exists");
    assert_eq!(body["details"]["field"], "name");
}
