//! HTTP adapter mapping for domain errors.
//!
//! The domain `Error` stays HTTP-agnostic; this module picks the status
//! code, attaches the trace header, and redacts server-fault messages unless
//! the request runs with error details exposed.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};
use crate::middleware::error_details_exposed;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Body message returned for store failures in production.
pub const STORE_FAILURE_MESSAGE: &str = "Database operation failed";
/// Body message returned for unclassified failures in production.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest | ErrorCode::InvalidReference => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::StoreFailure | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact(error: &Error, expose: bool) -> Error {
    if expose || !error.code().is_server_fault() {
        return error.clone();
    }
    let message = match error.code() {
        ErrorCode::StoreFailure => STORE_FAILURE_MESSAGE,
        _ => INTERNAL_ERROR_MESSAGE,
    };
    error.trace_id().map_or_else(
        || Error::new(error.code(), message),
        |id| Error::new(error.code(), message).with_trace_id(id),
    )
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if self.code().is_server_fault() {
            error!(
                code = ?self.code(),
                detail = self.message(),
                trace_id = ?self.trace_id(),
                "request failed"
            );
        }
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(redact(self, error_details_exposed()))
    }
}

fn malformed(field: &str, code: &str, message: String) -> actix_web::Error {
    warn!(field, code, %message, "rejected malformed request");
    Error::invalid_request("Validation failed")
        .with_details(json!({
            "errors": [{ "field": field, "code": code, "message": message }]
        }))
        .into()
}

/// `JsonConfig` error handler producing the standard validation body.
#[must_use]
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let code = match &err {
        JsonPayloadError::ContentType => "unsupported_content_type",
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "payload_too_large"
        }
        _ => "malformed_json",
    };
    malformed("body", code, err.to_string())
}

/// `PathConfig` error handler producing the standard validation body.
#[must_use]
pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    malformed("path", "malformed_path", err.to_string())
}

/// `QueryConfig` error handler producing the standard validation body.
#[must_use]
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    malformed("query", "malformed_query", err.to_string())
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
