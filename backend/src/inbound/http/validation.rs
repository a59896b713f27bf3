//! Shared validation helpers for inbound HTTP adapters.
//!
//! Handlers validate every field before calling a port and report all
//! violations at once as `details.errors: [{field, code, message}]` under the
//! message "Validation failed".

use std::fmt::Display;

use serde_json::{Value, json};

use crate::domain::{
    Error, PasswordValidationError, PreferenceLevel, PreferenceValidationError,
    UserId, UserValidationError,
};

/// Top-level message for every validation failure.
pub const VALIDATION_FAILED: &str = "Validation failed";

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) const fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Machine-readable code for a rejected value.
pub(crate) trait ViolationCode: Display {
    fn violation_code(&self) -> &'static str;
}

impl ViolationCode for UserValidationError {
    fn violation_code(&self) -> &'static str {
        self.code()
    }
}

impl ViolationCode for PasswordValidationError {
    fn violation_code(&self) -> &'static str {
        self.code()
    }
}

impl ViolationCode for PreferenceValidationError {
    fn violation_code(&self) -> &'static str {
        self.code()
    }
}

/// Collects field violations so one response can report all of them.
#[derive(Debug, Default)]
pub(crate) struct FieldViolations {
    errors: Vec<Value>,
}

impl FieldViolations {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, field: FieldName, code: &str, message: impl Into<String>) {
        self.errors.push(json!({
            "field": field.as_str(),
            "code": code,
            "message": message.into(),
        }));
    }

    /// Record a missing required field.
    pub(crate) fn missing(&mut self, field: FieldName) {
        self.push(
            field,
            "missing_field",
            format!("{} is required", field.as_str()),
        );
    }

    /// Keep the parsed value or record why it was rejected.
    pub(crate) fn check<T, E: ViolationCode>(
        &mut self,
        field: FieldName,
        parsed: Result<T, E>,
    ) -> Option<T> {
        parsed
            .map_err(|error| self.push(field, error.violation_code(), error.to_string()))
            .ok()
    }

    /// Validate a required field that arrived as an optional value.
    pub(crate) fn require<R, T, E: ViolationCode>(
        &mut self,
        field: FieldName,
        raw: Option<R>,
        parse: impl FnOnce(R) -> Result<T, E>,
    ) -> Option<T> {
        let Some(value) = raw else {
            self.missing(field);
            return None;
        };
        self.check(field, parse(value))
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The accumulated violations as a request error.
    pub(crate) fn into_error(self) -> Error {
        Error::invalid_request(VALIDATION_FAILED).with_details(json!({ "errors": self.errors }))
    }

    /// `Ok(())` when nothing was recorded.
    pub(crate) fn finish(self) -> Result<(), Error> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }
}

/// Rejected level input. Levels arrive as JSON numbers or numeric strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum LevelInputError {
    #[error("level must be an integer")]
    NotAnInteger,
    #[error(transparent)]
    Range(#[from] PreferenceValidationError),
}

impl ViolationCode for LevelInputError {
    fn violation_code(&self) -> &'static str {
        match self {
            Self::NotAnInteger => "invalid_level",
            Self::Range(inner) => inner.code(),
        }
    }
}

/// Parse a level from a JSON value.
pub(crate) fn parse_level_value(value: &Value) -> Result<PreferenceLevel, LevelInputError> {
    let raw = match value {
        Value::Number(number) => number.as_i64().ok_or(LevelInputError::NotAnInteger)?,
        Value::String(text) => parse_level_digits(text)?,
        _ => return Err(LevelInputError::NotAnInteger),
    };
    Ok(PreferenceLevel::new(raw)?)
}

/// Parse a level from text such as a query-string value.
pub(crate) fn parse_level_text(text: &str) -> Result<PreferenceLevel, LevelInputError> {
    Ok(PreferenceLevel::new(parse_level_digits(text)?)?)
}

fn parse_level_digits(text: &str) -> Result<i64, LevelInputError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| LevelInputError::NotAnInteger)
}

/// Parse a user id from a path segment.
pub(crate) fn parse_user_id(raw: &str, field: FieldName) -> Result<UserId, Error> {
    let mut violations = FieldViolations::new();
    let parsed = violations.check(field, UserId::new(raw));
    violations.finish()?;
    parsed.ok_or_else(|| Error::internal("user id parse reported no violation"))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    const LEVEL: FieldName = FieldName::new("level");

    #[rstest]
    #[case(json!(1), 1)]
    #[case(json!(5), 5)]
    #[case(json!("3"), 3)]
    #[case(json!(" 4 "), 4)]
    fn accepts_integer_levels(#[case] value: Value, #[case] expected: u8) {
        assert_eq!(parse_level_value(&value).expect("valid").value(), expected);
    }

    #[rstest]
    #[case(json!(0), "out_of_range")]
    #[case(json!(6), "out_of_range")]
    #[case(json!("-1"), "out_of_range")]
    #[case(json!(2.5), "invalid_level")]
    #[case(json!("high"), "invalid_level")]
    #[case(json!(true), "invalid_level")]
    #[case(Value::Null, "invalid_level")]
    fn rejects_bad_levels(#[case] value: Value, #[case] code: &str) {
        let error = parse_level_value(&value).expect_err("invalid level");
        assert_eq!(error.violation_code(), code);
    }

    #[rstest]
    fn violations_accumulate_in_order() {
        let mut violations = FieldViolations::new();
        violations.missing(FieldName::new("user_id"));
        let level = violations.check(LEVEL, parse_level_value(&json!(9)));
        assert!(level.is_none());

        let error = violations.finish().expect_err("two violations");
        assert_eq!(error.message(), VALIDATION_FAILED);
        let errors = error
            .details()
            .and_then(|details| details.get("errors"))
            .and_then(Value::as_array)
            .expect("errors array");
        let fields: Vec<&str> = errors
            .iter()
            .filter_map(|entry| entry.get("field").and_then(Value::as_str))
            .collect();
        assert_eq!(fields, ["user_id", "level"]);
        assert_eq!(errors[0]["code"], "missing_field");
        assert_eq!(errors[1]["code"], "out_of_range");
    }

    #[rstest]
    fn finish_succeeds_without_violations() {
        assert!(FieldViolations::new().finish().is_ok());
    }

    #[rstest]
    #[case("not-a-uuid")]
    #[case("")]
    fn malformed_user_ids_are_invalid_requests(#[case] raw: &str) {
        let error = parse_user_id(raw, FieldName::new("user_id")).expect_err("invalid");
        assert_eq!(error.code(), crate::domain::ErrorCode::InvalidRequest);
    }
}
