//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every rejection is an `invalid_request` error whose details name the
//! offending field and a stable machine-readable code.

use actix_web::error::{InternalError, JsonPayloadError, PathError};
use actix_web::{HttpRequest, ResponseError, web};
use serde_json::json;

use crate::domain::{Error, UserValidationError};

const MISSING_FIELD: &str = "missing_field";

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

/// Error for a required body field that was absent or null.
pub(crate) fn missing_field_error(field: FieldName) -> Error {
    Error::invalid_request(format!("{} is required", field.as_str())).with_details(json!({
        "field": field.as_str(),
        "code": MISSING_FIELD,
    }))
}

/// Unwrap a required body field.
pub(crate) fn require(value: Option<String>, field: FieldName) -> Result<String, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Map a domain validation failure onto the request error shape.
pub(crate) fn map_validation_error(error: UserValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field(),
        "code": error.code(),
    }))
}

fn json_error_message(error: &JsonPayloadError) -> String {
    match error {
        JsonPayloadError::ContentType => "expected an application/json body".to_owned(),
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            "request body too large".to_owned()
        }
        other => format!("invalid JSON body: {other}"),
    }
}

/// `JsonConfig` whose decode failures use the domain error payload.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|error: JsonPayloadError, _req: &HttpRequest| {
            let response = Error::invalid_request(json_error_message(&error))
                .with_details(json!({ "code": "invalid_json" }))
                .error_response();
            InternalError::from_response(error, response).into()
        })
}

/// `PathConfig` whose decode failures use the domain error payload.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|error: PathError, _req: &HttpRequest| {
        let response = Error::invalid_request(format!("invalid path parameter: {error}"))
            .with_details(json!({ "code": "invalid_path" }))
            .error_response();
        InternalError::from_response(error, response).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, Username};
    use rstest::rstest;

    #[rstest]
    fn missing_field_names_field_and_code() {
        let err = missing_field_error(FieldName::new("country"));

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "country is required");
        assert_eq!(
            err.details(),
            Some(&json!({"field": "country", "code": "missing_field"}))
        );
    }

    #[rstest]
    fn require_passes_present_values_through() {
        let value = require(Some("Chile".to_owned()), FieldName::new("country"));
        assert_eq!(value.expect("present"), "Chile");
    }

    #[rstest]
    fn validation_errors_keep_field_and_code() {
        let domain = Username::new("   ").expect_err("blank username");
        let err = map_validation_error(domain);

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details(),
            Some(&json!({"field": "username", "code": "empty_username"}))
        );
    }

    #[rstest]
    fn content_type_errors_are_explained() {
        assert_eq!(
            json_error_message(&JsonPayloadError::ContentType),
            "expected an application/json body"
        );
    }
}
