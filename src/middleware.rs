//! Framework-agnostic request middleware.
//!
//! [`validate`] turns raw criteria into a [`Middleware`]. Per request the
//! middleware either runs the continuation or hands back an
//! [`ErrorResponse`] for the HTTP layer to send with status 400.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::{ConfigErrors, Verdict, Violation, ViolationKind};
use crate::logging::DebugSink;
use crate::options::ValidatorOptions;
use crate::request::RequestSource;
use crate::validator::Validator;

/// Stable error code carried by every validation failure response.
pub const VALIDATION_ERROR_CODE: &str = "ERR002";

/// Builds a middleware from raw criteria with default options.
///
/// Broken criteria are rejected here, before any request is seen.
///
/// # Example
///
/// ```rust
/// use reqguard::{validate, Outcome, RequestParts};
/// use serde_json::json;
///
/// let middleware = validate(&json!({
///     "params": [{ "exlOrPpt": { "$in": ["xlsx", "pptx"] } }]
/// })).unwrap();
///
/// let request = RequestParts::new().params(json!({ "exlOrPpt": "docx" }));
/// match middleware.handle(&request, |_| "exported") {
///     Outcome::Continue(_) => panic!("docx is not allowed"),
///     Outcome::Reject(response) => {
///         assert_eq!(response.error.error_code, "ERR002");
///         assert_eq!(response.error.path, "params.exlOrPpt");
///     }
/// }
/// ```
pub fn validate(raw: &Value) -> Result<Middleware, ConfigErrors> {
    Middleware::from_raw(raw)
}

/// What the HTTP layer should do with a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The request passed; carries the continuation's result.
    Continue(T),
    /// The request failed; send this response.
    Reject(ErrorResponse),
}

impl<T> Outcome<T> {
    pub fn is_continue(&self) -> bool {
        matches!(self, Outcome::Continue(_))
    }

    /// Converts into a `Result`, rejections becoming `Err`.
    pub fn into_result(self) -> Result<T, ErrorResponse> {
        match self {
            Outcome::Continue(value) => Ok(value),
            Outcome::Reject(response) => Err(response),
        }
    }
}

/// Body of a validation failure response.
///
/// Serializes as
/// `{"success": false, "error": {"errorCode": "ERR002", "errorMessage": ..., "path": ..., "kind": ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

/// The `error` member of an [`ErrorResponse`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub error_code: String,
    pub error_message: String,
    pub path: String,
    pub kind: ViolationKind,
}

impl ErrorResponse {
    /// HTTP status the surrounding layer should use.
    pub const STATUS: u16 = 400;

    pub fn status(&self) -> u16 {
        Self::STATUS
    }
}

impl From<Violation> for ErrorResponse {
    fn from(violation: Violation) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                error_code: VALIDATION_ERROR_CODE.to_string(),
                error_message: violation.message,
                path: violation.path.to_string(),
                kind: violation.kind,
            },
        }
    }
}

/// Validates each request once and decides whether processing continues.
#[derive(Debug, Clone)]
pub struct Middleware {
    validator: Validator,
}

impl Middleware {
    pub fn new(validator: Validator) -> Self {
        Self { validator }
    }

    /// Parses raw criteria with default options.
    pub fn from_raw(raw: &Value) -> Result<Self, ConfigErrors> {
        Validator::from_raw(raw).map(Self::new)
    }

    /// Parses raw criteria with explicit options.
    pub fn from_raw_with(raw: &Value, options: ValidatorOptions) -> Result<Self, ConfigErrors> {
        Validator::from_raw_with(raw, options).map(Self::new)
    }

    /// Replaces the debug sink.
    pub fn with_sink(self, sink: Arc<dyn DebugSink>) -> Self {
        Self::new(self.validator.with_sink(sink))
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Validates without a continuation.
    pub fn check<R: RequestSource + ?Sized>(&self, request: &R) -> Result<(), ErrorResponse> {
        match self.validator.validate(request) {
            Verdict::Valid => Ok(()),
            Verdict::Invalid(violation) => Err(violation.into()),
        }
    }

    /// Validates the request, then runs `next` only if it passed.
    pub fn handle<R, T, F>(&self, request: &R, next: F) -> Outcome<T>
    where
        R: RequestSource + ?Sized,
        F: FnOnce(&R) -> T,
    {
        match self.check(request) {
            Ok(()) => Outcome::Continue(next(request)),
            Err(response) => Outcome::Reject(response),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestParts;
    use serde_json::json;
    use std::cell::Cell;

    fn email_middleware() -> Middleware {
        validate(&json!({
            "body": [{ "email": { "$req": true, "$pattern": "^[a-z0-9]+@[a-z0-9]+\\.com$" } }]
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_request_runs_continuation() {
        let calls = Cell::new(0);
        let request = RequestParts::new().body(json!({"email": "a@b.com"}));
        let outcome = email_middleware().handle(&request, |_| {
            calls.set(calls.get() + 1);
            "done"
        });
        assert_eq!(outcome, Outcome::Continue("done"));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_invalid_request_skips_continuation() {
        let calls = Cell::new(0);
        let request = RequestParts::new().body(json!({}));
        let outcome = email_middleware().handle(&request, |_| calls.set(calls.get() + 1));
        assert!(!outcome.is_continue());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_response_shape() {
        let request = json!({"body": {"email": "bad@x"}});
        let response = email_middleware().check(&request).unwrap_err();
        assert_eq!(response.status(), 400);

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(
            body,
            json!({
                "success": false,
                "error": {
                    "errorCode": "ERR002",
                    "errorMessage": "Data in body.email does not match ^[a-z0-9]+@[a-z0-9]+\\.com$",
                    "path": "body.email",
                    "kind": "pattern_mismatch"
                }
            })
        );
    }

    #[test]
    fn test_missing_field_response_kind_matches_code() {
        let response = email_middleware().check(&json!({"body": {}})).unwrap_err();
        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["error"]["kind"], json!("required"));
        assert_eq!(body["error"]["errorMessage"], json!("Data in body.email is required"));
    }

    #[test]
    fn test_broken_criteria_rejected_up_front() {
        let errors = validate(&json!({
            "body": [{ "address": { "city": { "$req": true }, "$type": "object" } }]
        }))
        .unwrap_err();
        assert_eq!(errors.first().code(), "invalid_nested_directive_mix");
    }

    #[test]
    fn test_outcome_into_result() {
        let request = RequestParts::new().body(json!({}));
        let result = email_middleware().handle(&request, |_| ()).into_result();
        assert_eq!(result.unwrap_err().error.path, "body.email");
    }
}
