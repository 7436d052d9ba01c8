//! Input Validation
//!
//! Declarative request validation via the [`Validate`] trait plus an Axum
//! extractor that runs it before a handler ever sees the payload. Malformed
//! JSON and bad field values are both a 400 Bad Request; field failures
//! carry the offending field and an error code.
//!
//! # Usage
//!
//! ```ignore
//! use rosterd::validation::{validate_length, Validate, ValidatedJson, ValidationError};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct CreateUser {
//!     username: String,
//! }
//!
//! impl Validate for CreateUser {
//!     fn validate(&self) -> Result<(), ValidationError> {
//!         validate_length(&self.username, 3, 32, "username")
//!     }
//! }
//!
//! async fn create_user(ValidatedJson(payload): ValidatedJson<CreateUser>) {
//!     // payload is guaranteed valid
//! }
//! ```

use std::fmt;

use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;

/// Validation error with field context
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Field that failed validation (if applicable)
    pub field: Option<String>,
    /// Error code for programmatic handling
    pub code: ValidationErrorCode,
    /// Human-readable message
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(code: ValidationErrorCode, message: impl Into<String>) -> Self {
        Self {
            field: None,
            code,
            message: message.into(),
        }
    }

    /// Create a validation error for a specific field
    pub fn for_field(
        field: impl Into<String>,
        code: ValidationErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: Some(field.into()),
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}: {}", field, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validation error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    /// Value is required but missing/empty
    Required,
    /// Value is too short
    TooShort,
    /// Value is too long
    TooLong,
    /// Value doesn't match expected pattern
    InvalidFormat,
    /// Email format is invalid
    InvalidEmail,
}

impl fmt::Display for ValidationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "required"),
            Self::TooShort => write!(f, "too_short"),
            Self::TooLong => write!(f, "too_long"),
            Self::InvalidFormat => write!(f, "invalid_format"),
            Self::InvalidEmail => write!(f, "invalid_email"),
        }
    }
}

/// Trait for validatable request types
pub trait Validate {
    /// Validate the instance, returning an error if invalid
    fn validate(&self) -> Result<(), ValidationError>;

    /// Check if the instance is valid (convenience method)
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

// ============================================================================
// Field Validators
// ============================================================================

/// Validate that a string is not empty or whitespace-only
pub fn validate_required(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::for_field(
            field,
            ValidationErrorCode::Required,
            "Field is required",
        ));
    }
    Ok(())
}

/// Validate string length bounds (inclusive, counted in chars)
pub fn validate_length(
    value: &str,
    min: usize,
    max: usize,
    field: &str,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min {
        return Err(ValidationError::for_field(
            field,
            ValidationErrorCode::TooShort,
            format!("Must be at least {} characters", min),
        ));
    }
    if len > max {
        return Err(ValidationError::for_field(
            field,
            ValidationErrorCode::TooLong,
            format!("Must be at most {} characters", max),
        ));
    }
    Ok(())
}

/// Validate email format
///
/// Pragmatic checks only: one `@`, sane local part, dotted domain. Does not
/// validate deliverability.
pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    let invalid = || {
        ValidationError::for_field("email", ValidationErrorCode::InvalidEmail, "Invalid email format")
    };

    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if domain.contains('@') {
        return Err(invalid());
    }

    if local.is_empty()
        || local.len() > 64
        || local.starts_with('.')
        || local.ends_with('.')
        || local.contains("..")
    {
        return Err(invalid());
    }

    if domain.is_empty()
        || domain.len() > 255
        || !domain.contains('.')
        || !domain.chars().all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(invalid());
    }

    Ok(())
}

/// Validate a number is non-negative
pub fn validate_non_negative(value: f64, field: &str) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::for_field(
            field,
            ValidationErrorCode::InvalidFormat,
            "Value must be a non-negative number",
        ));
    }
    Ok(())
}

// ============================================================================
// Axum Extractor
// ============================================================================

/// Validation rejection response
#[derive(Debug)]
pub struct ValidationRejection {
    /// The validation error that caused the rejection
    pub error: ValidationError,
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": "validation_error",
            "code": self.error.code.to_string(),
            "field": self.error.field,
            "message": self.error.message,
        });

        (
            StatusCode::BAD_REQUEST,
            [("content-type", "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

impl From<ValidationError> for ValidationRejection {
    fn from(error: ValidationError) -> Self {
        Self { error }
    }
}

/// JSON extractor that deserializes and then validates the payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::warn!(error = %e, "JSON parsing failed");
            (
                StatusCode::BAD_REQUEST,
                [("content-type", "application/json")],
                r#"{"error":"invalid_json","message":"Failed to parse JSON body"}"#,
            )
                .into_response()
        })?;

        if let Err(error) = value.validate() {
            tracing::warn!(
                field = ?error.field,
                code = %error.code,
                message = %error.message,
                "Validation failed"
            );
            return Err(ValidationRejection::from(error).into_response());
        }

        Ok(ValidatedJson(value))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert!(validate_required("hello", "field").is_ok());
        assert!(validate_required("", "field").is_err());
        assert!(validate_required("   ", "field").is_err());
    }

    #[test]
    fn test_validate_length() {
        assert!(validate_length("hello", 1, 10, "field").is_ok());
        assert!(validate_length("hi", 3, 10, "field").is_err());
        assert!(validate_length("hello world!", 1, 5, "field").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("user.name@example.co.uk").is_ok());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@localhost").is_err()); // No dot in domain
        assert!(validate_email("user..name@example.com").is_err());
        assert!(validate_email("a@b@example.com").is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative(0.0, "salary").is_ok());
        assert!(validate_non_negative(55000.50, "salary").is_ok());
        assert!(validate_non_negative(-1.0, "salary").is_err());
        assert!(validate_non_negative(f64::NAN, "salary").is_err());
    }

    #[test]
    fn test_validation_rejection_into_response() {
        let error = ValidationError::for_field(
            "username",
            ValidationErrorCode::TooShort,
            "Username too short",
        );
        let rejection = ValidationRejection::from(error);
        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_validation_error_display() {
        let error =
            ValidationError::for_field("email", ValidationErrorCode::InvalidEmail, "Bad email");
        assert_eq!(format!("{}", error), "email: Bad email");

        let error = ValidationError::new(ValidationErrorCode::Required, "Missing value");
        assert_eq!(format!("{}", error), "Missing value");
    }

    #[derive(Debug)]
    struct TestRequest {
        username: String,
        email: String,
    }

    impl Validate for TestRequest {
        fn validate(&self) -> Result<(), ValidationError> {
            validate_length(&self.username, 3, 32, "username")?;
            validate_email(&self.email)?;
            Ok(())
        }
    }

    #[test]
    fn test_validate_trait() {
        let ok = TestRequest {
            username: "john_doe".to_string(),
            email: "john@example.com".to_string(),
        };
        assert!(ok.is_valid());

        let bad = TestRequest {
            username: "ab".to_string(),
            email: "john@example.com".to_string(),
        };
        let err = bad.validate().unwrap_err();
        assert_eq!(err.code, ValidationErrorCode::TooShort);
    }
}
