//! Error Handling
//!
//! Uniform error-to-response mapping that avoids leaking internals. Every
//! handler failure flows through [`AppError`], which logs the full context
//! and returns a structured JSON body with only what the client may see.
//!
//! Authentication failures are deliberately uninformative: a wrong password
//! and an unknown username both surface as the same 401 body, so the API
//! cannot be used to enumerate accounts.
//!
//! # Usage
//!
//! ```ignore
//! use rosterd::error::AppError;
//!
//! async fn handler() -> Result<String, AppError> {
//!     let record = load_record()
//!         .map_err(|e| AppError::internal("Failed to load record", e))?;
//!     Ok(record)
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;

use crate::token::TokenError;

// ============================================================================
// Error Types
// ============================================================================

/// Application error carrying a client-safe message plus internal detail
/// that is logged but never serialized for `Internal` errors.
#[derive(Debug)]
pub struct AppError {
    /// Error kind determines HTTP status and exposure policy
    pub kind: ErrorKind,
    /// User-facing message (safe to expose)
    pub message: String,
    /// Internal details (logged, not exposed)
    pub details: Option<String>,
    /// Original error (for logging)
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// Error categories with their HTTP status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad request (400) - client error, safe to expose details
    BadRequest,
    /// Unauthorized (401) - authentication required or rejected
    Unauthorized,
    /// Forbidden (403) - authenticated but not authorized
    Forbidden,
    /// Not found (404) - resource doesn't exist
    NotFound,
    /// Conflict (409) - resource state conflict
    Conflict,
    /// Bad request (400) - request validation failure
    Validation,
    /// Internal server error (500) - hide details
    Internal,
}

impl ErrorKind {
    /// Get the HTTP status code for this error kind
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the message can be passed through verbatim for this kind
    pub fn expose_details(&self) -> bool {
        matches!(
            self,
            Self::BadRequest | Self::Validation | Self::NotFound | Self::Conflict
        )
    }
}

impl AppError {
    /// Create a new error
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a bad request error (400)
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    /// Create an unauthorized error (401)
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Create a forbidden error (403)
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Create a not found error (404)
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a conflict error (409)
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a validation error (400)
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create an internal error (500) with source
    ///
    /// The message is what users see; the source is logged but not exposed.
    pub fn internal(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind: ErrorKind::Internal,
            message: message.into(),
            details: Some(source.to_string()),
            source: Some(Box::new(source)),
        }
    }

    /// Create an internal error without a source
    pub fn internal_msg(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Add internal details (logged but not exposed)
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Log the error (called automatically by IntoResponse)
    fn log(&self) {
        let details = self.details.as_deref().unwrap_or("none");

        match self.kind {
            ErrorKind::Internal => {
                tracing::error!(
                    error_kind = %self.kind,
                    message = %self.message,
                    details = %details,
                    "Internal error"
                );
            }
            ErrorKind::Unauthorized | ErrorKind::Forbidden => {
                tracing::warn!(
                    error_kind = %self.kind,
                    message = %self.message,
                    "Auth error"
                );
            }
            _ => {
                tracing::debug!(
                    error_kind = %self.kind,
                    message = %self.message,
                    "Client error"
                );
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest => write!(f, "bad_request"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Validation => write!(f, "validation_error"),
            Self::Internal => write!(f, "internal_error"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

// ============================================================================
// Error Response
// ============================================================================

/// JSON error response format
#[derive(Debug, Clone, serde::Serialize)]
pub struct ErrorResponse {
    /// Error type/code
    pub error: String,
    /// Human-readable message
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.kind.status_code();

        let message = if self.kind.expose_details() {
            self.message.clone()
        } else {
            // Generic messages for sensitive kinds
            match self.kind {
                ErrorKind::Internal => "An internal error occurred".to_string(),
                ErrorKind::Unauthorized => "Authentication required".to_string(),
                ErrorKind::Forbidden => "Access denied".to_string(),
                _ => self.message.clone(),
            }
        };

        let response = ErrorResponse {
            error: self.kind.to_string(),
            message,
        };

        (status, Json(response)).into_response()
    }
}

// ============================================================================
// Conversions from common error types
// ============================================================================

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::internal("IO error", err)
    }
}

impl From<crate::validation::ValidationError> for AppError {
    fn from(err: crate::validation::ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        // The taxonomy is logged; the client sees only that authentication
        // failed.
        AppError::unauthorized("Authentication required").with_details(err.to_string())
    }
}

// ============================================================================
// Result type alias
// ============================================================================

/// Result type alias for handlers returning AppError
pub type Result<T> = std::result::Result<T, AppError>;

// ============================================================================
// Tests
// ============================================================================
