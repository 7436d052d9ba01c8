//! Request Authentication
//!
//! Once-per-request middleware that resolves a bearer token from the
//! `Authorization` header and, when it validates, attaches an
//! [`AuthenticatedIdentity`] to the request as an extension. The middleware
//! never rejects a request itself: enforcement happens downstream, where
//! protected handlers take an [`Identity`] extractor and unauthenticated
//! requests fail with 401 before the handler body runs.
//!
//! Exempt paths (login, refresh, docs, health) skip token resolution
//! entirely so that expired-token clients can still re-authenticate.
//!
//! # Usage
//!
//! ```ignore
//! use axum::{middleware, Router};
//! use rosterd::identity::{authenticate, Identity};
//!
//! async fn whoami(Identity(id): Identity) -> String {
//!     id.username
//! }
//!
//! let app = Router::new()
//!     .route("/whoami", axum::routing::get(whoami))
//!     .layer(middleware::from_fn_with_state(state, authenticate));
//! ```

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::error::AppError;
use crate::observability::SecurityEvent;
use crate::provider::TokenProvider;
use crate::security_event;
use crate::token::{TokenError, TokenType};

/// Path prefixes that bypass token resolution.
pub const EXEMPT_PREFIXES: &[&str] = &[
    "/api/auth/login",
    "/api/auth/refresh",
    "/api/docs",
    "/health",
];

// ============================================================================
// Identity Types
// ============================================================================

/// The caller's established identity, threaded through request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub username: String,
    pub role: String,
}

/// Result of evaluating one request against the authentication rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Path is exempt; no token was looked at
    Exempt,
    /// No usable bearer token in the Authorization header
    NoToken,
    /// A bearer token was presented but did not validate
    InvalidToken(TokenError),
    /// A valid access token named this subject
    Authenticated { subject: String },
}

// ============================================================================
// Bearer Resolution
// ============================================================================

/// Extract the bearer token from an `Authorization` header value.
///
/// The scheme is matched literally: exactly `Bearer` followed by a single
/// space and a non-empty remainder. Anything else (missing scheme, lowercase
/// `bearer`, extra spaces, empty token) yields `None`.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?;
    let rest = value.strip_prefix("Bearer ")?;
    if rest.is_empty() || rest.starts_with(' ') {
        return None;
    }
    Some(rest)
}

/// Evaluate a request path and Authorization header against the provider.
///
/// Pure function of its inputs (plus the current time inside token
/// validation), so the full decision table is unit-testable without HTTP.
pub fn evaluate(path: &str, auth_header: Option<&str>, provider: &TokenProvider) -> AuthOutcome {
    if EXEMPT_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return AuthOutcome::Exempt;
    }

    let token = match bearer_token(auth_header) {
        Some(t) => t,
        None => return AuthOutcome::NoToken,
    };

    match provider.decode_expecting(token, TokenType::Access) {
        Ok(claims) => AuthOutcome::Authenticated { subject: claims.sub },
        Err(e) => AuthOutcome::InvalidToken(e),
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Authentication middleware: establishes identity, never rejects.
///
/// Requests with a missing or invalid token continue without an identity
/// extension; protected handlers then fail them through the [`Identity`]
/// extractor. This keeps a single enforcement point and lets exempt and
/// public routes share one middleware stack.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    match evaluate(&path, auth_header.as_deref(), &state.provider) {
        AuthOutcome::Exempt | AuthOutcome::NoToken => {}
        AuthOutcome::InvalidToken(e) => {
            security_event!(
                SecurityEvent::TokenRejected,
                path = %path,
                reason = %e,
                "Bearer token rejected"
            );
        }
        AuthOutcome::Authenticated { subject } => {
            // A token can outlive its account; treat that as unauthenticated.
            if let Some(principal) = state.directory.find(&subject) {
                security_event!(
                    SecurityEvent::AccessGranted,
                    user_id = %principal.username,
                    path = %path,
                    "Request authenticated"
                );
                request.extensions_mut().insert(AuthenticatedIdentity {
                    username: principal.username,
                    role: principal.role,
                });
            } else {
                security_event!(
                    SecurityEvent::TokenRejected,
                    path = %path,
                    reason = "subject no longer registered",
                    "Bearer token rejected"
                );
            }
        }
    }

    next.run(request).await
}

// ============================================================================
// Extractor
// ============================================================================

/// Extractor that requires an established identity.
///
/// Rejects with 401 when the authentication middleware did not attach one.
pub struct Identity(pub AuthenticatedIdentity);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedIdentity>()
            .cloned()
            .map(Identity)
            .ok_or_else(|| AppError::unauthorized("Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::TokenProvider;
    use std::time::Duration;

    const SECRET: &str = "identity-unit-key-0123456789abcdefgh";

    fn provider() -> TokenProvider {
        TokenProvider::with_ttls(
            SECRET,
            Duration::from_secs(3600),
            Duration::from_secs(86400),
        )
    }

    #[test]
    fn test_bearer_token_happy_path() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_rejects_variants() {
        assert_eq!(bearer_token(None), None);
        assert_eq!(bearer_token(Some("")), None);
        assert_eq!(bearer_token(Some("Bearer")), None);
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(Some("Bearer  token")), None);
        assert_eq!(bearer_token(Some("bearer token")), None);
        assert_eq!(bearer_token(Some("Basic dXNlcjpwYXNz")), None);
    }

    #[test]
    fn test_exempt_paths_skip_token_checks() {
        let p = provider();
        // Even a garbage header is ignored on exempt paths.
        for path in ["/api/auth/login", "/api/auth/refresh", "/api/docs/openapi", "/health"] {
            assert_eq!(evaluate(path, Some("Bearer junk"), &p), AuthOutcome::Exempt);
        }
    }

    #[test]
    fn test_protected_path_without_token() {
        let p = provider();
        assert_eq!(evaluate("/api/employees", None, &p), AuthOutcome::NoToken);
        assert_eq!(
            evaluate("/api/employees", Some("Basic abc"), &p),
            AuthOutcome::NoToken
        );
    }

    #[test]
    fn test_protected_path_with_valid_access_token() {
        let p = provider();
        let pair = p.issue_pair("admin").unwrap();
        let header = format!("Bearer {}", pair.access_token);

        assert_eq!(
            evaluate("/api/employees", Some(&header), &p),
            AuthOutcome::Authenticated {
                subject: "admin".to_string()
            }
        );
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let p = provider();
        let pair = p.issue_pair("admin").unwrap();
        let header = format!("Bearer {}", pair.refresh_token);

        assert_eq!(
            evaluate("/api/employees", Some(&header), &p),
            AuthOutcome::InvalidToken(TokenError::TypeMismatch {
                expected: TokenType::Access,
                actual: TokenType::Refresh,
            })
        );
    }

    #[test]
    fn test_malformed_token_outcome() {
        let p = provider();
        assert_eq!(
            evaluate("/api/employees", Some("Bearer not-a-jwt"), &p),
            AuthOutcome::InvalidToken(TokenError::Malformed)
        );
    }

    #[test]
    fn test_wrong_key_token_outcome() {
        let p = provider();
        let other = TokenProvider::with_ttls(
            "a-different-key-for-signing-0123456789",
            Duration::from_secs(3600),
            Duration::from_secs(86400),
        );
        let pair = other.issue_pair("admin").unwrap();
        let header = format!("Bearer {}", pair.access_token);

        assert_eq!(
            evaluate("/api/employees", Some(&header), &p),
            AuthOutcome::InvalidToken(TokenError::InvalidSignature)
        );
    }
}
