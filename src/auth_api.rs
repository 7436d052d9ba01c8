//! Authentication Endpoints
//!
//! `POST /api/auth/login` exchanges credentials for an access/refresh token
//! pair; `POST /api/auth/refresh` exchanges a live refresh token for a fresh
//! pair. Both respond with the same body shape and both fail with a 401
//! that does not say why.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::error::AppError;
use crate::observability::SecurityEvent;
use crate::security_event;
use crate::token::TokenType;
use crate::validation::{validate_required, Validate, ValidatedJson, ValidationError};

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_required(&self.username, "username")?;
        validate_required(&self.password, "password")?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl Validate for RefreshRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_required(&self.refresh_token, "refreshToken")
    }
}

/// Token pair response body. `tokenType` is always `"Bearer"`, telling the
/// client which Authorization scheme to use.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

impl TokenPairResponse {
    fn bearer(pair: crate::provider::TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer",
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenPairResponse>, AppError> {
    let principal = state
        .directory
        .verify_credentials(&request.username, &request.password)
        .ok_or_else(|| {
            security_event!(
                SecurityEvent::AuthenticationFailure,
                user_id = %request.username,
                "Login rejected"
            );
            AppError::unauthorized("Bad credentials")
        })?;

    let pair = state.provider.issue_pair(&principal.username)?;

    security_event!(
        SecurityEvent::TokenIssued,
        user_id = %principal.username,
        "User authenticated, token pair issued"
    );

    Ok(Json(TokenPairResponse::bearer(pair)))
}

/// POST /api/auth/refresh
async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RefreshRequest>,
) -> Result<Json<TokenPairResponse>, AppError> {
    let claims = state
        .provider
        .decode_expecting(&request.refresh_token, TokenType::Refresh)
        .map_err(|e| {
            security_event!(
                SecurityEvent::TokenRejected,
                reason = %e,
                "Refresh rejected"
            );
            AppError::unauthorized("Invalid refresh token")
        })?;

    // The subject must still exist; tokens outlive account removal.
    let principal = state.directory.find(&claims.sub).ok_or_else(|| {
        security_event!(
            SecurityEvent::TokenRejected,
            user_id = %claims.sub,
            reason = "subject no longer registered",
            "Refresh rejected"
        );
        AppError::unauthorized("Invalid refresh token")
    })?;

    let pair = state.provider.issue_pair(&principal.username)?;

    security_event!(
        SecurityEvent::TokenRefreshed,
        user_id = %principal.username,
        "Token pair re-issued via refresh"
    );

    Ok(Json(TokenPairResponse::bearer(pair)))
}

/// Routes under `/api/auth`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
}
