//! Application wiring
//!
//! Builds the shared state and the full router: auth endpoints, employee
//! endpoints, health and docs, the authentication middleware, and the
//! hardening layers from [`SecureRouter`].

use std::sync::Arc;

use axum::{middleware, routing::get, Json, Router};
use serde_json::json;

use crate::config::AppConfig;
use crate::credentials::CredentialDirectory;
use crate::employee::{EmployeeService, InMemoryEmployeeStore};
use crate::identity::authenticate;
use crate::layers::SecureRouter;
use crate::provider::TokenProvider;

/// Shared application state, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<TokenProvider>,
    pub directory: Arc<CredentialDirectory>,
    pub employees: Arc<EmployeeService>,
}

impl AppState {
    /// Build state from validated configuration: a token provider over the
    /// configured secret, a credential directory seeded with the bootstrap
    /// admin, and an empty in-memory employee store.
    pub fn from_config(config: &AppConfig) -> Result<Self, bcrypt::BcryptError> {
        let provider = TokenProvider::new(&config.jwt);

        let mut directory = CredentialDirectory::new()?;
        directory.register(&config.admin_username, &config.admin_password, "USER")?;

        Ok(Self {
            provider: Arc::new(provider),
            directory: Arc::new(directory),
            employees: Arc::new(EmployeeService::new(InMemoryEmployeeStore::new())),
        })
    }

    /// Assemble state from already-built parts. Used by tests that need a
    /// custom directory or bcrypt cost.
    pub fn from_parts(
        provider: TokenProvider,
        directory: CredentialDirectory,
        employees: EmployeeService,
    ) -> Self {
        Self {
            provider: Arc::new(provider),
            directory: Arc::new(directory),
            employees: Arc::new(employees),
        }
    }
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/docs
///
/// Minimal machine-readable surface description. Exempt from
/// authentication so clients can discover the login flow.
async fn docs() -> Json<serde_json::Value> {
    Json(json!({
        "service": "rosterd",
        "auth": {
            "login": { "method": "POST", "path": "/api/auth/login" },
            "refresh": { "method": "POST", "path": "/api/auth/refresh" },
            "scheme": "Bearer"
        },
        "resources": {
            "employees": { "path": "/api/employees" }
        }
    }))
}

/// Build the complete application router.
pub fn build_router(state: AppState, config: &crate::config::SecurityConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/docs", get(docs))
        .merge(crate::auth_api::router())
        .merge(crate::employee_api::router())
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .with_security(config)
        .with_state(state)
}
