//! # rosterd
//!
//! A small employee-records HTTP service with stateless JWT bearer
//! authentication, built on Axum.
//!
//! ## Features
//!
//! - **Token lifecycle**: HS256-signed access and refresh tokens with a
//!   `token_type` claim separating the two namespaces
//! - **Request authentication**: once-per-request middleware that resolves a
//!   bearer token and threads an [`identity::AuthenticatedIdentity`] into
//!   handlers as an explicit request-extension value
//! - **Auth endpoints**: `POST /api/auth/login` and `POST /api/auth/refresh`
//!   returning an access+refresh pair
//! - **Employee CRUD**: `/api/employees` backed by a pluggable store
//! - **Structured logging**: JSON/pretty audit logs with `tracing`
//!
//! ## Quick Start
//!
//! ```ignore
//! use rosterd::{app::{build_router, AppState}, config::AppConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_env()?;
//!     rosterd::observability::init_tracing(config.log_format, &config.log_filter)?;
//!
//!     let state = AppState::from_config(&config)?;
//!     let app = build_router(state, &config.security);
//!
//!     let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Design Notes
//!
//! The server never stores issued tokens: validation is a pure function of
//! (token, current time, signing key). Refresh-token rotation therefore does
//! not invalidate the previous refresh token; this is a documented limitation
//! of the stateless design, not a bug.

pub mod app;
pub mod auth_api;
pub mod config;
pub mod credentials;
pub mod crypto;
pub mod employee;
pub mod employee_api;
pub mod error;
pub mod identity;
pub mod layers;
pub mod observability;
pub mod provider;
pub mod secret;
pub mod token;
pub mod validation;

// Re-exports
pub use app::{build_router, AppState};
pub use config::{AppConfig, SecurityConfig};
pub use crypto::{constant_time_eq, constant_time_str_eq};
pub use error::{AppError, ErrorKind};
pub use identity::{AuthenticatedIdentity, Identity};
pub use layers::SecureRouter;
pub use provider::{TokenPair, TokenProvider};
pub use token::{TokenCodec, TokenError, TokenType};
