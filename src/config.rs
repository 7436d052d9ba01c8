//! Application configuration
//!
//! All runtime configuration is loaded once at startup from environment
//! variables. Token lifetimes are configured in milliseconds and carried as
//! [`Duration`]s from here on; nothing else in the crate reads the
//! environment.
//!
//! # Example
//!
//! ```ignore
//! use rosterd::config::AppConfig;
//!
//! let config = AppConfig::from_env()?;
//! println!("listening on {}", config.bind_addr);
//! ```

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use crate::observability::LogFormat;
use crate::secret::{generate_secure_secret, SecretError, SecretPolicy};

/// Default access-token lifetime: one hour.
const DEFAULT_ACCESS_TTL_MS: u64 = 3_600_000;
/// Default refresh-token lifetime: thirty days.
const DEFAULT_REFRESH_TTL_MS: u64 = 2_592_000_000;

// ============================================================================
// Errors
// ============================================================================

/// Configuration loading failures
#[derive(Debug)]
pub enum ConfigError {
    /// A required variable is missing
    Missing(&'static str),
    /// A variable is present but unparseable
    Invalid { name: &'static str, value: String },
    /// The signing secret fails the environment's policy
    Secret(SecretError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(name) => write!(f, "missing required environment variable {}", name),
            Self::Invalid { name, value } => {
                write!(f, "invalid value '{}' for environment variable {}", value, name)
            }
            Self::Secret(e) => write!(f, "signing secret rejected: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<SecretError> for ConfigError {
    fn from(e: SecretError) -> Self {
        Self::Secret(e)
    }
}

// ============================================================================
// Token Settings
// ============================================================================

/// Signing key and lifetimes for issued tokens.
#[derive(Debug, Clone)]
pub struct JwtSettings {
    /// HMAC signing secret (validated against the environment's policy)
    pub secret: String,
    /// Access token lifetime
    pub access_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_ttl: Duration,
}

impl JwtSettings {
    /// Load from `JWT_SECRET`, `JWT_ACCESS_EXPIRATION_MS` and
    /// `JWT_REFRESH_EXPIRATION_MS`.
    ///
    /// The secret is mandatory outside development; in development a random
    /// secret is generated when none is configured, which makes issued
    /// tokens worthless across restarts.
    pub fn from_env(environment: &str) -> Result<Self, ConfigError> {
        let policy = SecretPolicy::for_environment(environment);

        let secret = match std::env::var("JWT_SECRET") {
            Ok(s) => s,
            Err(_) if environment == "development" => {
                tracing::warn!(
                    "JWT_SECRET not set; generated an ephemeral development secret"
                );
                generate_secure_secret(64)
            }
            Err(_) => return Err(ConfigError::Missing("JWT_SECRET")),
        };
        policy.validate(&secret)?;

        let access_ttl = duration_ms_var("JWT_ACCESS_EXPIRATION_MS", DEFAULT_ACCESS_TTL_MS)?;
        let refresh_ttl = duration_ms_var("JWT_REFRESH_EXPIRATION_MS", DEFAULT_REFRESH_TTL_MS)?;

        Ok(Self {
            secret,
            access_ttl,
            refresh_ttl,
        })
    }
}

// ============================================================================
// HTTP Security Settings
// ============================================================================

/// Infrastructure-layer hardening applied to the whole router.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes
    pub max_request_size: usize,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// CORS allowed origins
    /// Empty = restrictive (same-origin only)
    /// ["*"] = permissive (any origin - NOT for production)
    /// ["https://..."] = explicit allowlist
    pub cors_origins: Vec<String>,

    /// Enable security headers
    pub security_headers_enabled: bool,

    /// Enable request/response tracing
    pub tracing_enabled: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_request_size: 1024 * 1024, // 1MB
            request_timeout: Duration::from_secs(30),
            cors_origins: Vec::new(), // Restrictive by default
            security_headers_enabled: true,
            tracing_enabled: true,
        }
    }
}

impl SecurityConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MAX_REQUEST_SIZE`: bytes (default: 1048576)
    /// - `REQUEST_TIMEOUT_SECS`: seconds (default: 30)
    /// - `CORS_ALLOWED_ORIGINS`: comma-separated, or "*" (default: empty/restrictive)
    /// - `SECURITY_HEADERS_ENABLED`: "true"/"false" (default: "true")
    /// - `TRACING_ENABLED`: "true"/"false" (default: "true")
    pub fn from_env() -> Result<Self, ConfigError> {
        let max_request_size = match std::env::var("MAX_REQUEST_SIZE") {
            Ok(s) => s.parse().map_err(|_| ConfigError::Invalid {
                name: "MAX_REQUEST_SIZE",
                value: s,
            })?,
            Err(_) => 1024 * 1024,
        };

        let request_timeout = duration_secs_var("REQUEST_TIMEOUT_SECS", 30)?;

        let cors_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let security_headers_enabled = bool_var("SECURITY_HEADERS_ENABLED", true);
        let tracing_enabled = bool_var("TRACING_ENABLED", true);

        Ok(Self {
            max_request_size,
            request_timeout,
            cors_origins,
            security_headers_enabled,
            tracing_enabled,
        })
    }

    /// Check if CORS is in permissive mode (allows any origin).
    pub fn cors_is_permissive(&self) -> bool {
        self.cors_origins.len() == 1 && self.cors_origins[0] == "*"
    }

    /// Check if CORS is in restrictive mode (same-origin only).
    pub fn cors_is_restrictive(&self) -> bool {
        self.cors_origins.is_empty()
    }
}

// ============================================================================
// Top-Level Configuration
// ============================================================================

/// Complete application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen address
    pub bind_addr: SocketAddr,
    /// Deployment environment name ("development", "staging", "production")
    pub environment: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Default tracing filter (overridden by RUST_LOG)
    pub log_filter: String,
    /// Bootstrap admin username
    pub admin_username: String,
    /// Bootstrap admin password (hashed at startup, never stored plain)
    pub admin_password: String,
    /// Token signing settings
    pub jwt: JwtSettings,
    /// HTTP hardening settings
    pub security: SecurityConfig,
}

impl AppConfig {
    /// Load the full configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `BIND_ADDR`: listen address (default: "0.0.0.0:8080")
    /// - `APP_ENV`: deployment environment (default: "development")
    /// - `LOG_FORMAT`: "pretty", "json" or "compact" (default: "pretty")
    /// - `LOG_FILTER`: default tracing filter (default: "info")
    /// - `ADMIN_USERNAME` / `ADMIN_PASSWORD`: bootstrap credentials
    /// - plus everything [`JwtSettings::from_env`] and
    ///   [`SecurityConfig::from_env`] read
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let bind_addr = match std::env::var("BIND_ADDR") {
            Ok(s) => s.parse().map_err(|_| ConfigError::Invalid {
                name: "BIND_ADDR",
                value: s,
            })?,
            Err(_) => SocketAddr::from(([0, 0, 0, 0], 8080)),
        };

        let log_format = match std::env::var("LOG_FORMAT") {
            Ok(s) => LogFormat::from_str_loose(&s).ok_or(ConfigError::Invalid {
                name: "LOG_FORMAT",
                value: s,
            })?,
            Err(_) => LogFormat::Pretty,
        };

        let log_filter = std::env::var("LOG_FILTER").unwrap_or_else(|_| "info".to_string());

        let admin_username =
            std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let admin_password = match std::env::var("ADMIN_PASSWORD") {
            Ok(s) => s,
            Err(_) if environment == "development" => "password".to_string(),
            Err(_) => return Err(ConfigError::Missing("ADMIN_PASSWORD")),
        };

        let jwt = JwtSettings::from_env(&environment)?;
        let security = SecurityConfig::from_env()?;

        Ok(Self {
            bind_addr,
            environment,
            log_format,
            log_filter,
            admin_username,
            admin_password,
            jwt,
            security,
        })
    }
}

// ============================================================================
// Env Parsing Helpers
// ============================================================================

fn duration_ms_var(name: &'static str, default_ms: u64) -> Result<Duration, ConfigError> {
    match std::env::var(name) {
        Ok(s) => {
            let ms: u64 = s.parse().map_err(|_| ConfigError::Invalid { name, value: s })?;
            Ok(Duration::from_millis(ms))
        }
        Err(_) => Ok(Duration::from_millis(default_ms)),
    }
}

fn duration_secs_var(name: &'static str, default_secs: u64) -> Result<Duration, ConfigError> {
    match std::env::var(name) {
        Ok(s) => {
            let secs: u64 = s.parse().map_err(|_| ConfigError::Invalid { name, value: s })?;
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(Duration::from_secs(default_secs)),
    }
}

fn bool_var(name: &str, default: bool) -> bool {
    std::env::var(name)
        .map(|s| s.to_lowercase() != "false")
        .unwrap_or(default)
}
