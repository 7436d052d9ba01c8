//! Security Event Logging
//!
//! Provides structured logging for security-relevant events. The application
//! code uses standard `tracing` macros and doesn't know which output format
//! is configured.
//!
//! # Usage
//!
//! ```ignore
//! use rosterd::observability::SecurityEvent;
//! use rosterd::security_event;
//!
//! security_event!(
//!     SecurityEvent::AuthenticationSuccess,
//!     user_id = %username,
//!     "User authenticated successfully"
//! );
//! ```

use std::fmt;

use tracing_subscriber::{fmt as sub_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// ============================================================================
// Subscriber Initialization
// ============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line human-readable output (development)
    Pretty,
    /// Single-line JSON records (production)
    Json,
    /// Compact single-line output
    Compact,
}

impl LogFormat {
    /// Parse a format name, accepting common spellings.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

/// Initialize the tracing subscriber.
///
/// Must be called once at application startup, before any logging occurs.
/// `RUST_LOG` takes precedence over the configured filter string.
pub fn init_tracing(format: LogFormat, default_filter: &str) -> Result<(), ObservabilityError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| ObservabilityError::Config(format!("Invalid log filter: {}", e)))?;

    let subscriber = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Pretty => subscriber
            .with(sub_fmt::layer().pretty().with_target(true))
            .try_init(),
        LogFormat::Json => subscriber
            .with(sub_fmt::layer().json().with_target(true))
            .try_init(),
        LogFormat::Compact => subscriber
            .with(sub_fmt::layer().compact().with_target(true))
            .try_init(),
    };

    result.map_err(|e| ObservabilityError::Provider(format!("Failed to init tracing: {}", e)))
}

/// Observability initialization errors
#[derive(Debug)]
pub enum ObservabilityError {
    /// Invalid configuration
    Config(String),
    /// Subscriber initialization failed
    Provider(String),
}

impl fmt::Display for ObservabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "observability config error: {}", msg),
            Self::Provider(msg) => write!(f, "observability provider error: {}", msg),
        }
    }
}

impl std::error::Error for ObservabilityError {}

// ============================================================================
// Security Events
// ============================================================================

/// Security event categories for audit logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityEvent {
    /// Successful user authentication (login)
    AuthenticationSuccess,
    /// Failed authentication attempt
    AuthenticationFailure,
    /// A token pair was issued
    TokenIssued,
    /// A token pair was re-issued via refresh
    TokenRefreshed,
    /// A presented token was rejected (bad signature, expired, wrong type)
    TokenRejected,
    /// Access granted to resource
    AccessGranted,
    /// Access denied to resource
    AccessDenied,
    /// Application started
    SystemStartup,
}

impl SecurityEvent {
    /// Get the event category for filtering/grouping
    pub fn category(&self) -> &'static str {
        match self {
            Self::AuthenticationSuccess | Self::AuthenticationFailure => "authentication",
            Self::TokenIssued | Self::TokenRefreshed | Self::TokenRejected => "token",
            Self::AccessGranted | Self::AccessDenied => "authorization",
            Self::SystemStartup => "system",
        }
    }

    /// Get the severity level for the event
    pub fn severity(&self) -> Severity {
        match self {
            Self::AuthenticationFailure | Self::TokenRejected | Self::AccessDenied => {
                Severity::High
            }
            Self::AuthenticationSuccess | Self::TokenIssued | Self::TokenRefreshed => {
                Severity::Medium
            }
            Self::AccessGranted | Self::SystemStartup => Severity::Low,
        }
    }

    /// Get the event name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Self::AuthenticationSuccess => "authentication_success",
            Self::AuthenticationFailure => "authentication_failure",
            Self::TokenIssued => "token_issued",
            Self::TokenRefreshed => "token_refreshed",
            Self::TokenRejected => "token_rejected",
            Self::AccessGranted => "access_granted",
            Self::AccessDenied => "access_denied",
            Self::SystemStartup => "system_startup",
        }
    }
}

impl fmt::Display for SecurityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Event severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Routine operations
    Low,
    /// Important state changes
    Medium,
    /// Security-relevant failures
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Log a security event with structured fields.
///
/// The macro automatically includes `security_event`, `category`, and
/// `severity` fields alongside whatever the call site provides.
#[macro_export]
macro_rules! security_event {
    ($event:expr, $($field:tt)*) => {{
        let event = $event;
        let severity = event.severity();
        let category = event.category();
        let event_name = event.name();

        match severity {
            $crate::observability::Severity::High => {
                ::tracing::warn!(
                    security_event = event_name,
                    category = category,
                    severity = "high",
                    $($field)*
                );
            }
            $crate::observability::Severity::Medium => {
                ::tracing::info!(
                    security_event = event_name,
                    category = category,
                    severity = "medium",
                    $($field)*
                );
            }
            $crate::observability::Severity::Low => {
                ::tracing::debug!(
                    security_event = event_name,
                    category = category,
                    severity = "low",
                    $($field)*
                );
            }
        }
    }};
}
