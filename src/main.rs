//! rosterd server entrypoint
//!
//! Loads configuration from the environment, initializes tracing, and
//! serves the application router until the process is stopped.

use rosterd::app::{build_router, AppState};
use rosterd::config::AppConfig;
use rosterd::observability::{init_tracing, SecurityEvent};
use rosterd::security_event;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    init_tracing(config.log_format, &config.log_filter)?;

    let state = AppState::from_config(&config)?;
    let app = build_router(state, &config.security);

    security_event!(
        SecurityEvent::SystemStartup,
        bind_addr = %config.bind_addr,
        environment = %config.environment,
        "Server starting"
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
