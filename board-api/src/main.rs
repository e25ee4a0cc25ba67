//! Board API Main Entry Point
//!
//! Serves the anonymous board over HTTP backed by memory or PostgreSQL.

use board_api::{Dependencies, LogFormat, Settings, StartupError, server};
use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging.
fn init_tracing(format: LogFormat) -> Result<(), StartupError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("board_api=info,board_core=info,tower_http=info"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init(),
    }
    .map_err(|e| StartupError::Tracing(e.to_string()))?;

    info!(
        service_name = "board-api",
        service_version = env!("CARGO_PKG_VERSION"),
        log_format = ?format,
        "Tracing initialized"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    dotenv().ok();

    init_tracing(LogFormat::from_env())?;

    let settings = Settings::from_env();
    info!(addr = %settings.addr(), "Starting board API");

    let deps = match Dependencies::new(&settings).await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let app = server::create_app(deps.service, &settings.cors_allowed_origins);
    if let Err(e) = server::run_server(app, settings.addr()).await {
        error!(error = %e, "Server failed");
        return Err(e);
    }
    Ok(())
}
