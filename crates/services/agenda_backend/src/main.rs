// File: services/agenda_backend/src/main.rs
use agenda_backend::build_app;
use agenda_common::logging;
use agenda_config::load_config;
use agenda_db::SchedulingStoreFactory;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };
    // Keeps the file appender flushing until shutdown
    let _log_guard = logging::init(config.logging.as_ref());

    let store = match SchedulingStoreFactory::new().from_app_config(&config).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to initialise the scheduling store: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let app = build_app(&config, store);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
