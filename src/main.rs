use std::sync::Arc;

use fleet_dispatch::ai::gemini::GeminiClient;
use fleet_dispatch::api;
use fleet_dispatch::config::Config;
use fleet_dispatch::error::AppError;
use fleet_dispatch::fleet::FleetRegistry;
use fleet_dispatch::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    if config.ai.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; every search will fail with an authentication error");
    }

    let registry = FleetRegistry::from_fixture();
    let recommender = Arc::new(GeminiClient::new(&config.ai)?);
    let shared_state = Arc::new(AppState::new(
        registry,
        recommender,
        config.event_buffer_size,
        config.success_reset,
    ));

    let app = api::rest::router(shared_state);

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
