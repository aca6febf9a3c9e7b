// src/bin/api_server.rs

use campus_market::infra::{config::AppConfig, telemetry};
use campus_market::transport;
use campus_market::AppState;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            return Err(e);
        }
    };

    // --- Service Initialization ---
    info!(backend = ?config.store_backend, "Initializing store...");
    let app_state = AppState::from_config(&config).await?;
    info!(upload_dir = %config.upload_dir.display(), "Store ready");

    // --- API Server Initialization ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("API server listening on http://{}", config.bind_addr);
    info!("Swagger UI available at http://{}/swagger-ui", config.bind_addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received (Ctrl+C), exiting");
        }
    }

    Ok(())
}
