// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use anyhow::Context;
use axum::{routing::{get, post}, Router};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::application::analysis_service::AnalysisService;
use crate::application::critique_service::CritiqueService;
use crate::application::initial_checks::{InitialChecker, SeriesColumns};
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::openai_client::OpenAiClient;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{health_check, process_data, root, verify_password};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config()?;
    if config.model.api_key.is_empty() {
        tracing::warn!("No model API key configured; critique requests will fail");
    }

    // Create model client (infrastructure layer)
    let model = Arc::new(OpenAiClient::new(
        config.model.base_url,
        config.model.api_key,
        config.model.name,
        Duration::from_secs(config.model.timeout_secs),
    )?);

    // Create services (application layer)
    let checker = InitialChecker::new(SeriesColumns {
        value: config.analysis.value_column,
        label: config.analysis.label_column,
    });
    let critique_service = CritiqueService::new(model, config.model.max_tokens);
    let analysis_service = AnalysisService::new(
        checker,
        critique_service,
        config.model.default_media_type,
    );

    // Create application state
    let state = Arc::new(AppState {
        analysis_service,
        site_password: config.access.site_password,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/", get(root))
        .route("/healthz", get(health_check))
        .route("/password", get(verify_password))
        .route("/process-data", post(process_data))
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind_addr))?;
    tracing::info!("Starting chart-integrity service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
