pub mod pivot;
pub mod tape;

use crate::engine::PivotEngine;
use crate::services::RecordSource;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PivotEngine>,
    pub source: Arc<dyn RecordSource>,
    pub started_at: Instant,
}

/// Start the axum server
pub async fn serve(
    engine: Arc<PivotEngine>,
    source: Arc<dyn RecordSource>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting tapepivot server");

    let app_state = AppState {
        engine,
        source,
        started_at: Instant::now(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers(Any);

    tracing::info!("Registering routes:");
    tracing::info!("  POST /pivot");
    tracing::info!("  GET /dates");
    tracing::info!("  GET /stocks/:date");
    tracing::info!("  GET /data/:date/:stock");
    tracing::info!("  GET /health");

    let app = Router::new()
        .route("/pivot", post(pivot::pivot_handler))
        .route("/dates", get(tape::list_dates_handler))
        .route("/stocks/:date", get(tape::list_stocks_handler))
        .route("/data/:date/:stock", get(tape::get_data_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// GET /health - uptime and cache statistics
pub async fn health_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    let cache = app_state.engine.cache();
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "uptime_secs": app_state.started_at.elapsed().as_secs(),
            "cache_entries": cache.len().await,
            "cache_ttl_secs": cache.ttl().as_secs(),
        })),
    )
}
