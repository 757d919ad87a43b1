//! HTTP server implementation using Axum.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use salespulse_channels::EmailSink;
use salespulse_core::config::PulseConfig;
use salespulse_core::traits::{NotificationSink, RecordStore};
use salespulse_store::RestStore;

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub sink: Arc<dyn NotificationSink>,
    pub start_time: std::time::Instant,
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(super::routes::health_check))
        .route("/api/v1/timers/process", post(super::routes::process_timers))
        .layer(
            CorsLayer::new()
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers(Any)
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server.
pub async fn start(config: PulseConfig) -> anyhow::Result<()> {
    let store: Arc<dyn RecordStore> = Arc::new(RestStore::new(&config.store)?);
    let sink: Arc<dyn NotificationSink> = Arc::new(EmailSink::new(config.smtp.clone()));

    let state = AppState {
        store,
        sink,
        start_time: std::time::Instant::now(),
    };
    let app = build_router(state);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 SalesPulse gateway listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
