//! Inbound HTTP surface.
//!
//! - `GET /metrics`: scrape the upstream and return the exposition text.
//! - `GET /healthz`: liveness, never touches the upstream.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use http::{header, StatusCode};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::collector::HealthCollector;
use crate::error::ExporterError;
use crate::publisher::content_type;
use crate::types::Config;

pub struct AppState {
    pub collector: HealthCollector,
}

impl IntoResponse for ExporterError {
    fn into_response(self) -> Response {
        let status = if self.is_upstream() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, self.to_string()).into_response()
    }
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> Result<Response, ExporterError> {
    let body = state.collector.scrape().await?;
    Ok(([(header::CONTENT_TYPE, content_type())], body).into_response())
}

async fn healthz() -> &'static str {
    "ok"
}

pub fn router(collector: HealthCollector) -> Router {
    let state = Arc::new(AppState { collector });

    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: &Config) -> Result<()> {
    let collector = HealthCollector::from_config(&config.upstream)
        .context("Failed to set up health collector")?;
    let app = router(collector);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
