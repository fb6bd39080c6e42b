//! HTTP surface.
//!
//! - `GET /assistant/{assistant_id}/thumbnail.png` - PNG card for one assistant
//! - `GET /health` - liveness probe

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::foundation::error::ThumbnailError;
use crate::pipeline::ThumbnailRenderer;

/// Shared, read-only state handed to every request.
pub struct AppState {
    pub renderer: ThumbnailRenderer,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(renderer: ThumbnailRenderer) -> Self {
        Self {
            renderer,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/assistant/{assistant_id}/thumbnail.png", get(thumbnail))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until ctrl-c.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<()> {
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "serving assistant thumbnails");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
    })
}

async fn thumbnail(
    State(state): State<Arc<AppState>>,
    Path(assistant_id): Path<String>,
) -> Result<Response, ThumbnailError> {
    let png = state.renderer.render(&assistant_id).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

impl ThumbnailError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(_)
            | Self::Transcode(_)
            | Self::Render(_)
            | Self::Raster(_)
            | Self::Config(_)
            | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ThumbnailError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            Self::NotFound(_) => {
                tracing::debug!(error = %self, "assistant not found");
                "Assistant not found".to_string()
            }
            Self::Timeout(_) => {
                tracing::warn!(error = %self, "thumbnail timed out");
                "Thumbnail rendering timed out".to_string()
            }
            _ => {
                tracing::error!(error = %self, "thumbnail failed");
                "Failed to render thumbnail".to_string()
            }
        };
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
#[path = "../tests/unit/server.rs"]
mod tests;
