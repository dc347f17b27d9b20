//! Minimal HTTP host: one lifecycle event per `POST /invoke`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::envelope::CustomResourceRequest;
use super::LifecycleAdapter;
use crate::errors::{Error, Result};

pub fn build_router(adapter: Arc<LifecycleAdapter>) -> Router {
    Router::new()
        .route("/invoke", post(invoke))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(adapter)
}

async fn invoke(State(adapter): State<Arc<LifecycleAdapter>>, body: Bytes) -> Response {
    let request = match CustomResourceRequest::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Rejected malformed lifecycle event");
            return (StatusCode::BAD_REQUEST, Json(json!({"error": e.to_string()}))).into_response();
        }
    };

    Json(adapter.handle(&request).await).into_response()
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok", "version": crate::VERSION}))
}

/// Serve until Ctrl-C.
pub async fn serve(adapter: Arc<LifecycleAdapter>, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind {}: {}", addr, e)))?;

    info!(address = %addr, "Starting lifecycle endpoint");
    axum::serve(listener, build_router(adapter))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Shutdown listener failed");
            }
        })
        .await
        .map_err(|e| Error::internal(format!("Server error: {}", e)))?;

    info!("Lifecycle endpoint stopped");
    Ok(())
}
