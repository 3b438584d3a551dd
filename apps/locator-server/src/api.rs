//! API handlers for the locator server

use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::{search_items_from_value, LocatorResult};
use text_locator::{DocumentSource, Locator, LopdfBackend};
use tracing::{info, warn};

use crate::error::ServerError;
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub backend: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "locator-server",
        version: env!("CARGO_PKG_VERSION"),
        backend: "lopdf",
    })
}

/// Highlight request body
#[derive(Deserialize)]
pub struct HighlightRequest {
    /// Base64-encoded PDF bytes
    pub pdf: String,

    /// Search items, validated after the envelope is parsed so item errors
    /// get their own error code
    pub items: serde_json::Value,
}

/// Hex SHA-256 of the uploaded document, for log correlation only
pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Decode the base64 document field; surrounding whitespace is ignored
pub fn decode_pdf(encoded: &str) -> Result<Vec<u8>, ServerError> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| ServerError::InvalidBase64(e.to_string()))
}

/// Handler: POST /api/highlight
pub async fn handle_highlight(
    State(state): State<AppState>,
    payload: Result<Json<HighlightRequest>, JsonRejection>,
) -> Result<Json<LocatorResult>, ServerError> {
    let Json(req) = payload.map_err(|e| ServerError::InvalidRequest(e.body_text()))?;

    let bytes = decode_pdf(&req.pdf)?;
    let items = search_items_from_value(req.items)?;

    info!(
        "Highlight request: {} items, {} bytes, sha256={}",
        items.len(),
        bytes.len(),
        fingerprint(&bytes)
    );

    // One fresh document per request, opened and released on a blocking worker
    let config = state.locator.clone();
    let task = tokio::task::spawn_blocking(move || {
        Locator::with_config(LopdfBackend::new(), config)
            .locate(&DocumentSource::bytes(bytes), &items)
    });

    match tokio::time::timeout(Duration::from_millis(state.timeout_ms), task).await {
        Ok(Ok(result)) => Ok(Json(result)),
        Ok(Err(e)) => Err(ServerError::Internal(format!("locate task failed: {e}"))),
        Err(_) => {
            warn!("Locate exceeded {}ms, worker left to finish", state.timeout_ms);
            Err(ServerError::Timeout(state.timeout_ms))
        }
    }
}
