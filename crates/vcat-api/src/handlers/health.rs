//! Health check handler.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// "connected", "not configured" or "unreachable"
    pub storage_backend: String,
    pub storage_bucket: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
///
/// Reports storage from configuration alone unless live probing is
/// enabled; liveness is "healthy" either way.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let storage_backend = match &state.storage {
        None => "not configured",
        Some(_) if !state.config.health_probe_storage => "connected",
        Some(store) => {
            match tokio::time::timeout(
                state.config.health_probe_timeout,
                store.check_connectivity(),
            )
            .await
            {
                Ok(Ok(())) => "connected",
                Ok(Err(e)) => {
                    warn!("Storage health probe failed: {}", e);
                    "unreachable"
                }
                Err(_) => {
                    warn!("Storage health probe timed out");
                    "unreachable"
                }
            }
        }
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        storage_backend: storage_backend.to_string(),
        storage_bucket: state.storage_bucket.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
