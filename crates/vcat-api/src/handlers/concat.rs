//! Job submission handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::info;
use vcat_models::{ConcatRequest, ConcatResponse};

use crate::error::ApiResult;
use crate::state::AppState;

/// `POST /concat`: fetch, merge and publish the scenes in one call.
pub async fn concat(
    State(state): State<AppState>,
    payload: Result<Json<ConcatRequest>, JsonRejection>,
) -> ApiResult<Json<ConcatResponse>> {
    let Json(request) = payload?;

    info!(
        campaign_id = %request.campaign_id,
        scenes = request.scene_count(),
        declared_secs = request.declared_duration(),
        "Concat request received"
    );

    let outcome = state.jobs.submit(request).await?;

    Ok(Json(ConcatResponse {
        success: true,
        output_url: outcome.output_url,
        job_id: outcome.job_id,
        scene_count: outcome.scene_count,
        storage_path: outcome.storage_path,
        duration_seconds: outcome.output_duration_secs,
    }))
}
