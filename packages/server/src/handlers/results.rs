use axum::{
    Json,
    extract::{Path, State},
};
use common::ResultsResponse;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;
use crate::upstream::Service;

/// Fetch aggregate results for a poll.
///
/// The results service's JSON is relayed as-is, without shape checks.
#[utoipa::path(
    get,
    path = "/results/{poll_id}",
    tag = "Results",
    operation_id = "getResults",
    summary = "Get aggregate results for a poll",
    params(
        ("poll_id" = String, Path, description = "Poll identifier, e.g. `poll-1`")
    ),
    responses(
        (status = 200, description = "Results as returned by the results service", body = ResultsResponse),
        (status = 500, description = "Results API URL not configured, or network error", body = ErrorBody),
        (status = 502, description = "Results service returned an error", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(poll_id = %poll_id))]
pub async fn get_results(
    State(state): State<AppState>,
    Path(poll_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let base = state
        .config
        .upstream
        .results_api_url
        .as_deref()
        .ok_or(AppError::ConfigMissing(Service::Results))?;

    let data = state
        .upstream
        .fetch_results(base, &poll_id)
        .await
        .map_err(|e| AppError::from_upstream(Service::Results, e))?;

    debug!("Results relayed");
    Ok(Json(data))
}
