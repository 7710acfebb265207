use axum::{Json, body::Bytes, extract::State};
use common::VoteSubmission;
use serde::de::IgnoredAny;
use tracing::{info, instrument};

use crate::error::{AppError, ErrorBody};
use crate::models::vote::VoteAccepted;
use crate::state::AppState;
use crate::upstream::Service;

/// Forward a vote to the vote service.
///
/// The request body is passed through byte-for-byte. Whatever the vote
/// service returns on success is discarded.
#[utoipa::path(
    post,
    path = "/vote",
    tag = "Votes",
    operation_id = "submitVote",
    summary = "Submit a vote",
    request_body = VoteSubmission,
    responses(
        (status = 200, description = "Vote accepted by the vote service", body = VoteAccepted),
        (status = 400, description = "Body is not valid JSON", body = ErrorBody),
        (status = 500, description = "Vote API URL not configured, or network error", body = ErrorBody),
        (status = 502, description = "Vote service returned an error", body = ErrorBody),
    ),
)]
#[instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn submit_vote(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<VoteAccepted>, AppError> {
    let base = state
        .config
        .upstream
        .vote_api_url
        .as_deref()
        .ok_or(AppError::ConfigMissing(Service::Vote))?;

    serde_json::from_slice::<IgnoredAny>(&body)
        .map_err(|e| AppError::Validation(format!("Request body must be JSON: {e}")))?;

    state
        .upstream
        .post_vote(base, body)
        .await
        .map_err(|e| AppError::from_upstream(Service::Vote, e))?;

    info!("Vote forwarded");
    Ok(Json(VoteAccepted::new()))
}
