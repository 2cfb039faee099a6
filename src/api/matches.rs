//! Candidate and decision endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use super::{current_user, success, ApiResult};
use crate::auth::Identity;
use crate::errors::AppError;
use crate::matching::{decision, selector};
use crate::models::{Candidate, DecisionAction, DecisionOutcome, DecisionRequest};
use crate::AppState;

/// GET /api/matches/potential - Ranked candidates for the caller.
pub async fn potential_matches(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<Vec<Candidate>> {
    let community_id = identity.community_id()?;
    let subject = current_user(&state, &identity).await?;

    let candidates = selector::select_candidates(&state.repo, &subject, community_id).await?;
    success(candidates)
}

/// POST /api/matches/connect - Like or pass on a candidate.
pub async fn connect(
    State(state): State<AppState>,
    identity: Identity,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> ApiResult<DecisionOutcome> {
    let Json(request) = payload?;
    let target_id = request
        .target_user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("targetUserId is required".to_string()))?;
    let action = match request.action.as_deref() {
        Some(raw) => DecisionAction::parse(raw).ok_or_else(|| {
            AppError::Validation(format!("Unknown action {:?}, expected like or reject", raw))
        })?,
        None => return Err(AppError::Validation("action is required".to_string())),
    };

    let subject = current_user(&state, &identity).await?;
    let outcome = decision::decide(
        &state.repo,
        &state.pair_locks,
        &subject,
        target_id,
        action,
        state.clock.now(),
    )
    .await?;

    success(outcome)
}
