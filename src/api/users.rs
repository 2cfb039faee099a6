//! Profile endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use super::{current_user, success, ApiResult};
use crate::auth::Identity;
use crate::models::{SyncUser, UpdateProfileRequest, User};
use crate::AppState;

/// POST /api/users/sync - Create or refresh the caller from identity headers.
pub async fn sync_user(State(state): State<AppState>, identity: Identity) -> ApiResult<User> {
    let sync = SyncUser {
        community_id: identity.community_id()?.to_string(),
        username: identity.username()?.to_string(),
        external_id: identity.external_user_id,
    };

    let user = state.repo.sync_user(&sync, state.clock.now()).await?;
    tracing::info!(user = %user.id, community = %user.community_id, "User synced");
    success(user)
}

/// GET /api/users/me - The caller's profile and preferences.
pub async fn get_me(State(state): State<AppState>, identity: Identity) -> ApiResult<User> {
    success(current_user(&state, &identity).await?)
}

/// PUT /api/users/profile - Update the caller's profile.
pub async fn update_profile(
    State(state): State<AppState>,
    identity: Identity,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(request) = payload?;
    let update = request.validate()?;
    let user = current_user(&state, &identity).await?;

    match state
        .repo
        .update_profile(&user.id, &update, state.clock.now())
        .await
    {
        Ok(updated) => success(updated),
        Err(e) => {
            tracing::warn!(user = %user.id, "Profile update failed: {}", e);
            Err(e)
        }
    }
}
