//! Analytics endpoints.

use std::collections::HashMap;

use axum::extract::State;

use super::{current_user, success, ApiResult};
use crate::analytics;
use crate::auth::Identity;
use crate::db::UserFilter;
use crate::models::{CommunityAnalytics, UserAnalytics};
use crate::AppState;

/// GET /api/analytics/user - The caller's match analytics.
pub async fn user_analytics(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<UserAnalytics> {
    let subject = current_user(&state, &identity).await?;
    let history = state.repo.list_matches_for_user(&subject.id).await?;

    let mut counterpart_ids: Vec<String> = history
        .iter()
        .map(|entry| entry.record.counterpart_of(&subject.id).to_string())
        .collect();
    counterpart_ids.sort();
    counterpart_ids.dedup();
    let counterparts: HashMap<String, _> = state
        .repo
        .get_users_by_ids(&counterpart_ids)
        .await?
        .into_iter()
        .map(|u| (u.id.clone(), u))
        .collect();

    success(analytics::user_analytics(
        &subject,
        &history,
        &counterparts,
        state.clock.now(),
    ))
}

/// GET /api/analytics/community - Analytics for the caller's community.
pub async fn community_analytics(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<CommunityAnalytics> {
    let community_id = identity.community_id()?;
    current_user(&state, &identity).await?;

    let users = state
        .repo
        .list_users_in_community(community_id, &UserFilter::default())
        .await?;
    let history = state.repo.list_matches_in_community(community_id).await?;

    success(analytics::community_analytics(
        &users,
        &history,
        state.clock.now(),
    ))
}
