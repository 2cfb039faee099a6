//! REST API module.
//!
//! Handlers resolve the caller from the identity headers, delegate to the
//! matching and analytics cores and wrap the result in the response envelope.

mod analytics;
mod matches;
mod users;

pub use analytics::*;
pub use matches::*;
pub use users::*;

use std::time::Duration;

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::Identity;
use crate::errors::AppError;
use crate::models::User;
use crate::AppState;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Load the calling member, who must have synced before.
async fn current_user(state: &AppState, identity: &Identity) -> Result<User, AppError> {
    state
        .repo
        .get_user_by_external_id(&identity.external_user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Fail a request that runs past `limit` with an `UPSTREAM_FAILURE` envelope.
pub async fn enforce_timeout(limit: Duration, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(path = %path, ?limit, "Request timed out");
            AppError::Upstream("Request timed out".to_string()).into_response()
        }
    }
}
