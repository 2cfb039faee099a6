//! Request authentication and identity context.
//!
//! The identity front-end authenticates itself with a pre-shared key and
//! forwards the verified member and community ids as headers. The PSK check
//! uses constant-time comparison to mitigate timing attacks.

use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::errors::AppError;

/// Header name for the API key.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Verified external user id.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Community (tenant) the request is scoped to.
pub const COMMUNITY_ID_HEADER: &str = "x-community-id";
/// Display name from the identity provider, used on sync.
pub const USERNAME_HEADER: &str = "x-username";

/// PSK authentication layer function that takes the expected PSK as a parameter.
pub async fn psk_auth_layer(
    expected_psk: Option<String>,
    request: Request,
    next: Next,
) -> Response {
    // If no PSK is configured, allow all requests (dev mode)
    let Some(expected) = expected_psk else {
        return next.run(request).await;
    };

    let provided = header_value(request.headers(), API_KEY_HEADER).or_else(|| {
        request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(|s| s.to_string())
    });

    match provided {
        Some(key) if constant_time_compare(&key, &expected) => next.run(request).await,
        Some(_) => AppError::Unauthorized("Invalid API key".to_string()).into_response(),
        None => AppError::Unauthorized("Missing or invalid API key".to_string()).into_response(),
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Identity forwarded by the identity provider.
#[derive(Debug, Clone)]
pub struct Identity {
    pub external_user_id: String,
    pub community_id: Option<String>,
    pub username: Option<String>,
}

impl Identity {
    pub fn community_id(&self) -> Result<&str, AppError> {
        self.community_id.as_deref().ok_or_else(|| {
            AppError::MissingContext("Community ID not found in headers".to_string())
        })
    }

    pub fn username(&self) -> Result<&str, AppError> {
        self.username
            .as_deref()
            .ok_or_else(|| AppError::MissingContext("Username not found in headers".to_string()))
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let external_user_id = header_value(&parts.headers, USER_ID_HEADER).ok_or_else(|| {
            AppError::MissingContext("User ID not found in headers".to_string())
        })?;

        Ok(Identity {
            external_user_id,
            community_id: header_value(&parts.headers, COMMUNITY_ID_HEADER),
            username: header_value(&parts.headers, USERNAME_HEADER),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("test-key-123", "test-key-123"));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("test-key-123", "test-key-124"));
        assert!(!constant_time_compare("short", "much-longer-key"));
    }

    #[test]
    fn test_blank_header_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COMMUNITY_ID_HEADER, HeaderValue::from_static("   "));
        headers.insert(USER_ID_HEADER, HeaderValue::from_static(" ext-1 "));
        assert_eq!(header_value(&headers, COMMUNITY_ID_HEADER), None);
        assert_eq!(header_value(&headers, USER_ID_HEADER).as_deref(), Some("ext-1"));
    }

    #[test]
    fn test_identity_requires_community() {
        let identity = Identity {
            external_user_id: "ext-1".into(),
            community_id: None,
            username: Some("ada".into()),
        };
        let err = identity.community_id().unwrap_err();
        assert!(matches!(err, AppError::MissingContext(_)));
        assert_eq!(identity.username().unwrap(), "ada");
    }
}
