//! Authentication extractor
//!
//! Validates the bearer token with the pre-computed keys in [`AppState`] and
//! yields the caller's user id.

use crate::auth::JwtService;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use uuid::Uuid;

/// Authenticated user extracted from JWT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Resolve the user id carried by the `Authorization: Bearer` header
pub fn bearer_user(headers: &HeaderMap, jwt: &JwtService) -> Result<AuthUser, ApiError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Invalid authorization format".to_string()))?;

    let user_id = jwt
        .validate_access_token(token)
        .and_then(|claims| claims.user_id())
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    Ok(AuthUser { user_id })
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        bearer_user(&parts.headers, app_state.jwt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn jwt() -> JwtService {
        JwtService::new("test-secret", 3600)
    }

    #[test]
    fn test_valid_bearer_token() {
        let user_id = Uuid::new_v4();
        let token = jwt().generate_access_token(user_id).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        assert_eq!(bearer_user(&headers, &jwt()).unwrap().user_id, user_id);
    }

    #[test]
    fn test_missing_header_is_unauthorized() {
        let err = bearer_user(&HeaderMap::new(), &jwt()).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_wrong_scheme_is_unauthorized() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(matches!(
            bearer_user(&headers, &jwt()).unwrap_err(),
            ApiError::Unauthorized(_)
        ));
    }
}
