//! Request-identity extraction.
//!
//! Bearer access token first; absent that, the refresh-token cookie
//! (verified with the refresh secret). The decoded user must still exist.
//! Role comes from the verified claims, the account from the store.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::error::ApiError;
use crate::models::{AppState, Role, User};
use crate::services::auth_service::REFRESH_COOKIE;

pub struct AuthUser {
    pub user: User,
    pub role: Role,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = bearer_token(&parts.headers);
        let cookie = refresh_cookie(&parts.headers);

        let claims = match (bearer, cookie) {
            (Some(token), _) => state.auth.verify_access_token(&token),
            (None, Some(token)) => state.auth.verify_refresh_token(&token),
            (None, None) => return Err(ApiError::Auth("No token provided".to_string())),
        }
        .ok_or_else(|| ApiError::Auth("Invalid token".to_string()))?;

        let user = state.auth.lookup(claims.user_id).await?;
        Ok(AuthUser {
            role: claims.role,
            user,
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start_matches("Bearer ").to_string())
}

/// The refresh token from the Cookie header, if any.
pub fn refresh_cookie(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    let prefix = format!("{REFRESH_COOKIE}=");
    raw.split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(prefix.as_str()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn refresh_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; refreshToken=abc.def.ghi; lang=en"),
        );
        assert_eq!(refresh_cookie(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn missing_refresh_cookie_is_none() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(refresh_cookie(&headers), None);
        assert_eq!(refresh_cookie(&HeaderMap::new()), None);
    }
}
