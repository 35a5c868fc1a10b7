//! Account and session handlers. The refresh token travels in an
//! HttpOnly cookie; the access token only ever appears in response
//! bodies.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use super::extract::{refresh_cookie, AuthUser};
use crate::error::ApiError;
use crate::models::{AppState, LoginBody, RegisterBody};
use crate::services::auth_service::REFRESH_COOKIE;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.auth.register(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered",
            "user": {"name": user.name, "email": user.email, "role": user.role},
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, access, refresh) = state.auth.login(&body.email, &body.password).await?;
    Ok((
        [(header::SET_COOKIE, set_refresh_cookie(&refresh))],
        Json(json!({
            "accessToken": access,
            "role": user.role,
            "message": "Login successful",
        })),
    ))
}

pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = refresh_cookie(&headers)
        .ok_or_else(|| ApiError::Auth("No refresh token provided".to_string()))?;
    let (user, access) = state.auth.refresh(&token).await?;
    // the refresh token itself is kept, only the access token rotates
    Ok((
        [(header::SET_COOKIE, set_refresh_cookie(&token))],
        Json(json!({
            "accessToken": access,
            "role": user.role,
            "message": "Token refreshed",
        })),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    state.auth.logout(auth.user.id).await?;
    Ok((
        [(header::SET_COOKIE, clear_refresh_cookie())],
        Json(json!({"message": "Logout successful"})),
    ))
}

pub async fn profile(auth: AuthUser) -> Json<serde_json::Value> {
    Json(json!({
        "email": auth.user.email,
        "name": auth.user.name,
        "role": auth.user.role,
        "createdAt": auth.user.created_at,
    }))
}

fn set_refresh_cookie(token: &str) -> String {
    format!("{REFRESH_COOKIE}={token}; HttpOnly; Secure; SameSite=Strict; Path=/")
}

fn clear_refresh_cookie() -> String {
    format!("{REFRESH_COOKIE}=; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age=0")
}
