//! Audit route handlers. Creation is admin-only; every operation is
//! scoped to the authenticated caller's own records.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use super::extract::AuthUser;
use crate::error::ApiError;
use crate::models::{AppState, AuditSummary, CreateAuditBody, Role, UpdateAuditBody};

pub async fn create_audit(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateAuditBody>,
) -> Result<impl IntoResponse, ApiError> {
    if auth.role != Role::Admin {
        return Err(ApiError::Auth("Unauthorized".to_string()));
    }
    let audit = state.audits.create(auth.user.id, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Audit created", "audit": audit})),
    ))
}

pub async fn list_audits(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<AuditSummary>>, ApiError> {
    let audits = state.audits.list(auth.user.id).await?;
    Ok(Json(audits))
}

pub async fn get_audit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AuditSummary>, ApiError> {
    let audit = state.audits.get(auth.user.id, id).await?;
    Ok(Json(audit))
}

pub async fn update_audit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateAuditBody>,
) -> Result<impl IntoResponse, ApiError> {
    let audit = state.audits.update(auth.user.id, id, body).await?;
    Ok(Json(json!({"message": "Audit updated", "audit": audit})))
}

pub async fn delete_audit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.audits.delete(auth.user.id, id).await?;
    Ok(Json(json!({"message": "Audit deleted"})))
}
