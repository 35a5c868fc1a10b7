// src/api/mod.rs

pub mod audits;
pub mod auth;
pub mod extract;

pub use extract::AuthUser;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::models::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/refresh", post(auth::refresh))
        .route("/api/logout", post(auth::logout))
        .route("/api/profile", get(auth::profile))
        .route(
            "/api/audits",
            post(audits::create_audit).get(audits::list_audits),
        )
        .route(
            "/api/audits/{id}",
            get(audits::get_audit)
                .put(audits::update_audit)
                .delete(audits::delete_audit),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({"message": "SEO Audit API is running"}))
}
