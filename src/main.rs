use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

use seoscope::api;
use seoscope::config::Config;
use seoscope::db::{self, PgAuditStore, PgUserStore};
use seoscope::models::AppState;
use seoscope::services::audit_service::HttpProviders;
use seoscope::services::{AuditService, AuthService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("failed to connect to Postgres")?;
    db::init_schema(&pool).await?;

    let providers = HttpProviders::new(
        config.google_api_key.clone(),
        config.serpstack_api_key.clone(),
        Duration::from_secs(config.provider_timeout_secs),
    )
    .context("failed to build provider HTTP client")?;

    let state = AppState {
        audits: AuditService::new(
            Arc::new(PgAuditStore::new(pool.clone())),
            Arc::new(providers),
        ),
        auth: AuthService::new(
            Arc::new(PgUserStore::new(pool)),
            config.jwt_secret.clone(),
            config.jwt_refresh_secret.clone(),
            config.jwt_expires_in_secs,
        ),
    };

    let app = api::router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    log::info!("server running on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
