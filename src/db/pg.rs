//! Postgres-backed stores.
//!
//! Audits keep their normalized provider payload in a JSONB column; the
//! `status` column defaults to `pending` at the schema level even though
//! the create flow only ever persists `in-progress` and `completed`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::{AuditStore, StoreError, UserStore};
use crate::models::{Audit, AuditStatus, AuditType, Role, User};

pub async fn init_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user',
            refresh_token TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS audits (
            id UUID PRIMARY KEY,
            domain TEXT NOT NULL,
            owner_id UUID NOT NULL REFERENCES users(id),
            audit_type TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            performance_score DOUBLE PRECISION,
            accessibility_score DOUBLE PRECISION,
            best_practices_score DOUBLE PRECISION,
            seo_score DOUBLE PRECISION,
            serp_rank INTEGER,
            seo_data JSONB NOT NULL DEFAULT '{}'::jsonb,
            started_at TIMESTAMPTZ NOT NULL,
            completed_at TIMESTAMPTZ,
            report_id UUID
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    domain: String,
    owner_id: Uuid,
    audit_type: String,
    status: String,
    performance_score: Option<f64>,
    accessibility_score: Option<f64>,
    best_practices_score: Option<f64>,
    seo_score: Option<f64>,
    serp_rank: Option<i32>,
    seo_data: Value,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    report_id: Option<Uuid>,
}

impl TryFrom<AuditRow> for Audit {
    type Error = StoreError;

    fn try_from(row: AuditRow) -> Result<Audit, StoreError> {
        let audit_type = AuditType::parse(&row.audit_type)
            .ok_or_else(|| StoreError(format!("unknown audit type in store: {}", row.audit_type)))?;
        let status = AuditStatus::parse(&row.status)
            .ok_or_else(|| StoreError(format!("unknown audit status in store: {}", row.status)))?;
        Ok(Audit {
            id: row.id,
            domain: row.domain,
            owner_id: row.owner_id,
            audit_type,
            status,
            performance_score: row.performance_score,
            accessibility_score: row.accessibility_score,
            best_practices_score: row.best_practices_score,
            seo_score: row.seo_score,
            serp_rank: row.serp_rank.map(|rank| rank as u32),
            seo_data: row.seo_data,
            started_at: row.started_at,
            completed_at: row.completed_at,
            report_id: row.report_id,
        })
    }
}

const AUDIT_COLUMNS: &str = "id, domain, owner_id, audit_type, status, performance_score, \
     accessibility_score, best_practices_score, seo_score, serp_rank, seo_data, \
     started_at, completed_at, report_id";

#[derive(Clone)]
pub struct PgAuditStore {
    pool: PgPool,
}

impl PgAuditStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for PgAuditStore {
    async fn insert(&self, audit: &Audit) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO audits (id, domain, owner_id, audit_type, status, performance_score, \
             accessibility_score, best_practices_score, seo_score, serp_rank, seo_data, \
             started_at, completed_at, report_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(audit.id)
        .bind(&audit.domain)
        .bind(audit.owner_id)
        .bind(audit.audit_type.as_str())
        .bind(audit.status.as_str())
        .bind(audit.performance_score)
        .bind(audit.accessibility_score)
        .bind(audit.best_practices_score)
        .bind(audit.seo_score)
        .bind(audit.serp_rank.map(|rank| rank as i32))
        .bind(&audit.seo_data)
        .bind(audit.started_at)
        .bind(audit.completed_at)
        .bind(audit.report_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, audit: &Audit) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE audits SET domain = $2, status = $3, performance_score = $4, \
             accessibility_score = $5, best_practices_score = $6, seo_score = $7, \
             serp_rank = $8, seo_data = $9, completed_at = $10, report_id = $11 \
             WHERE id = $1",
        )
        .bind(audit.id)
        .bind(&audit.domain)
        .bind(audit.status.as_str())
        .bind(audit.performance_score)
        .bind(audit.accessibility_score)
        .bind(audit.best_practices_score)
        .bind(audit.seo_score)
        .bind(audit.serp_rank.map(|rank| rank as i32))
        .bind(&audit.seo_data)
        .bind(audit.completed_at)
        .bind(audit.report_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_for_owner(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Audit>, StoreError> {
        let row: Option<AuditRow> = sqlx::query_as(&format!(
            "SELECT {AUDIT_COLUMNS} FROM audits WHERE id = $1 AND owner_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Audit::try_from).transpose()
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Audit>, StoreError> {
        let rows: Vec<AuditRow> = sqlx::query_as(&format!(
            "SELECT {AUDIT_COLUMNS} FROM audits WHERE owner_id = $1 ORDER BY started_at, id"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Audit::try_from).collect()
    }

    async fn delete_for_owner(&self, id: Uuid, owner_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM audits WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    refresh_token: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<User, StoreError> {
        let role = Role::parse(&row.role)
            .ok_or_else(|| StoreError(format!("unknown role in store: {}", row.role)))?;
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            refresh_token: row.refresh_token,
            created_at: row.created_at,
        })
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, role, refresh_token, created_at";

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role, refresh_token, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.refresh_token)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(User::try_from).transpose()
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET refresh_token = $2 WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
