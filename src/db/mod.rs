//! Persistence boundary.
//!
//! The lifecycle and auth services read and write through these traits so
//! the engine itself never sees a connection pool. `pg` is the production
//! Postgres implementation; `memory` backs the test suites.

pub mod memory;
pub mod pg;

pub use memory::{MemoryAuditStore, MemoryUserStore};
pub use pg::{init_schema, PgAuditStore, PgUserStore};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Audit, User};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct StoreError(pub String);

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError(err.to_string())
    }
}

/// Document-store-shaped access to audits. Every read and mutation is
/// scoped to the owning user; concurrent writes to the same id are
/// serialized only at the store's own write granularity (last write wins).
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn insert(&self, audit: &Audit) -> Result<(), StoreError>;
    async fn update(&self, audit: &Audit) -> Result<(), StoreError>;
    async fn find_for_owner(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Audit>, StoreError>;
    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Audit>, StoreError>;
    /// Returns whether a record was removed.
    async fn delete_for_owner(&self, id: Uuid, owner_id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: &User) -> Result<(), StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<(), StoreError>;
}
