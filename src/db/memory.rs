//! In-memory stores with the same ownership-scoped contract as the
//! Postgres implementations. Used by the test suites; handy for local
//! runs without a database.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AuditStore, StoreError, UserStore};
use crate::models::{Audit, User};

#[derive(Default)]
pub struct MemoryAuditStore {
    inner: RwLock<HashMap<Uuid, Audit>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn insert(&self, audit: &Audit) -> Result<(), StoreError> {
        self.inner.write().await.insert(audit.id, audit.clone());
        Ok(())
    }

    async fn update(&self, audit: &Audit) -> Result<(), StoreError> {
        self.inner.write().await.insert(audit.id, audit.clone());
        Ok(())
    }

    async fn find_for_owner(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Audit>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .get(&id)
            .filter(|audit| audit.owner_id == owner_id)
            .cloned())
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Audit>, StoreError> {
        let mut audits: Vec<Audit> = self
            .inner
            .read()
            .await
            .values()
            .filter(|audit| audit.owner_id == owner_id)
            .cloned()
            .collect();
        audits.sort_by(|a, b| a.started_at.cmp(&b.started_at).then(a.id.cmp(&b.id)));
        Ok(audits)
    }

    async fn delete_for_owner(&self, id: Uuid, owner_id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.get(&id) {
            Some(audit) if audit.owner_id == owner_id => {
                inner.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        self.inner.write().await.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.get(&id).cloned())
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<(), StoreError> {
        if let Some(user) = self.inner.write().await.get_mut(&id) {
            user.refresh_token = token.map(str::to_string);
        }
        Ok(())
    }
}
