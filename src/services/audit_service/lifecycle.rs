//! Audit lifecycle manager: orchestrates adapter invocation, scoring,
//! persistence, and status transitions, with every operation scoped to
//! the owning user.

use log::info;
use std::sync::Arc;
use uuid::Uuid;

use super::providers::MeasurementProvider;
use super::scoring::{score_measurement, AuditScoreFields};
use crate::db::AuditStore;
use crate::error::ApiError;
use crate::models::{
    Audit, AuditStatus, AuditSummary, AuditType, CreateAuditBody, UpdateAuditBody,
};

/// Absence and ownership mismatch share one message so callers cannot
/// probe for record existence.
pub const NOT_FOUND_MESSAGE: &str = "Audit not found or not authorized";

#[derive(Clone)]
pub struct AuditService {
    store: Arc<dyn AuditStore>,
    provider: Arc<dyn MeasurementProvider>,
}

impl AuditService {
    pub fn new(store: Arc<dyn AuditStore>, provider: Arc<dyn MeasurementProvider>) -> Self {
        Self { store, provider }
    }

    /// Run a measurement and persist the resulting audit. A provider
    /// failure aborts before any write, so no partial record ever lands.
    /// A successful run is written twice: once in-progress, then completed.
    pub async fn create(&self, owner_id: Uuid, body: CreateAuditBody) -> Result<Audit, ApiError> {
        let domain = body.domain.unwrap_or_default();
        if domain.is_empty() {
            return Err(ApiError::Validation("Domain is required".to_string()));
        }
        let audit_type = parse_type(body.audit_type.as_deref())?;

        let measurement = self
            .provider
            .measure(audit_type, &domain, body.query.as_deref())
            .await?;
        let fields = score_measurement(&measurement);

        let mut audit = Audit::new(domain, owner_id, audit_type, measurement.seo_data);
        apply_measurement(&mut audit, audit_type, &fields, false);
        self.store.insert(&audit).await?;

        audit.advance(AuditStatus::Completed)?;
        audit.completed_at = Some(chrono::Utc::now());
        self.store.update(&audit).await?;

        info!("audit {} created for {} ({audit_type})", audit.id, audit.domain);
        Ok(audit)
    }

    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<AuditSummary>, ApiError> {
        let audits = self.store.list_for_owner(owner_id).await?;
        Ok(audits.iter().map(Audit::summary).collect())
    }

    pub async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<AuditSummary, ApiError> {
        let audit = self
            .store
            .find_for_owner(id, owner_id)
            .await?
            .ok_or_else(not_found)?;
        Ok(audit.summary())
    }

    /// Re-measure when a `type` is supplied, otherwise only rewrite the
    /// domain string (the stored scores go stale by design). A typed
    /// update never reassigns the stored `type` field.
    pub async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        body: UpdateAuditBody,
    ) -> Result<Audit, ApiError> {
        let mut audit = self
            .store
            .find_for_owner(id, owner_id)
            .await?
            .ok_or_else(not_found)?;

        let domain = body.domain.as_deref().filter(|domain| !domain.is_empty());

        if let Some(raw_type) = body.audit_type.as_deref() {
            let audit_type = parse_type(Some(raw_type))?;
            let target = domain.unwrap_or(&audit.domain).to_string();
            let measurement = self
                .provider
                .measure(audit_type, &target, body.query.as_deref())
                .await?;
            let fields = score_measurement(&measurement);
            apply_measurement(&mut audit, audit_type, &fields, true);
            audit.seo_data = measurement.seo_data;
        }

        if let Some(domain) = domain {
            audit.domain = domain.to_string();
        }

        self.store.update(&audit).await?;
        info!("audit {} updated", audit.id);
        Ok(audit)
    }

    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<(), ApiError> {
        let deleted = self.store.delete_for_owner(id, owner_id).await?;
        if !deleted {
            return Err(not_found());
        }
        info!("audit {id} deleted");
        Ok(())
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound(NOT_FOUND_MESSAGE.to_string())
}

fn parse_type(raw: Option<&str>) -> Result<AuditType, ApiError> {
    raw.and_then(AuditType::parse).ok_or_else(|| {
        ApiError::Validation("Invalid type. Use \"pagespeed\" or \"serpstack\"".to_string())
    })
}

/// Apply derived scores for the measured type. Each adapter only owns its
/// own fields: a page-performance run never touches `serpRank`, and a
/// search-rank run never touches the three performance-side scores. On a
/// re-measure (`preserve_unranked_seo`), an unranked search result keeps
/// the previous SEO score instead of zeroing it.
fn apply_measurement(
    audit: &mut Audit,
    audit_type: AuditType,
    fields: &AuditScoreFields,
    preserve_unranked_seo: bool,
) {
    match audit_type {
        AuditType::Pagespeed => {
            audit.performance_score = fields.performance_score;
            audit.accessibility_score = fields.accessibility_score;
            audit.best_practices_score = fields.best_practices_score;
            audit.seo_score = fields.seo_score;
        }
        AuditType::Serpstack => {
            audit.serp_rank = fields.serp_rank;
            let unranked = fields.serp_rank == Some(0);
            if !(preserve_unranked_seo && unranked) {
                audit.seo_score = fields.seo_score;
            }
        }
    }
}
