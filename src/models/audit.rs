use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Which external provider produced (or will produce) an audit's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditType {
    Pagespeed,
    Serpstack,
}

impl AuditType {
    /// Case-insensitive parse of the wire value.
    pub fn parse(raw: &str) -> Option<AuditType> {
        match raw.to_lowercase().as_str() {
            "pagespeed" => Some(AuditType::Pagespeed),
            "serpstack" => Some(AuditType::Serpstack),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditType::Pagespeed => "pagespeed",
            AuditType::Serpstack => "serpstack",
        }
    }
}

impl fmt::Display for AuditType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Audit lifecycle status. Transitions are forward-only:
/// pending -> in-progress -> completed, or in-progress -> failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl AuditStatus {
    pub fn parse(raw: &str) -> Option<AuditStatus> {
        match raw {
            "pending" => Some(AuditStatus::Pending),
            "in-progress" => Some(AuditStatus::InProgress),
            "completed" => Some(AuditStatus::Completed),
            "failed" => Some(AuditStatus::Failed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Pending => "pending",
            AuditStatus::InProgress => "in-progress",
            AuditStatus::Completed => "completed",
            AuditStatus::Failed => "failed",
        }
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition(self, next: AuditStatus) -> bool {
        matches!(
            (self, next),
            (AuditStatus::Pending, AuditStatus::InProgress)
                | (AuditStatus::InProgress, AuditStatus::Completed)
                | (AuditStatus::InProgress, AuditStatus::Failed)
        )
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("illegal status transition: {from} -> {to}")]
pub struct IllegalTransition {
    pub from: AuditStatus,
    pub to: AuditStatus,
}

/// The persisted record of one measurement run against a domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    pub id: Uuid,
    pub domain: String,
    #[serde(rename = "userId")]
    pub owner_id: Uuid,
    #[serde(rename = "type")]
    pub audit_type: AuditType,
    pub status: AuditStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_practices_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serp_rank: Option<u32>,
    pub seo_data: Value,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<Uuid>,
}

impl Audit {
    /// A fresh audit as the create flow builds it, before any score fields
    /// are applied. Creation starts straight at in-progress; the pending
    /// default only exists at the storage schema level.
    pub fn new(domain: String, owner_id: Uuid, audit_type: AuditType, seo_data: Value) -> Audit {
        Audit {
            id: Uuid::new_v4(),
            domain,
            owner_id,
            audit_type,
            status: AuditStatus::InProgress,
            performance_score: None,
            accessibility_score: None,
            best_practices_score: None,
            seo_score: None,
            serp_rank: None,
            seo_data,
            started_at: Utc::now(),
            completed_at: None,
            report_id: None,
        }
    }

    /// Move to `next`, rejecting any regression or skipped state.
    pub fn advance(&mut self, next: AuditStatus) -> Result<(), IllegalTransition> {
        if !self.status.can_transition(next) {
            return Err(IllegalTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// The owner-facing summary: everything needed for display, with
    /// `seoData` cut down to its `performance` and `detailedReport` keys.
    /// The raw provider payload is never exposed through reads.
    pub fn summary(&self) -> AuditSummary {
        let mut projected = Map::new();
        if let Some(performance) = self.seo_data.get("performance") {
            projected.insert("performance".to_string(), performance.clone());
        }
        if let Some(report) = self.seo_data.get("detailedReport") {
            projected.insert("detailedReport".to_string(), report.clone());
        }
        AuditSummary {
            id: self.id,
            domain: self.domain.clone(),
            status: self.status,
            audit_type: self.audit_type,
            performance_score: self.performance_score,
            accessibility_score: self.accessibility_score,
            best_practices_score: self.best_practices_score,
            seo_score: self.seo_score,
            serp_rank: self.serp_rank,
            seo_data: Value::Object(projected),
            started_at: self.started_at,
            completed_at: self.completed_at,
        }
    }
}

/// Read projection returned by the list and get operations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    pub id: Uuid,
    pub domain: String,
    pub status: AuditStatus,
    #[serde(rename = "type")]
    pub audit_type: AuditType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_practices_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serp_rank: Option<u32>,
    pub seo_data: Value,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_allows_the_forward_path() {
        assert!(AuditStatus::Pending.can_transition(AuditStatus::InProgress));
        assert!(AuditStatus::InProgress.can_transition(AuditStatus::Completed));
        assert!(AuditStatus::InProgress.can_transition(AuditStatus::Failed));
    }

    #[test]
    fn status_rejects_regressions_and_skips() {
        assert!(!AuditStatus::Pending.can_transition(AuditStatus::Completed));
        assert!(!AuditStatus::InProgress.can_transition(AuditStatus::Pending));
        assert!(!AuditStatus::Completed.can_transition(AuditStatus::InProgress));
        assert!(!AuditStatus::Completed.can_transition(AuditStatus::Failed));
        assert!(!AuditStatus::Failed.can_transition(AuditStatus::Completed));
    }

    #[test]
    fn advance_rejects_illegal_transition() {
        let mut audit = Audit::new(
            "example.com".to_string(),
            Uuid::new_v4(),
            AuditType::Pagespeed,
            json!({}),
        );
        audit.advance(AuditStatus::Completed).unwrap();
        let err = audit.advance(AuditStatus::InProgress).unwrap_err();
        assert_eq!(err.from, AuditStatus::Completed);
        assert_eq!(err.to, AuditStatus::InProgress);
        assert_eq!(audit.status, AuditStatus::Completed);
    }

    #[test]
    fn status_uses_wire_names() {
        assert_eq!(
            serde_json::to_value(AuditStatus::InProgress).unwrap(),
            json!("in-progress")
        );
        assert_eq!(AuditStatus::parse("in-progress"), Some(AuditStatus::InProgress));
        assert_eq!(AuditStatus::parse("running"), None);
    }

    #[test]
    fn audit_type_parse_is_case_insensitive() {
        assert_eq!(AuditType::parse("PageSpeed"), Some(AuditType::Pagespeed));
        assert_eq!(AuditType::parse("SERPSTACK"), Some(AuditType::Serpstack));
        assert_eq!(AuditType::parse("lighthouse"), None);
    }

    #[test]
    fn summary_projects_only_performance_and_detailed_report() {
        let mut audit = Audit::new(
            "example.com".to_string(),
            Uuid::new_v4(),
            AuditType::Serpstack,
            json!({
                "organic_results": [{"url": "https://example.com"}],
                "search_parameters": {"q": "site:example.com"},
                "detailedReport": {"results": []}
            }),
        );
        audit.serp_rank = Some(1);
        let summary = audit.summary();
        assert_eq!(summary.seo_data, json!({"detailedReport": {"results": []}}));
        assert!(summary.seo_data.get("organic_results").is_none());
    }
}
