use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoIssue {
    #[serde(rename = "type")]
    pub issue_type: String,
    pub description: String,
    pub severity: IssueSeverity,
}

/// Richer analysis keyed to an audit. No operation in the current contract
/// creates or links one; the entity (and `Audit::report_id`) exist as an
/// extension point for a deeper-analysis provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub audit_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lighthouse_report: Option<Value>,
    pub seo_issues: Vec<SeoIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search_console: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ahrefs_data: Option<Value>,
    pub recommendations: Vec<String>,
    pub created_at: DateTime<Utc>,
}
