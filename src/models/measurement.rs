use serde_json::Value;

/// Per-category scores on the 0-100 scale, after the provider adapter has
/// applied its fallback chain. A category the provider did not measure is
/// absent rather than zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoryScores {
    pub performance: Option<f64>,
    pub accessibility: Option<f64>,
    pub best_practices: Option<f64>,
    pub seo: Option<f64>,
}

/// Canonical provider-agnostic measurement produced by an adapter.
///
/// `rank` is only present for search-rank providers; 0 means the target
/// domain was not found in the result list. `seo_data` is the normalized
/// payload persisted on the audit, including its `detailedReport`.
#[derive(Debug, Clone)]
pub struct SeoMeasurement {
    pub scores: CategoryScores,
    pub rank: Option<u32>,
    pub seo_data: Value,
}
