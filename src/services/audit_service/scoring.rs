//! Pure measurement-to-score transform, shared by the create and update
//! flows so the two can never diverge in how a payload is scored.

use crate::models::SeoMeasurement;

/// The derived score fields of an audit record.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AuditScoreFields {
    pub performance_score: Option<f64>,
    pub accessibility_score: Option<f64>,
    pub best_practices_score: Option<f64>,
    pub seo_score: Option<f64>,
    pub serp_rank: Option<u32>,
}

pub fn score_measurement(measurement: &SeoMeasurement) -> AuditScoreFields {
    // a ranked measurement derives its SEO score from the rank; otherwise
    // the adapter's category score stands
    let seo_score = match measurement.rank {
        Some(rank) => Some(serp_rank_score(rank)),
        None => measurement.scores.seo,
    };
    AuditScoreFields {
        performance_score: measurement.scores.performance,
        accessibility_score: measurement.scores.accessibility,
        best_practices_score: measurement.scores.best_practices,
        seo_score,
        serp_rank: measurement.rank,
    }
}

/// Linear decay over the first ten positions: rank 1 scores 90, rank 10
/// scores 0, unranked (0) scores 0. Clamped so a rank past ten can never
/// go negative should the result count ever become configurable.
pub fn serp_rank_score(rank: u32) -> f64 {
    if rank == 0 {
        return 0.0;
    }
    (100.0 - (rank as f64 / 10.0) * 100.0).max(0.0)
}
