//! PageSpeed Insights adapter.
//!
//! Normalizes a lighthouse-style response into the canonical measurement.
//! Per-category scores use an absent-only fallback chain: the aggregate
//! category score when present (including a legitimate 0), otherwise the
//! same-named individual audit score, otherwise 0 — scaled to 0-100.

use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

use super::vendor_message;
use crate::error::ProviderError;
use crate::models::{CategoryScores, SeoMeasurement};

pub const PAGESPEED_ENDPOINT: &str =
    "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagespeedResponse {
    pub lighthouse_result: Option<LighthouseResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LighthouseResult {
    #[serde(default)]
    pub categories: Categories,
    #[serde(default)]
    pub audits: HashMap<String, AuditEntry>,
    #[serde(default)]
    pub run_warnings: Vec<Value>,
    pub final_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Categories {
    pub performance: Option<Category>,
    pub accessibility: Option<Category>,
    #[serde(rename = "best-practices")]
    pub best_practices: Option<Category>,
    pub seo: Option<Category>,
}

#[derive(Debug, Deserialize)]
pub struct Category {
    pub score: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub score: Option<f64>,
    pub numeric_value: Option<f64>,
    pub details: Option<AuditDetails>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditDetails {
    #[serde(default)]
    pub items: Vec<AuditItem>,
}

#[derive(Debug, Deserialize)]
pub struct AuditItem {
    pub url: Option<String>,
}

/// Keys projected out of the lighthouse audits for the summary view.
#[derive(Debug, Serialize)]
struct DetailedReport {
    #[serde(rename = "first-contentful-paint")]
    first_contentful_paint: f64,
    #[serde(rename = "largest-contentful-paint")]
    largest_contentful_paint: f64,
    #[serde(rename = "total-blocking-time")]
    total_blocking_time: f64,
    #[serde(rename = "cumulative-layout-shift")]
    cumulative_layout_shift: f64,
    #[serde(rename = "render-blocking-resources")]
    render_blocking_resources: Vec<String>,
    #[serde(rename = "uses-optimized-images")]
    uses_optimized_images: f64,
    performance: f64,
    accessibility: f64,
    #[serde(rename = "best-practices")]
    best_practices: f64,
    seo: f64,
    #[serde(rename = "runWarnings")]
    run_warnings: Vec<Value>,
    #[serde(rename = "finalUrl")]
    final_url: Option<String>,
}

/// The measured URL: always https, with a `www.` prefix unless the domain
/// already carries one.
pub fn request_url(domain: &str) -> String {
    if domain.contains("www.") {
        format!("https://{domain}")
    } else {
        format!("https://www.{domain}")
    }
}

pub async fn fetch(
    client: &reqwest::Client,
    api_key: &str,
    domain: &str,
) -> Result<SeoMeasurement, ProviderError> {
    let target = request_url(domain);
    info!("pagespeed request for {target}");
    let response = client
        .get(PAGESPEED_ENDPOINT)
        .query(&[
            ("url", target.as_str()),
            ("key", api_key),
            ("category", "performance"),
            ("category", "accessibility"),
            ("category", "best-practices"),
            ("category", "seo"),
        ])
        .send()
        .await
        .map_err(|err| ProviderError::Unavailable(format!("PageSpeed request failed: {err}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Unavailable(format!(
            "PageSpeed returned {status}: {}",
            vendor_message(&body)
        )));
    }

    let payload: PagespeedResponse = response.json().await.map_err(|err| {
        ProviderError::MalformedResponse(format!("invalid PageSpeed response: {err}"))
    })?;
    normalize(payload)
}

/// Pure payload-to-measurement transform.
pub fn normalize(response: PagespeedResponse) -> Result<SeoMeasurement, ProviderError> {
    let result = response.lighthouse_result.ok_or_else(|| {
        ProviderError::MalformedResponse("No lighthouseResult in PageSpeed response".to_string())
    })?;

    let scores = CategoryScores {
        performance: Some(fallback_score(
            result.categories.performance.as_ref(),
            result.audits.get("performance"),
        )),
        accessibility: Some(fallback_score(
            result.categories.accessibility.as_ref(),
            result.audits.get("accessibility"),
        )),
        best_practices: Some(fallback_score(
            result.categories.best_practices.as_ref(),
            result.audits.get("best-practices"),
        )),
        seo: Some(fallback_score(
            result.categories.seo.as_ref(),
            result.audits.get("seo"),
        )),
    };

    let report = DetailedReport {
        first_contentful_paint: numeric_value(&result, "first-contentful-paint"),
        largest_contentful_paint: numeric_value(&result, "largest-contentful-paint"),
        total_blocking_time: numeric_value(&result, "total-blocking-time"),
        // layout shift is reported by its score, not its numeric value
        cumulative_layout_shift: audit_score(&result, "cumulative-layout-shift"),
        render_blocking_resources: result
            .audits
            .get("render-blocking-resources")
            .and_then(|audit| audit.details.as_ref())
            .map(|details| {
                details
                    .items
                    .iter()
                    .filter_map(|item| item.url.clone())
                    .collect()
            })
            .unwrap_or_default(),
        uses_optimized_images: audit_score(&result, "uses-optimized-images"),
        performance: scores.performance.unwrap_or(0.0),
        accessibility: scores.accessibility.unwrap_or(0.0),
        best_practices: scores.best_practices.unwrap_or(0.0),
        seo: scores.seo.unwrap_or(0.0),
        run_warnings: result.run_warnings,
        final_url: result.final_url,
    };

    let seo_data = json!({
        "performance": report.performance,
        "detailedReport": report,
    });

    Ok(SeoMeasurement {
        scores,
        rank: None,
        seo_data,
    })
}

fn fallback_score(category: Option<&Category>, audit: Option<&AuditEntry>) -> f64 {
    category
        .and_then(|category| category.score)
        .or_else(|| audit.and_then(|audit| audit.score))
        .unwrap_or(0.0)
        * 100.0
}

fn numeric_value(result: &LighthouseResult, key: &str) -> f64 {
    result
        .audits
        .get(key)
        .and_then(|audit| audit.numeric_value)
        .unwrap_or(0.0)
}

fn audit_score(result: &LighthouseResult, key: &str) -> f64 {
    result
        .audits
        .get(key)
        .and_then(|audit| audit.score)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(payload: Value) -> PagespeedResponse {
        serde_json::from_value(payload).unwrap()
    }

    #[test]
    fn category_score_wins_over_audit_score() {
        let response = parse(json!({
            "lighthouseResult": {
                "categories": {"performance": {"score": 0.93}},
                "audits": {"performance": {"score": 0.10}}
            }
        }));
        let measurement = normalize(response).unwrap();
        assert_eq!(measurement.scores.performance, Some(93.0));
    }

    #[test]
    fn category_score_of_zero_is_not_skipped() {
        let response = parse(json!({
            "lighthouseResult": {
                "categories": {"accessibility": {"score": 0.0}},
                "audits": {"accessibility": {"score": 0.9}}
            }
        }));
        let measurement = normalize(response).unwrap();
        assert_eq!(measurement.scores.accessibility, Some(0.0));
    }

    #[test]
    fn audit_score_fills_in_for_missing_category() {
        let response = parse(json!({
            "lighthouseResult": {
                "categories": {},
                "audits": {"seo": {"score": 0.85}}
            }
        }));
        let measurement = normalize(response).unwrap();
        assert_eq!(measurement.scores.seo, Some(85.0));
    }

    #[test]
    fn missing_category_and_audit_scores_zero() {
        let response = parse(json!({"lighthouseResult": {"categories": {}, "audits": {}}}));
        let measurement = normalize(response).unwrap();
        assert_eq!(measurement.scores.performance, Some(0.0));
        assert_eq!(measurement.scores.accessibility, Some(0.0));
        assert_eq!(measurement.scores.best_practices, Some(0.0));
        assert_eq!(measurement.scores.seo, Some(0.0));
    }

    #[test]
    fn best_practices_uses_kebab_category_key() {
        let response = parse(json!({
            "lighthouseResult": {
                "categories": {"best-practices": {"score": 0.5}},
                "audits": {}
            }
        }));
        let measurement = normalize(response).unwrap();
        assert_eq!(measurement.scores.best_practices, Some(50.0));
    }

    #[test]
    fn detailed_report_collects_metrics_and_blocking_resources() {
        let response = parse(json!({
            "lighthouseResult": {
                "categories": {"performance": {"score": 0.8}},
                "audits": {
                    "first-contentful-paint": {"numericValue": 1810.5},
                    "largest-contentful-paint": {"numericValue": 2650.0},
                    "cumulative-layout-shift": {"score": 0.98, "numericValue": 0.002},
                    "render-blocking-resources": {
                        "details": {"items": [
                            {"url": "https://www.example.com/a.css"},
                            {"url": "https://www.example.com/b.js"}
                        ]}
                    }
                },
                "runWarnings": ["ran in throttled mode"],
                "finalUrl": "https://www.example.com/"
            }
        }));
        let measurement = normalize(response).unwrap();
        let report = &measurement.seo_data["detailedReport"];
        assert_eq!(report["first-contentful-paint"], json!(1810.5));
        assert_eq!(report["largest-contentful-paint"], json!(2650.0));
        // total-blocking-time was absent, so it reads 0
        assert_eq!(report["total-blocking-time"], json!(0.0));
        // cumulative layout shift carries the score, not the numeric value
        assert_eq!(report["cumulative-layout-shift"], json!(0.98));
        assert_eq!(
            report["render-blocking-resources"],
            json!(["https://www.example.com/a.css", "https://www.example.com/b.js"])
        );
        assert_eq!(report["runWarnings"], json!(["ran in throttled mode"]));
        assert_eq!(report["finalUrl"], json!("https://www.example.com/"));
        assert_eq!(measurement.seo_data["performance"], json!(80.0));
    }

    #[test]
    fn missing_lighthouse_result_is_malformed() {
        let response = parse(json!({"captchaResult": "CAPTCHA_NOT_NEEDED"}));
        let err = normalize(response).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[test]
    fn request_url_prefixes_www_when_absent() {
        assert_eq!(request_url("example.com"), "https://www.example.com");
        assert_eq!(request_url("www.example.com"), "https://www.example.com");
        assert_eq!(request_url("blog.www.example.com"), "https://blog.www.example.com");
    }
}
