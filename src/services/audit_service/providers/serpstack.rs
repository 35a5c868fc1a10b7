//! Serpstack adapter.
//!
//! Queries organic search results (fixed count of 10) and derives the
//! target domain's 1-based rank: the first result whose hostname matches
//! the domain after lowercasing and stripping a leading `www.`, or 0 when
//! no result matches.

use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::vendor_message;
use crate::error::ProviderError;
use crate::models::{CategoryScores, SeoMeasurement};

pub const SERPSTACK_ENDPOINT: &str = "https://api.serpstack.com/search";
pub const RESULT_COUNT: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct SerpstackResponse {
    pub organic_results: Option<Vec<OrganicResult>>,
    pub search_parameters: Option<Value>,
    pub search_metadata: Option<Value>,
}

/// One raw organic result. Unrecognized vendor fields are carried through
/// so the persisted payload matches what the provider sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganicResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An organic result normalized for the detailed report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub url: String,
    pub domain: String,
}

/// The effective search query: the caller's, or `site:{domain}` when no
/// non-empty query was supplied.
pub fn search_query(domain: &str, query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => format!("site:{domain}"),
    }
}

pub async fn fetch(
    client: &reqwest::Client,
    access_key: &str,
    domain: &str,
    query: Option<&str>,
) -> Result<SeoMeasurement, ProviderError> {
    let q = search_query(domain, query);
    info!("serpstack request for {domain} with query {q:?}");
    let count = RESULT_COUNT.to_string();
    let response = client
        .get(SERPSTACK_ENDPOINT)
        .query(&[
            ("access_key", access_key),
            ("query", q.as_str()),
            ("num", count.as_str()),
        ])
        .send()
        .await
        .map_err(|err| ProviderError::Unavailable(format!("serpstack request failed: {err}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Unavailable(format!(
            "serpstack returned {status}: {}",
            vendor_message(&body)
        )));
    }

    let payload: SerpstackResponse = response.json().await.map_err(|err| {
        ProviderError::MalformedResponse(format!("invalid serpstack response: {err}"))
    })?;
    normalize(payload, domain)
}

/// Pure payload-to-measurement transform for a target domain.
pub fn normalize(
    response: SerpstackResponse,
    target_domain: &str,
) -> Result<SeoMeasurement, ProviderError> {
    let organic = response.organic_results.ok_or_else(|| {
        ProviderError::MalformedResponse("no organic_results in serpstack response".to_string())
    })?;

    let mut results = Vec::with_capacity(organic.len());
    for result in &organic {
        let url = result.url.as_deref().ok_or_else(|| {
            ProviderError::MalformedResponse("organic result missing url".to_string())
        })?;
        results.push(RankedResult {
            position: result.position,
            title: result.title.clone(),
            url: url.to_string(),
            domain: hostname(url)?,
        });
    }

    let rank = compute_rank(target_domain, &results);

    let query = response
        .search_parameters
        .as_ref()
        .and_then(|params| params.get("q"))
        .cloned()
        .unwrap_or(Value::Null);
    let num = response
        .search_parameters
        .as_ref()
        .and_then(|params| params.get("num"))
        .cloned()
        .unwrap_or(Value::Null);
    let status = response
        .search_metadata
        .as_ref()
        .and_then(|meta| meta.get("status"))
        .cloned()
        .unwrap_or(Value::Null);

    let seo_data = json!({
        "organic_results": organic,
        "search_parameters": response.search_parameters,
        "detailedReport": {
            "results": results,
            "query": query,
            "num": num,
            "status": status,
        }
    });

    Ok(SeoMeasurement {
        scores: CategoryScores::default(),
        rank: Some(rank),
        seo_data,
    })
}

/// 1-based position of the first result matching the target domain, 0 when
/// none does.
pub fn compute_rank(target_domain: &str, results: &[RankedResult]) -> u32 {
    let target = canonical_host(target_domain);
    results
        .iter()
        .position(|result| canonical_host(&result.domain) == target)
        .map(|index| index as u32 + 1)
        .unwrap_or(0)
}

fn canonical_host(host: &str) -> String {
    let lower = host.to_lowercase();
    match lower.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => lower,
    }
}

fn hostname(url: &str) -> Result<String, ProviderError> {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .ok_or_else(|| ProviderError::MalformedResponse(format!("invalid result url: {url}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(payload: Value) -> SerpstackResponse {
        serde_json::from_value(payload).unwrap()
    }

    fn results(urls: &[&str]) -> Value {
        json!(urls
            .iter()
            .enumerate()
            .map(|(index, url)| json!({
                "position": index + 1,
                "title": format!("result {}", index + 1),
                "url": url,
            }))
            .collect::<Vec<_>>())
    }

    #[test]
    fn rank_is_first_matching_result() {
        let response = parse(json!({
            "organic_results": results(&[
                "https://a.com/page",
                "https://b.com/",
                "https://target.com/about",
            ]),
            "search_parameters": {"q": "site:target.com", "num": 10},
            "search_metadata": {"status": "Success"},
        }));
        let measurement = normalize(response, "target.com").unwrap();
        assert_eq!(measurement.rank, Some(3));
        let report = &measurement.seo_data["detailedReport"];
        assert_eq!(report["results"][2]["domain"], json!("target.com"));
        assert_eq!(report["query"], json!("site:target.com"));
        assert_eq!(report["num"], json!(10));
        assert_eq!(report["status"], json!("Success"));
    }

    #[test]
    fn rank_is_zero_when_no_result_matches() {
        let response = parse(json!({
            "organic_results": results(&["https://a.com/", "https://b.com/"]),
        }));
        let measurement = normalize(response, "target.com").unwrap();
        assert_eq!(measurement.rank, Some(0));
    }

    #[test]
    fn matching_ignores_case_and_leading_www() {
        let response = parse(json!({
            "organic_results": results(&["https://WWW.Target.COM/home"]),
        }));
        let measurement = normalize(response, "www.target.com").unwrap();
        assert_eq!(measurement.rank, Some(1));
    }

    #[test]
    fn subdomains_do_not_match() {
        let response = parse(json!({
            "organic_results": results(&["https://blog.target.com/"]),
        }));
        let measurement = normalize(response, "target.com").unwrap();
        assert_eq!(measurement.rank, Some(0));
    }

    #[test]
    fn missing_organic_results_is_malformed() {
        let response = parse(json!({
            "success": false,
            "error": {"code": 310, "info": "invalid search query"},
        }));
        let err = normalize(response, "target.com").unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[test]
    fn unparsable_result_url_is_malformed() {
        let response = parse(json!({
            "organic_results": [{"position": 1, "url": "not a url"}],
        }));
        let err = normalize(response, "target.com").unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[test]
    fn raw_organic_results_round_trip_into_seo_data() {
        let response = parse(json!({
            "organic_results": [{
                "position": 1,
                "title": "Target",
                "url": "https://target.com/",
                "snippet": "kept verbatim",
            }],
        }));
        let measurement = normalize(response, "target.com").unwrap();
        assert_eq!(
            measurement.seo_data["organic_results"][0]["snippet"],
            json!("kept verbatim")
        );
    }

    #[test]
    fn default_query_targets_the_domain() {
        assert_eq!(search_query("example.com", None), "site:example.com");
        assert_eq!(search_query("example.com", Some("")), "site:example.com");
        assert_eq!(search_query("example.com", Some("best coffee")), "best coffee");
    }
}
