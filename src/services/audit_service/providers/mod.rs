//! Provider adapters: stateless translators from vendor payloads into the
//! canonical `SeoMeasurement`. Each adapter is a pure normalization step
//! plus a thin HTTP fetch; the lifecycle manager only sees the trait.

pub mod pagespeed;
pub mod serpstack;

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::error::ProviderError;
use crate::models::{AuditType, SeoMeasurement};

#[async_trait]
pub trait MeasurementProvider: Send + Sync {
    /// Run a single measurement against `domain`. `query` only applies to
    /// search-rank providers. No retry: a failure is terminal for the
    /// request that triggered it.
    async fn measure(
        &self,
        audit_type: AuditType,
        domain: &str,
        query: Option<&str>,
    ) -> Result<SeoMeasurement, ProviderError>;
}

/// Production provider set, dispatching on audit type over one shared
/// HTTP client. Every call runs under the configured timeout.
#[derive(Clone)]
pub struct HttpProviders {
    client: reqwest::Client,
    google_api_key: String,
    serpstack_api_key: String,
}

impl HttpProviders {
    pub fn new(
        google_api_key: String,
        serpstack_api_key: String,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            google_api_key,
            serpstack_api_key,
        })
    }
}

#[async_trait]
impl MeasurementProvider for HttpProviders {
    async fn measure(
        &self,
        audit_type: AuditType,
        domain: &str,
        query: Option<&str>,
    ) -> Result<SeoMeasurement, ProviderError> {
        match audit_type {
            AuditType::Pagespeed => {
                pagespeed::fetch(&self.client, &self.google_api_key, domain).await
            }
            AuditType::Serpstack => {
                serpstack::fetch(&self.client, &self.serpstack_api_key, domain, query).await
            }
        }
    }
}

/// Pull a human-readable message out of a vendor error body, falling back
/// to the raw text. Both vendors wrap their messages differently.
pub(crate) fn vendor_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let message = value
            .pointer("/error/message")
            .or_else(|| value.pointer("/error/info"))
            .or_else(|| value.get("message"))
            .and_then(Value::as_str);
        if let Some(message) = message {
            return message.to_string();
        }
    }
    body.trim().chars().take(512).collect()
}
