//! Interest-over-time provider backed by the trends endpoint.

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::cache::ProviderCache;
use crate::domain::models::TrendSignal;
use crate::domain::ports::{ProviderError, TrendProvider};

const DEFAULT_BASE_URL: &str = "https://trends.google.com";

const REQUEST_TIMEOUT_SECS: u64 = 5;

/// XSSI guard some trend endpoints prepend to JSON bodies.
const XSSI_PREFIX: &str = ")]}'";

#[derive(Debug, Deserialize)]
struct TrendPayload {
    average_interest: f64,
    peak_interest: f64,
    #[serde(default)]
    rising: bool,
}

pub struct HttpTrendProvider {
    http: ReqwestClient,
    base_url: String,
    cache: ProviderCache<TrendSignal>,
}

impl HttpTrendProvider {
    pub fn new(cache_capacity: usize, cache_ttl: Duration) -> Result<Self, ProviderError> {
        let http = ReqwestClient::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::Http(e.to_string()))?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            cache: ProviderCache::new(cache_capacity, cache_ttl),
        })
    }

    /// Point at a different host (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl TrendProvider for HttpTrendProvider {
    async fn interest(&self, term: &str) -> Result<TrendSignal, ProviderError> {
        if let Some(hit) = self.cache.get(term) {
            debug!(term, "trend cache hit");
            return Ok(hit);
        }

        let url = format!("{}/trends/api/widgetdata/interest", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("q", term)])
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Http(format!(
                "status {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;
        let trimmed = body
            .trim_start()
            .strip_prefix(XSSI_PREFIX)
            .unwrap_or(&body)
            .trim_start();

        let payload: TrendPayload =
            serde_json::from_str(trimmed).map_err(|e| ProviderError::Decode(e.to_string()))?;

        let signal = TrendSignal {
            avg_interest: payload.average_interest.clamp(0.0, 100.0),
            peak_interest: payload.peak_interest.clamp(0.0, 100.0),
            rising: payload.rising,
        };

        self.cache.put(term.to_string(), signal.clone());
        Ok(signal)
    }
}
