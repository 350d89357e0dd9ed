//! Search-suggestion provider backed by the public autocomplete endpoint.

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::time::Duration;
use tracing::debug;

use super::cache::ProviderCache;
use crate::domain::models::Language;
use crate::domain::ports::{ProviderError, SuggestionProvider};

const DEFAULT_BASE_URL: &str = "https://suggestqueries.google.com";

/// Per-request timeout; the analyzer's shared deadline is the real bound.
const REQUEST_TIMEOUT_SECS: u64 = 5;

pub struct HttpSuggestionProvider {
    http: ReqwestClient,
    base_url: String,
    cache: ProviderCache<Vec<String>>,
}

impl HttpSuggestionProvider {
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

    fn language_code(language: Language) -> &'static str {
        match language {
            Language::Bn => "bn",
            Language::En | Language::Other => "en",
        }
    }
}

#[async_trait]
impl SuggestionProvider for HttpSuggestionProvider {
    async fn suggest(&self, term: &str, language: Language) -> Result<Vec<String>, ProviderError> {
        let cache_key = format!("{}:{term}", Self::language_code(language));
        if let Some(hit) = self.cache.get(&cache_key) {
            debug!(term, "suggestion cache hit");
            return Ok(hit);
        }

        let url = format!("{}/complete/search", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("client", "firefox"),
                ("ds", "yt"),
                ("hl", Self::language_code(language)),
                ("q", term),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Http(format!(
                "status {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        // Shape: ["<query>", ["suggestion", ...], ...]
        let suggestions: Vec<String> = body
            .get(1)
            .and_then(|v| v.as_array())
            .ok_or_else(|| ProviderError::Decode("missing suggestion array".to_string()))?
            .iter()
            .filter_map(|v| v.as_str())
            .map(ToString::to_string)
            .collect();

        self.cache.put(cache_key, suggestions.clone());
        Ok(suggestions)
    }
}
