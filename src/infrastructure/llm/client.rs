//! HTTP client for the text-generation endpoint.
//!
//! Wraps a single POST with input sanitization, a per-attempt timeout,
//! transient-only retry with full-jitter backoff, one extra soft retry for a
//! schema-violating response, and cancellation honored between attempts.

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::error::LlmApiError;
use super::retry::RetryPolicy;
use super::schema::{coerce, RawCandidatePayload};
use crate::domain::models::config::LlmConfig;
use crate::domain::models::{CandidateSet, Prompt};
use crate::domain::ports::{CandidateGenerator, GenerationError};
use crate::services::sanitizer::sanitize_prompt;

/// Production generation client.
pub struct HttpCandidateGenerator {
    http: ReqwestClient,
    config: LlmConfig,
    retry: RetryPolicy,
}

impl HttpCandidateGenerator {
    pub fn new(config: LlmConfig) -> Result<Self, GenerationError> {
        let http = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_s))
            .build()
            .map_err(|e| GenerationError::Unavailable(format!("http client build failed: {e}")))?;

        Ok(Self {
            http,
            config,
            retry: RetryPolicy::default(),
        })
    }

    /// Override the backoff schedule (used by tests to avoid real sleeps).
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn attempt(&self, prompt_text: &str) -> Result<CandidateSet, LlmApiError> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&json!({ "prompt": prompt_text, "format": "json" }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmApiError::Timeout(self.config.timeout_s)
                } else {
                    LlmApiError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmApiError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(LlmApiError::from_status(status.as_u16(), body));
        }

        let raw: RawCandidatePayload = serde_json::from_str(&body)
            .map_err(|e| LlmApiError::InvalidResponse(format!("not schema JSON: {e}")))?;
        coerce(raw).map_err(LlmApiError::InvalidResponse)
    }
}

#[async_trait]
impl CandidateGenerator for HttpCandidateGenerator {
    async fn generate(
        &self,
        prompt: &Prompt,
        cancel: &CancellationToken,
    ) -> Result<CandidateSet, GenerationError> {
        if !self.config.is_configured() {
            return Err(GenerationError::NotConfigured);
        }

        let sanitized = sanitize_prompt(&prompt.text);
        let mut attempt: u32 = 0;
        let mut soft_retry_used = false;

        loop {
            if cancel.is_cancelled() {
                return Err(GenerationError::Cancelled);
            }

            let outcome = tokio::select! {
                () = cancel.cancelled() => return Err(GenerationError::Cancelled),
                result = self.attempt(&sanitized) => result,
            };

            let err = match outcome {
                Ok(set) => {
                    debug!(attempt, "generation succeeded");
                    return Ok(set);
                }
                Err(err) => err,
            };

            let retry_again = if err.is_transient() {
                attempt + 1 < self.config.max_attempts
            } else if matches!(err, LlmApiError::InvalidResponse(_)) && !soft_retry_used {
                // A malformed response earns exactly one extra try.
                soft_retry_used = true;
                true
            } else {
                false
            };

            if !retry_again {
                warn!(attempt, error = %err, "generation gave up");
                return Err(if err.is_transient() {
                    GenerationError::Unavailable(err.to_string())
                } else {
                    GenerationError::Rejected(err.to_string())
                });
            }

            let delay = self.retry.jittered_delay(attempt);
            debug!(attempt, delay_ms = delay.as_millis() as u64, error = %err, "retrying generation");
            attempt += 1;

            tokio::select! {
                () = cancel.cancelled() => return Err(GenerationError::Cancelled),
                () = tokio::time::sleep(delay) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{PromptMetadata, Tone};

    fn prompt() -> Prompt {
        Prompt {
            text: "generate titles about python".to_string(),
            metadata: PromptMetadata {
                tone: Tone::Curiosity,
                template_version: 1,
                included_keywords: vec!["python".to_string()],
                included_gaps: vec![],
                examples_used: vec![],
            },
        }
    }

    fn config(endpoint: &str) -> LlmConfig {
        LlmConfig {
            endpoint: endpoint.to_string(),
            api_key: "test-key".to_string(),
            timeout_s: 5,
            max_attempts: 3,
        }
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy::new(1, 2)
    }

    #[tokio::test]
    async fn unconfigured_endpoint_short_circuits() {
        let client = HttpCandidateGenerator::new(LlmConfig::default()).unwrap();
        let err = client
            .generate(&prompt(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::NotConfigured);
    }

    #[tokio::test]
    async fn valid_json_response_is_accepted() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body(
                r#"{"titles": ["A Complete Python Guide for Working Developers"],
                    "descriptions": [], "tags": ["python"], "thumbnail_lines": ["PYTHON NOW"]}"#,
            )
            .create_async()
            .await;

        let client = HttpCandidateGenerator::new(config(&server.url()))
            .unwrap()
            .with_retry(fast_retry());
        let set = client
            .generate(&prompt(), &CancellationToken::new())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(set.titles.len(), 1);
        assert!(set.tags.contains("python"));
    }

    #[tokio::test]
    async fn persistent_503_exhausts_retries_into_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(503)
            .with_body("overloaded")
            .expect(3)
            .create_async()
            .await;

        let client = HttpCandidateGenerator::new(config(&server.url()))
            .unwrap()
            .with_retry(fast_retry());
        let err = client
            .generate(&prompt(), &CancellationToken::new())
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, GenerationError::Unavailable(_)));
    }

    #[tokio::test]
    async fn auth_failure_is_rejected_without_retry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(401)
            .with_body("bad key")
            .expect(1)
            .create_async()
            .await;

        let client = HttpCandidateGenerator::new(config(&server.url()))
            .unwrap()
            .with_retry(fast_retry());
        let err = client
            .generate(&prompt(), &CancellationToken::new())
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, GenerationError::Rejected(_)));
    }

    #[tokio::test]
    async fn malformed_json_gets_exactly_one_extra_try() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body("this is not json")
            .expect(2)
            .create_async()
            .await;

        let client = HttpCandidateGenerator::new(config(&server.url()))
            .unwrap()
            .with_retry(fast_retry());
        let err = client
            .generate(&prompt(), &CancellationToken::new())
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, GenerationError::Rejected(_)));
    }

    #[tokio::test]
    async fn pre_cancelled_token_stops_before_any_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/").expect(0).create_async().await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let client = HttpCandidateGenerator::new(config(&server.url())).unwrap();
        let err = client.generate(&prompt(), &cancel).await.unwrap_err();

        mock.assert_async().await;
        assert_eq!(err, GenerationError::Cancelled);
    }
}
