use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::domain::models::{CandidateSet, Prompt};

/// Failure modes of a text-generation backend.
///
/// None of these abort a pipeline run (except `Cancelled`): the coordinator
/// answers them with the deterministic fallback candidate set and a
/// degraded-step annotation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// No endpoint or api key configured; generation must not touch the
    /// network.
    #[error("generation backend not configured")]
    NotConfigured,

    /// The backend kept failing transiently after all retry attempts.
    #[error("generation backend unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected the request (auth, malformed prompt, or a
    /// response that never conformed to the output schema).
    #[error("generation backend rejected the request: {0}")]
    Rejected(String),

    /// The caller cancelled the invocation mid-generation.
    #[error("generation cancelled")]
    Cancelled,
}

impl GenerationError {
    /// Degraded-step label for this failure, where applicable.
    pub const fn degraded_label(&self) -> &'static str {
        "llm"
    }
}

/// A text-generation backend producing schema-validated candidate sets.
///
/// Implementations own sanitization, timeouts, and retry; callers own the
/// fallback policy.
#[async_trait]
pub trait CandidateGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &Prompt,
        cancel: &CancellationToken,
    ) -> Result<CandidateSet, GenerationError>;
}
