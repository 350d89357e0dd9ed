use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::{Language, TrendSignal};

/// Failure of a best-effort enrichment provider.
///
/// Providers never fail the pipeline; a miss only degrades the keyword
/// bundle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Http(String),

    #[error("provider response malformed: {0}")]
    Decode(String),

    /// The provider is disabled or intentionally absent.
    #[error("provider unavailable")]
    Unavailable,
}

/// Search-suggestion source for a mined term.
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    async fn suggest(&self, term: &str, language: Language) -> Result<Vec<String>, ProviderError>;
}

/// Interest-over-time source for a mined term.
#[async_trait]
pub trait TrendProvider: Send + Sync {
    async fn interest(&self, term: &str) -> Result<TrendSignal, ProviderError>;
}

/// Suggestion provider that always misses. Used when enrichment is disabled
/// and as a test stand-in.
pub struct NullSuggestionProvider;

#[async_trait]
impl SuggestionProvider for NullSuggestionProvider {
    async fn suggest(&self, _term: &str, _language: Language) -> Result<Vec<String>, ProviderError> {
        Err(ProviderError::Unavailable)
    }
}

/// Trend provider that always misses.
pub struct NullTrendProvider;

#[async_trait]
impl TrendProvider for NullTrendProvider {
    async fn interest(&self, _term: &str) -> Result<TrendSignal, ProviderError> {
        Err(ProviderError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_providers_always_miss() {
        assert_eq!(
            NullSuggestionProvider
                .suggest("python", Language::En)
                .await
                .unwrap_err(),
            ProviderError::Unavailable
        );
        assert_eq!(
            NullTrendProvider.interest("python").await.unwrap_err(),
            ProviderError::Unavailable
        );
    }
}
