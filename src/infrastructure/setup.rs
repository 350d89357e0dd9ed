//! Top-down construction of the pipeline from configuration.
//!
//! Adapters (CLI, HTTP playground) call in here so every surface wires the
//! same component graph.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::application::Pipeline;
use crate::domain::models::Config;
use crate::infrastructure::enrichment::{HttpSuggestionProvider, HttpTrendProvider};
use crate::infrastructure::llm::HttpCandidateGenerator;
use crate::infrastructure::store::StrategyStore;
use crate::services::csv_validator::CsvValidator;
use crate::services::keyword_analyzer::KeywordAnalyzer;

/// Build the pipeline and its store from a validated config.
pub async fn build_pipeline(config: &Config) -> Result<(Arc<Pipeline>, Arc<StrategyStore>)> {
    let strategies_dir = config.strategies_dir();
    let store = Arc::new(StrategyStore::open(&strategies_dir).await.with_context(
        || {
            format!(
                "failed to open strategy store at {}",
                strategies_dir.display()
            )
        },
    )?);

    let cache_ttl = Duration::from_secs(config.enrichment.cache_ttl_s);
    let suggestions = Arc::new(
        HttpSuggestionProvider::new(config.enrichment.cache_capacity, cache_ttl)
            .context("failed to build suggestion provider")?,
    );
    let trends = Arc::new(
        HttpTrendProvider::new(config.enrichment.cache_capacity, cache_ttl)
            .context("failed to build trend provider")?,
    );

    let generator = Arc::new(
        HttpCandidateGenerator::new(config.llm.clone())
            .context("failed to build generation client")?,
    );

    let pipeline = Arc::new(Pipeline::new(
        CsvValidator::new(config.limits.clone()),
        KeywordAnalyzer::new(suggestions, trends, config.enrichment.clone()),
        generator,
        Arc::clone(&store),
    ));

    Ok((pipeline, store))
}
