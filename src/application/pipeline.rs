//! Pipeline coordination: validate → mine → compare → prompt → generate →
//! rerank → persist.
//!
//! The coordinator owns the partial-failure policy: creator-input and
//! storage failures are fatal, best-effort upstream failures degrade the run
//! and are recorded in the strategy, and cancellation is checked between
//! every step. A cancelled invocation never persists anything.

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::domain::error::PipelineError;
use crate::domain::models::{
    Brief, CreatorRow, GapBundle, KeywordBundle, PipelineStats, PsychologicalMetadata, Strategy,
    ValidationWarning, STRATEGY_VERSION,
};
use crate::domain::ports::{CandidateGenerator, GenerationError};
use crate::infrastructure::store::StrategyStore;
use crate::services::csv_validator::{CsvValidator, TableSource};
use crate::services::emotion_optimizer::EmotionOptimizer;
use crate::services::fallback;
use crate::services::gap_detector::GapDetector;
use crate::services::keyword_analyzer::{detect_language, mine_keywords, KeywordAnalyzer};
use crate::services::prompt_builder::PromptBuilder;
use crate::services::triggers::trigger_ids;

/// One pipeline invocation's inputs.
pub struct AnalysisRequest {
    pub brief: Brief,
    pub creator: TableSource,
    pub competitors: Vec<TableSource>,
}

/// What a successful invocation hands back to the adapter.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub strategy: Strategy,
    pub file_path: PathBuf,
    pub warnings: Vec<ValidationWarning>,
    pub correlation_id: String,
}

/// The strategy intelligence pipeline.
///
/// Components are constructed once, top-down; sub-components never hold a
/// reference back to the coordinator.
pub struct Pipeline {
    validator: CsvValidator,
    analyzer: KeywordAnalyzer,
    generator: Arc<dyn CandidateGenerator>,
    store: Arc<StrategyStore>,
}

impl Pipeline {
    pub fn new(
        validator: CsvValidator,
        analyzer: KeywordAnalyzer,
        generator: Arc<dyn CandidateGenerator>,
        store: Arc<StrategyStore>,
    ) -> Self {
        Self {
            validator,
            analyzer,
            generator,
            store,
        }
    }

    pub fn store(&self) -> &Arc<StrategyStore> {
        &self.store
    }

    /// Run the full pipeline for one request with a fresh correlation id.
    pub async fn run(
        &self,
        request: AnalysisRequest,
        cancel: CancellationToken,
    ) -> Result<AnalysisOutcome, PipelineError> {
        self.run_with_correlation(request, cancel, new_correlation_id())
            .await
    }

    /// Run with a caller-supplied correlation id, so adapters can report it
    /// even when the invocation fails.
    pub async fn run_with_correlation(
        &self,
        request: AnalysisRequest,
        cancel: CancellationToken,
        correlation_id: String,
    ) -> Result<AnalysisOutcome, PipelineError> {
        let span = info_span!("pipeline", correlation_id = %correlation_id);
        self.run_inner(request, cancel, correlation_id)
            .instrument(span)
            .await
    }

    #[allow(clippy::too_many_lines)]
    async fn run_inner(
        &self,
        request: AnalysisRequest,
        cancel: CancellationToken,
        correlation_id: String,
    ) -> Result<AnalysisOutcome, PipelineError> {
        let started = Instant::now();
        let mut stats = PipelineStats::default();

        // The brief is untrusted text too.
        self.validator.check_free_text("goal", &request.brief.goal)?;
        self.validator
            .check_free_text("audience", &request.brief.audience)?;

        // Creator input. Fatal on failure.
        let step = Instant::now();
        let creator_table = self.validator.validate(&request.creator)?;
        let warnings = creator_table.warnings;
        let fingerprint = input_fingerprint(&creator_table.rows);
        stats.record_step("validate", elapsed_ms(step));
        info!(
            rows = creator_table.rows.len(),
            fingerprint = %fingerprint,
            "creator input validated"
        );
        ensure_live(&cancel)?;

        // Competitor inputs: individually skippable.
        let step = Instant::now();
        let mut competitor_bundles: Vec<KeywordBundle> = Vec::new();
        for (index, source) in request.competitors.iter().enumerate() {
            match self.validator.validate(source) {
                Ok(table) => {
                    let language = detect_language(&table.rows);
                    competitor_bundles.push(KeywordBundle {
                        keywords: mine_keywords(&table.rows, language),
                        suggestions: std::collections::BTreeSet::new(),
                        trends: std::collections::BTreeMap::new(),
                        language,
                    });
                }
                Err(err) => {
                    warn!(competitor = index, source = %source.describe(), error = %err, "competitor input skipped");
                    stats.mark_degraded(format!("competitor:{index}"));
                }
            }
            ensure_live(&cancel)?;
        }
        stats.record_step("competitors", elapsed_ms(step));

        // Keyword mining plus best-effort enrichment.
        let step = Instant::now();
        let analysis = self
            .analyzer
            .analyze(&creator_table.rows, request.brief.language_hint.as_deref())
            .await;
        if analysis.enrichment_degraded {
            stats.mark_degraded("keywords.enrichment");
        }
        let keywords = analysis.bundle;
        stats.record_step("keywords", elapsed_ms(step));
        ensure_live(&cancel)?;

        // Gaps only exist relative to competitors.
        let step = Instant::now();
        let gaps = if competitor_bundles.is_empty() {
            None
        } else {
            Some(GapDetector::detect(&keywords, &competitor_bundles))
        };
        stats.record_step("gaps", elapsed_ms(step));
        ensure_live(&cancel)?;

        // Deterministic prompt.
        let step = Instant::now();
        let empty_gaps = GapBundle::default();
        let prompt = PromptBuilder::build(
            &request.brief,
            &keywords,
            gaps.as_ref().unwrap_or(&empty_gaps),
        );
        stats.record_step("prompt", elapsed_ms(step));
        ensure_live(&cancel)?;

        // Generation, falling back deterministically on any failure.
        let step = Instant::now();
        let candidates = match self.generator.generate(&prompt, &cancel).await {
            Ok(set) => set,
            Err(GenerationError::Cancelled) => return Err(PipelineError::Cancelled),
            Err(err) => {
                warn!(error = %err, "generation degraded to fallback");
                stats.mark_degraded(err.degraded_label());
                fallback::candidate_set(&request.brief, &keywords)
            }
        };
        stats.record_step("generate", elapsed_ms(step));
        ensure_live(&cancel)?;

        // Pure re-ranking. If a degenerate generation left nothing
        // rankable, the fallback set restores the >= 1 title guarantee.
        let step = Instant::now();
        let mut outcome = EmotionOptimizer::rerank(candidates, request.brief.tone);
        if outcome.candidates.titles.is_empty() {
            stats.mark_degraded("llm");
            outcome = EmotionOptimizer::rerank(
                fallback::candidate_set(&request.brief, &keywords),
                request.brief.tone,
            );
        }
        stats.record_step("rerank", elapsed_ms(step));
        ensure_live(&cancel)?;

        stats.duration_ms = elapsed_ms(started);

        let strategy = Strategy {
            id: String::new(), // assigned by the store
            created_at: Utc::now(),
            brief: request.brief.clone(),
            input_fingerprint: fingerprint,
            keywords,
            gaps,
            candidates: outcome.candidates,
            psychological_metadata: PsychologicalMetadata {
                tone: request.brief.tone,
                triggers_applied: trigger_ids(request.brief.tone),
                rerank_deltas: outcome.deltas,
            },
            pipeline: stats,
            version: STRATEGY_VERSION,
        };

        debug_assert!(strategy.candidates.invariants_hold());

        // Atomic persistence. Fatal on failure.
        let (strategy, file_path) = self.store.put(strategy, &correlation_id).await?;
        info!(
            id = %strategy.id,
            path = %file_path.display(),
            degraded = ?strategy.pipeline.degraded_steps,
            duration_ms = strategy.pipeline.duration_ms,
            "strategy persisted"
        );

        Ok(AnalysisOutcome {
            strategy,
            file_path,
            warnings,
            correlation_id,
        })
    }
}

/// Stable 16-hex hash of the sorted, normalized creator rows. Identical
/// inputs yield identical fingerprints regardless of row order.
pub fn input_fingerprint(rows: &[CreatorRow]) -> String {
    let mut canonical: Vec<String> = rows.iter().map(CreatorRow::canonical_string).collect();
    canonical.sort_unstable();

    let mut hasher = Sha256::new();
    for line in &canonical {
        hasher.update(line.as_bytes());
        hasher.update([0x1e]);
    }
    hex::encode(&hasher.finalize()[..8])
}

/// Mint a fresh 16-hex correlation id.
pub fn new_correlation_id() -> String {
    Uuid::new_v4().simple().to_string()[..16].to_string()
}

fn ensure_live(cancel: &CancellationToken) -> Result<(), PipelineError> {
    if cancel.is_cancelled() {
        Err(PipelineError::Cancelled)
    } else {
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation)]
fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}
