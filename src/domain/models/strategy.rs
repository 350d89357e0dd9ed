use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::brief::{Brief, Tone};
use super::candidate::{CandidateSet, CandidateSource};
use super::gap::GapBundle;
use super::keyword::KeywordBundle;

/// Current on-disk strategy record version.
pub const STRATEGY_VERSION: u32 = 1;

/// The complete persisted artifact of one pipeline run.
///
/// Strategies are immutable once persisted; corrections are new records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    /// Opaque 8-hex identifier, unique within the store.
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub brief: Brief,
    /// 16-hex stable hash of the sorted, normalized creator rows.
    pub input_fingerprint: String,
    pub keywords: KeywordBundle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gaps: Option<GapBundle>,
    pub candidates: CandidateSet,
    pub psychological_metadata: PsychologicalMetadata,
    pub pipeline: PipelineStats,
    pub version: u32,
}

/// Which psychological levers were applied, and how re-ranking moved titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsychologicalMetadata {
    pub tone: Tone,
    /// Ids of the trigger templates injected into the prompt.
    pub triggers_applied: Vec<String>,
    /// Per-title displacement introduced by the emotion optimizer:
    /// `rerank_deltas[i] = new_index_of(original_title_i) - i`.
    pub rerank_deltas: Vec<i64>,
}

/// Timing and degradation record for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub duration_ms: u64,
    /// Wall-clock per step, keyed by step name.
    pub step_timings_ms: BTreeMap<String, u64>,
    /// Steps that completed on partial or fallback data.
    pub degraded_steps: Vec<String>,
}

impl PipelineStats {
    pub fn record_step(&mut self, step: &str, elapsed_ms: u64) {
        self.step_timings_ms.insert(step.to_string(), elapsed_ms);
    }

    pub fn mark_degraded(&mut self, step: impl Into<String>) {
        let step = step.into();
        if !self.degraded_steps.contains(&step) {
            self.degraded_steps.push(step);
        }
    }
}

/// Lightweight listing row kept in the store's side index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategySummary {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub goal: String,
    pub tone: Tone,
    pub input_fingerprint: String,
    /// Path of the full record, relative to the store root.
    pub path: String,
    /// Top mined terms, carried so text search never opens payload files.
    #[serde(default)]
    pub top_keywords: Vec<String>,
}

impl Strategy {
    /// Build the index summary for this strategy.
    pub fn summary(&self, path: impl Into<String>) -> StrategySummary {
        StrategySummary {
            id: self.id.clone(),
            created_at: self.created_at,
            goal: self.brief.goal.clone(),
            tone: self.brief.tone,
            input_fingerprint: self.input_fingerprint.clone(),
            path: path.into(),
            top_keywords: self
                .keywords
                .top_terms(10)
                .into_iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Whether this run produced fallback candidates.
    pub fn is_fallback(&self) -> bool {
        self.candidates.source == CandidateSource::Fallback
    }
}
