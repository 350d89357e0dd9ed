//! Domain models for the strategy pipeline.

pub mod brief;
pub mod candidate;
pub mod config;
pub mod gap;
pub mod keyword;
pub mod prompt;
pub mod row;
pub mod strategy;

pub use brief::{Brief, Tone};
pub use candidate::{CandidateSet, CandidateSource};
pub use config::{Config, EnrichmentConfig, LimitsConfig, LlmConfig, LoggingConfig, ServerConfig};
pub use gap::{Gap, GapBundle};
pub use keyword::{KeywordBundle, KeywordEntry, Language, TrendSignal};
pub use prompt::{Prompt, PromptMetadata};
pub use row::{CreatorRow, ValidationWarning};
pub use strategy::{
    PipelineStats, PsychologicalMetadata, Strategy, StrategySummary, STRATEGY_VERSION,
};
