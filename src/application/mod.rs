//! Application layer: orchestration of the pipeline stages.

pub mod pipeline;

pub use pipeline::{AnalysisOutcome, AnalysisRequest, Pipeline};
