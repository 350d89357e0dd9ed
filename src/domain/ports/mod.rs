//! Port traits decoupling the pipeline from external backends.

pub mod enrichment;
pub mod generator;

pub use enrichment::{
    NullSuggestionProvider, NullTrendProvider, ProviderError, SuggestionProvider, TrendProvider,
};
pub use generator::{CandidateGenerator, GenerationError};
