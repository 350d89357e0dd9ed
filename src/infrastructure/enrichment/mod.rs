//! Best-effort enrichment providers (autocomplete, trends) with bounded
//! memoization.

pub mod autocomplete;
pub mod cache;
pub mod trends;

pub use autocomplete::HttpSuggestionProvider;
pub use cache::ProviderCache;
pub use trends::HttpTrendProvider;
