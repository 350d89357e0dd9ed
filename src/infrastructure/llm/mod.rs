//! Text-generation client: sanitization, timeout, retry, schema coercion.

pub mod client;
pub mod error;
pub mod retry;
pub mod schema;

pub use client::HttpCandidateGenerator;
pub use error::LlmApiError;
pub use retry::RetryPolicy;
pub use schema::LLM_CONFIDENCE;
