//! Vidstrat: local-first strategy assistant for video creators.
//!
//! Given a spreadsheet of past video performance and a creative brief, the
//! pipeline produces a ranked strategy artifact: optimized titles,
//! descriptions, tags, thumbnail text lines, a competitor gap analysis, and
//! an append-only historical record on local disk.
//!
//! - Keyword mining with best-effort autocomplete/trends enrichment
//! - Content-gap detection against competitor CSVs
//! - Deterministic prompt construction with tone-keyed trigger templates
//! - LLM invocation with sanitization, retry, and a deterministic fallback
//! - Emotion-biased re-ranking of candidates
//! - Atomic, timestamped strategy persistence

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod server;
pub mod services;
