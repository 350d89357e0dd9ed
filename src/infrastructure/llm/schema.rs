//! Output-schema enforcement for generation responses.

use serde::Deserialize;
use std::collections::BTreeSet;

use crate::domain::models::{CandidateSet, CandidateSource};

/// Confidence reported for schema-conforming model output.
pub const LLM_CONFIDENCE: f64 = 0.9;

/// The JSON shape the prompt instructs the model to return.
#[derive(Debug, Deserialize)]
pub struct RawCandidatePayload {
    #[serde(default)]
    pub titles: Vec<String>,
    #[serde(default)]
    pub descriptions: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub thumbnail_lines: Vec<String>,
}

/// Coerce a raw payload into a shape-conforming candidate set.
///
/// Lists are trimmed, bounded, and filtered; a payload that yields zero
/// usable titles is a schema violation, not an empty success.
pub fn coerce(raw: RawCandidatePayload) -> Result<CandidateSet, String> {
    let titles: Vec<String> = raw
        .titles
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .take(CandidateSet::MAX_TITLES)
        .collect();

    if titles.is_empty() {
        return Err("payload contained no usable titles".to_string());
    }

    let descriptions: Vec<String> = raw
        .descriptions
        .iter()
        .map(|d| d.trim().to_string())
        .filter(|d| (150..=400).contains(&d.chars().count()))
        .take(CandidateSet::MAX_DESCRIPTIONS)
        .collect();

    let tags: BTreeSet<String> = raw
        .tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty() && t.chars().count() <= 30)
        .take(CandidateSet::MAX_TAGS)
        .collect();

    let thumbnail_lines: Vec<String> = raw
        .thumbnail_lines
        .iter()
        .map(|l| {
            l.split_whitespace()
                .take(4)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|l| !l.is_empty())
        .take(CandidateSet::MAX_THUMBNAIL_LINES)
        .collect();

    Ok(CandidateSet {
        titles,
        descriptions,
        tags,
        thumbnail_lines,
        source: CandidateSource::Llm,
        confidence: LLM_CONFIDENCE,
    })
}
