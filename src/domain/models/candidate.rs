use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Where a candidate set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateSource {
    Llm,
    Fallback,
}

impl std::fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Llm => write!(f, "llm"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// The structured output of the generation step after schema validation.
///
/// Shape constraints: at most 10 titles (never zero; the fallback path
/// guarantees at least one), at most 5 descriptions of 150..400 chars, at
/// most 25 lowercase tags of 1..30 chars, at most 5 thumbnail lines of 1..4
/// words. A fallback set never reports confidence above 0.5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSet {
    pub titles: Vec<String>,
    pub descriptions: Vec<String>,
    pub tags: BTreeSet<String>,
    pub thumbnail_lines: Vec<String>,
    pub source: CandidateSource,
    pub confidence: f64,
}

impl CandidateSet {
    /// Maximum number of titles retained.
    pub const MAX_TITLES: usize = 10;
    /// Maximum number of descriptions retained.
    pub const MAX_DESCRIPTIONS: usize = 5;
    /// Maximum number of tags retained.
    pub const MAX_TAGS: usize = 25;
    /// Maximum number of thumbnail lines retained.
    pub const MAX_THUMBNAIL_LINES: usize = 5;

    /// Check the structural invariants of a candidate set.
    pub fn invariants_hold(&self) -> bool {
        !self.titles.is_empty()
            && self.titles.len() <= Self::MAX_TITLES
            && self.descriptions.len() <= Self::MAX_DESCRIPTIONS
            && self
                .descriptions
                .iter()
                .all(|d| (150..=400).contains(&d.chars().count()))
            && self.tags.len() <= Self::MAX_TAGS
            && self
                .tags
                .iter()
                .all(|t| !t.is_empty() && t.chars().count() <= 30 && *t == t.to_lowercase())
            && self.thumbnail_lines.len() <= Self::MAX_THUMBNAIL_LINES
            && self
                .thumbnail_lines
                .iter()
                .all(|l| (1..=4).contains(&l.split_whitespace().count()))
            && (0.0..=1.0).contains(&self.confidence)
            && (self.source != CandidateSource::Fallback || self.confidence <= 0.5)
    }
}
