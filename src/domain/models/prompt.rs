use serde::{Deserialize, Serialize};

use super::brief::Tone;

/// A fully rendered LLM prompt plus the metadata describing how it was built.
///
/// Given identical inputs the rendered bytes are identical, which allows
/// upstream caching and reproducible strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub text: String,
    pub metadata: PromptMetadata,
}

/// How a prompt was composed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMetadata {
    pub tone: Tone,
    /// Version of the static template registry the trigger block came from.
    pub template_version: u32,
    /// Keywords that survived the length cap, in ranked order.
    pub included_keywords: Vec<String>,
    /// Gap topics that survived the length cap, in ranked order.
    pub included_gaps: Vec<String>,
    /// Ids of the trigger templates applied for the selected tone.
    pub examples_used: Vec<String>,
}

impl Prompt {
    /// Rendered length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
