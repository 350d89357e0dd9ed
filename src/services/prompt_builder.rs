//! Deterministic prompt composition.
//!
//! The prompt is assembled from a fixed preamble, the tone's trigger block,
//! a compact rendering of mined keywords and detected gaps, the brief, and a
//! strict output-schema instruction. Identical inputs produce identical
//! bytes. Every free-text input is sanitized before inclusion.

use crate::domain::models::{Brief, GapBundle, KeywordBundle, Language, Prompt, PromptMetadata};
use crate::services::sanitizer::{sanitize_prompt, MAX_PROMPT_CHARS};
use crate::services::triggers::{trigger_ids, triggers_for, TEMPLATE_VERSION};

/// Keywords initially offered to the prompt.
const MAX_KEYWORDS_IN_PROMPT: usize = 15;

/// Gaps initially offered to the prompt.
const MAX_GAPS_IN_PROMPT: usize = 8;

const SYSTEM_PREAMBLE: &str = "You are a video strategy specialist. Using the creator's \
performance signals below, produce optimized metadata for their next upload. Ground every \
suggestion in the supplied keywords and gaps; do not invent topics the data does not support.";

pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the prompt. Keywords, then gaps, are truncated until the
    /// rendered text fits the prompt length cap.
    pub fn build(brief: &Brief, keywords: &KeywordBundle, gaps: &GapBundle) -> Prompt {
        let goal = sanitize_prompt(&brief.goal);
        let audience = sanitize_prompt(&brief.audience);
        let language = example_language(brief, keywords);

        let all_keywords: Vec<String> = keywords
            .top_terms(MAX_KEYWORDS_IN_PROMPT)
            .into_iter()
            .map(sanitize_prompt)
            .filter(|k| !k.is_empty())
            .collect();
        let all_gaps: Vec<String> = gaps
            .top_topics(MAX_GAPS_IN_PROMPT)
            .into_iter()
            .map(sanitize_prompt)
            .filter(|g| !g.is_empty())
            .collect();

        let mut keyword_count = all_keywords.len();
        let mut gap_count = all_gaps.len();

        loop {
            let text = render(
                brief,
                &goal,
                &audience,
                language,
                &all_keywords[..keyword_count],
                &all_gaps[..gap_count],
            );

            if text.chars().count() <= MAX_PROMPT_CHARS || (keyword_count == 0 && gap_count == 0) {
                let metadata = PromptMetadata {
                    tone: brief.tone,
                    template_version: TEMPLATE_VERSION,
                    included_keywords: all_keywords[..keyword_count].to_vec(),
                    included_gaps: all_gaps[..gap_count].to_vec(),
                    examples_used: trigger_ids(brief.tone),
                };
                return Prompt { text, metadata };
            }

            // Shed the lowest-ranked keyword first, then the lowest-ranked gap.
            if keyword_count > 0 {
                keyword_count -= 1;
            } else {
                gap_count -= 1;
            }
        }
    }
}

fn example_language(brief: &Brief, keywords: &KeywordBundle) -> Language {
    match brief
        .language_hint
        .as_deref()
        .map(str::trim)
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("en") => Language::En,
        Some("bn") => Language::Bn,
        Some(_) => Language::Other,
        None => keywords.language,
    }
}

fn render(
    brief: &Brief,
    goal: &str,
    audience: &str,
    language: Language,
    keywords: &[String],
    gaps: &[String],
) -> String {
    let mut out = String::with_capacity(2048);

    out.push_str(SYSTEM_PREAMBLE);
    out.push_str("\n\n");

    out.push_str(&format!("## Psychological levers (tone: {})\n", brief.tone));
    for trigger in triggers_for(brief.tone) {
        out.push_str(&format!("- [{}] {}\n", trigger.id, trigger.instruction));
    }
    out.push('\n');

    out.push_str("## Performance signals\n");
    if keywords.is_empty() {
        out.push_str("Top keywords: (none mined)\n");
    } else {
        out.push_str(&format!("Top keywords: {}\n", keywords.join(", ")));
    }
    if !gaps.is_empty() {
        out.push_str(&format!("Uncovered topics vs competitors: {}\n", gaps.join(", ")));
    }
    out.push('\n');

    out.push_str("## Brief\n");
    out.push_str(&format!("Goal: {goal}\n"));
    out.push_str(&format!("Audience: {audience}\n"));
    out.push_str(&format!("Write titles and examples in language: {language}\n\n"));

    out.push_str(
        "## Output format\nRespond with JSON only, no prose, exactly this shape:\n\
         {\"titles\": [up to 10 strings of 30-80 chars], \
         \"descriptions\": [up to 5 strings of 150-400 chars], \
         \"tags\": [up to 25 lowercase strings], \
         \"thumbnail_lines\": [up to 5 strings of 1-4 words]}",
    );

    out
}
