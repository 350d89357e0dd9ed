//! Tone-aware re-ranking and shaping of candidate output.
//!
//! Pure and deterministic: scoring is a fixed function of static lexicons,
//! digit presence, power words, and banned phrases. The optimizer never
//! calls the network.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::domain::models::{CandidateSet, Tone};

/// Title length bounds after normalization.
const TITLE_MIN_CHARS: usize = 30;
const TITLE_MAX_CHARS: usize = 80;

/// Minimum surviving titles before out-of-range ones are clamped instead of
/// dropped.
const MIN_TITLES_BEFORE_CLAMP: usize = 5;

/// Maximum words in a thumbnail line.
const THUMBNAIL_MAX_WORDS: usize = 4;

static MARKDOWN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[*_~`#>\[\]()]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").unwrap());

const CURIOSITY_LEXICON: &[&str] = &[
    "secret", "hidden", "nobody", "surprising", "truth", "revealed", "why", "actually", "behind",
];
const AUTHORITY_LEXICON: &[&str] = &[
    "complete", "definitive", "proven", "guide", "masterclass", "expert", "professional", "step",
];
const FEAR_LEXICON: &[&str] = &[
    "mistake", "avoid", "warning", "stop", "wrong", "dangerous", "losing", "before",
];
const PERSUASIVE_LEXICON: &[&str] = &[
    "should", "need", "must", "everyone", "start", "today", "better", "works",
];
const ENGAGING_LEXICON: &[&str] = &[
    "you", "your", "watch", "build", "create", "together", "real", "live",
];

const POWER_WORDS: &[&str] = &[
    "free", "instant", "ultimate", "essential", "powerful", "simple", "fast", "easy",
];

const BANNED_PHRASES: &[&str] = &[
    "you won't believe",
    "gone wrong",
    "not clickbait",
    "(shocking)",
    "100% working",
];

fn lexicon_for(tone: Tone) -> &'static [&'static str] {
    match tone {
        Tone::Curiosity => CURIOSITY_LEXICON,
        Tone::Authority => AUTHORITY_LEXICON,
        Tone::Fear => FEAR_LEXICON,
        Tone::Persuasive => PERSUASIVE_LEXICON,
        Tone::Engaging => ENGAGING_LEXICON,
    }
}

/// Result of re-ranking: the shaped set plus observability deltas.
#[derive(Debug)]
pub struct RerankOutcome {
    pub candidates: CandidateSet,
    /// `deltas[i] = new_index_of(original_title_i) - i` over the surviving,
    /// normalized titles.
    pub deltas: Vec<i64>,
}

pub struct EmotionOptimizer;

impl EmotionOptimizer {
    /// Normalize, score, and reorder a candidate set for the given tone.
    pub fn rerank(candidates: CandidateSet, tone: Tone) -> RerankOutcome {
        let normalized: Vec<String> = candidates
            .titles
            .iter()
            .map(|t| normalize_title(t))
            .filter(|t| !t.is_empty())
            .collect();

        let in_range: Vec<&String> = normalized
            .iter()
            .filter(|t| {
                let len = t.chars().count();
                (TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&len)
            })
            .collect();

        // Out-of-range titles are dropped only while enough remain;
        // otherwise they are clamped into range.
        let titles: Vec<String> = if in_range.len() >= MIN_TITLES_BEFORE_CLAMP {
            in_range.into_iter().cloned().collect()
        } else {
            normalized.iter().map(|t| clamp_title(t)).collect()
        };

        let mut indexed: Vec<(usize, String, i64)> = titles
            .into_iter()
            .enumerate()
            .map(|(i, title)| {
                let score = score_title(&title, tone);
                (i, title, score)
            })
            .collect();

        // Stable by construction: ties keep original order.
        indexed.sort_by(|a, b| b.2.cmp(&a.2));

        let mut deltas = vec![0i64; indexed.len()];
        for (new_index, (original_index, _, _)) in indexed.iter().enumerate() {
            #[allow(clippy::cast_possible_wrap)]
            {
                deltas[*original_index] = new_index as i64 - *original_index as i64;
            }
        }

        let titles: Vec<String> = indexed.into_iter().map(|(_, title, _)| title).collect();

        let thumbnail_lines: Vec<String> = candidates
            .thumbnail_lines
            .iter()
            .map(|line| normalize_thumbnail_line(line))
            .filter(|line| !line.is_empty())
            .take(CandidateSet::MAX_THUMBNAIL_LINES)
            .collect();

        let tags: BTreeSet<String> = candidates
            .tags
            .iter()
            .map(|tag| normalize_tag(tag))
            .filter(|tag| !tag.is_empty() && tag.chars().count() <= 30)
            .take(CandidateSet::MAX_TAGS)
            .collect();

        RerankOutcome {
            candidates: CandidateSet {
                titles,
                descriptions: candidates.descriptions,
                tags,
                thumbnail_lines,
                source: candidates.source,
                confidence: candidates.confidence,
            },
            deltas,
        }
    }
}

/// Strip markdown punctuation and collapse whitespace.
fn normalize_title(title: &str) -> String {
    let stripped = MARKDOWN.replace_all(title, "");
    WHITESPACE.replace_all(stripped.trim(), " ").to_string()
}

/// Tone-neutral filler appended to bring short titles up to the floor.
const TITLE_PAD_WORDS: &[&str] = &["Explained", "Step", "by", "Step", "in", "Practice"];

/// Force a normalized title into the length range. Overlong titles are cut
/// at the ceiling; short ones are padded with deterministic filler words
/// until they reach the floor.
fn clamp_title(title: &str) -> String {
    if title.chars().count() > TITLE_MAX_CHARS {
        let cut: String = title.chars().take(TITLE_MAX_CHARS).collect();
        return cut.trim_end().to_string();
    }

    let mut padded = title.to_string();
    let mut next_word = 0;
    while padded.chars().count() < TITLE_MIN_CHARS {
        padded.push(' ');
        padded.push_str(TITLE_PAD_WORDS[next_word % TITLE_PAD_WORDS.len()]);
        next_word += 1;
    }
    padded
}

/// Deterministic tone score: lexicon hits, a digit, a power word, minus
/// banned phrases.
fn score_title(title: &str, tone: Tone) -> i64 {
    let lower = title.to_lowercase();
    let mut score = 0i64;

    for word in lexicon_for(tone) {
        if lower.contains(word) {
            score += 2;
        }
    }
    if DIGIT.is_match(&lower) {
        score += 1;
    }
    if POWER_WORDS.iter().any(|w| lower.contains(w)) {
        score += 1;
    }
    if BANNED_PHRASES.iter().any(|p| lower.contains(p)) {
        score -= 3;
    }

    score
}

/// At most four words, uppercased.
fn normalize_thumbnail_line(line: &str) -> String {
    line.split_whitespace()
        .take(THUMBNAIL_MAX_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Lowercase, punctuation stripped except internal hyphens.
fn normalize_tag(tag: &str) -> String {
    let lower = tag.trim().to_lowercase();
    let kept: String = lower
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || c.is_whitespace())
        .collect();
    kept.trim_matches('-').trim().replace(char::is_whitespace, " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::CandidateSource;

    fn set(titles: &[&str]) -> CandidateSet {
        CandidateSet {
            titles: titles.iter().map(ToString::to_string).collect(),
            descriptions: vec![],
            tags: BTreeSet::new(),
            thumbnail_lines: vec![],
            source: CandidateSource::Llm,
            confidence: 0.9,
        }
    }

    #[test]
    fn markdown_is_stripped_and_whitespace_collapsed() {
        assert_eq!(
            normalize_title("**Complete   Python** _Guide_"),
            "Complete Python Guide"
        );
    }

    #[test]
    fn eighty_char_title_is_kept_eighty_one_is_dropped() {
        let t80 = "x".repeat(80);
        let t81 = "x".repeat(81);
        let keepers: Vec<String> = (0..5)
            .map(|i| format!("A Perfectly Reasonable Title Number {i} Here"))
            .collect();
        let mut titles: Vec<&str> = keepers.iter().map(String::as_str).collect();
        titles.push(&t80);
        titles.push(&t81);

        let outcome = EmotionOptimizer::rerank(set(&titles), Tone::Engaging);
        assert!(outcome.candidates.titles.contains(&t80));
        assert!(!outcome.candidates.titles.contains(&t81));
    }

    #[test]
    fn out_of_range_titles_are_clamped_when_too_few_remain() {
        let long = "y".repeat(120);
        let outcome = EmotionOptimizer::rerank(set(&["Short", &long]), Tone::Engaging);
        // Fewer than five in-range titles: everything is clamped into the
        // window from both directions, not dropped.
        assert_eq!(outcome.candidates.titles.len(), 2);
        assert!(outcome
            .candidates
            .titles
            .iter()
            .all(|t| (TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&t.chars().count())));
    }

    #[test]
    fn short_title_padding_is_deterministic_and_in_range() {
        let a = clamp_title("Short");
        let b = clamp_title("Short");
        assert_eq!(a, b);
        assert!(a.starts_with("Short "));
        assert!((TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&a.chars().count()));

        // A single-character title still reaches the floor.
        let tiny = clamp_title("A");
        assert!((TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&tiny.chars().count()));
    }

    #[test]
    fn tone_lexicon_hits_rise_to_the_top() {
        let plain = "A Thorough Walkthrough of Python Internals Today";
        let authority = "The Complete Proven Guide to Python Mastery";
        let outcome = EmotionOptimizer::rerank(set(&[plain, authority]), Tone::Authority);
        assert_eq!(outcome.candidates.titles[0], authority);
        // The moved title records its displacement.
        assert_eq!(outcome.deltas, vec![1, -1]);
    }

    #[test]
    fn ties_preserve_original_order() {
        let a = "Writing Rust Services the Plain Boring Way";
        let b = "Shipping Go Services the Plain Boring Way";
        let outcome = EmotionOptimizer::rerank(set(&[a, b]), Tone::Curiosity);
        assert_eq!(outcome.candidates.titles, vec![a.to_string(), b.to_string()]);
        assert_eq!(outcome.deltas, vec![0, 0]);
    }

    #[test]
    fn banned_phrases_sink_titles() {
        let honest = "A Measured Look at Python Performance Today";
        let bait = "You Won't Believe This Python Trick Gone Wrong";
        let outcome = EmotionOptimizer::rerank(set(&[bait, honest]), Tone::Curiosity);
        assert_eq!(outcome.candidates.titles[0], honest);
    }

    #[test]
    fn thumbnail_lines_are_capped_and_uppercased() {
        let mut candidates = set(&["A Reasonable Length Title for Testing Here"]);
        candidates.thumbnail_lines = vec![
            "learn python fast today really".to_string(),
            "  ".to_string(),
            "big results".to_string(),
        ];
        let outcome = EmotionOptimizer::rerank(candidates, Tone::Engaging);
        assert_eq!(
            outcome.candidates.thumbnail_lines,
            vec!["LEARN PYTHON FAST TODAY".to_string(), "BIG RESULTS".to_string()]
        );
    }

    #[test]
    fn tags_are_normalized_and_deduplicated() {
        let mut candidates = set(&["A Reasonable Length Title for Testing Here"]);
        candidates.tags = ["Python!", "python", "machine-learning", "c++"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let outcome = EmotionOptimizer::rerank(candidates, Tone::Engaging);
        assert!(outcome.candidates.tags.contains("python"));
        assert!(outcome.candidates.tags.contains("machine-learning"));
        assert!(outcome.candidates.tags.contains("c"));
        assert_eq!(outcome.candidates.tags.iter().filter(|t| t.contains("python")).count(), 1);
    }

    #[test]
    fn rerank_is_deterministic() {
        let titles = [
            "The Complete Proven Guide to Python Mastery",
            "Secret Python Features Nobody Talks About Yet",
            "Seven Mistakes to Avoid When Learning Python",
        ];
        let a = EmotionOptimizer::rerank(set(&titles), Tone::Fear);
        let b = EmotionOptimizer::rerank(set(&titles), Tone::Fear);
        assert_eq!(a.candidates, b.candidates);
        assert_eq!(a.deltas, b.deltas);
    }
}
