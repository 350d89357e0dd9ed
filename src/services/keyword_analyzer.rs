//! Keyword mining and best-effort enrichment.
//!
//! The mining half is pure and deterministic: tokenize titles, detect the
//! dominant language, drop stop words, rank by frequency. The enrichment
//! half fans out to the autocomplete and trends providers under one shared
//! deadline; any miss degrades the bundle instead of failing the run.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use std::sync::LazyLock;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::models::config::EnrichmentConfig;
use crate::domain::models::{CreatorRow, KeywordBundle, KeywordEntry, Language, TrendSignal};
use crate::domain::ports::{SuggestionProvider, TrendProvider};

/// How many ranked terms a bundle retains.
const MAX_KEYWORDS: usize = 50;

/// Minimum token length (in chars) worth keeping.
const MIN_TOKEN_CHARS: usize = 3;

/// Share of meaningful characters one script must exceed to win detection.
const LANGUAGE_DOMINANCE: f64 = 0.6;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+").unwrap());

const EN_STOP_WORDS: &[&str] = &[
    "the", "and", "for", "you", "your", "with", "this", "that", "how", "what", "why", "when",
    "where", "who", "are", "was", "were", "will", "can", "could", "should", "would", "have",
    "has", "had", "not", "but", "all", "any", "out", "get", "got", "make", "made", "from",
    "into", "about", "after", "before", "over", "under", "more", "most", "best", "top", "new",
    "now", "our", "their", "them", "they", "his", "her", "its", "than", "then", "these",
    "those", "very", "just", "only", "also", "too",
];

const BN_STOP_WORDS: &[&str] = &[
    "এবং", "কিন্তু", "যে", "এই", "ওই", "সেই", "একটি", "একটা", "আমি", "আমরা", "তুমি",
    "আপনি", "তারা", "কি", "কী", "কেন", "কিভাবে", "হয়", "হবে", "ছিল", "থেকে", "জন্য",
    "সাথে", "করে", "করা", "নিয়ে",
];

/// Outcome of analysis: the bundle plus whether enrichment degraded.
#[derive(Debug)]
pub struct KeywordAnalysis {
    pub bundle: KeywordBundle,
    pub enrichment_degraded: bool,
}

/// Mines keywords from validated rows and enriches the top terms.
pub struct KeywordAnalyzer {
    suggestions: Arc<dyn SuggestionProvider>,
    trends: Arc<dyn TrendProvider>,
    config: EnrichmentConfig,
}

impl KeywordAnalyzer {
    pub fn new(
        suggestions: Arc<dyn SuggestionProvider>,
        trends: Arc<dyn TrendProvider>,
        config: EnrichmentConfig,
    ) -> Self {
        Self {
            suggestions,
            trends,
            config,
        }
    }

    /// Mine and enrich. Mining alone never fails; enrichment misses are
    /// reported through `enrichment_degraded`.
    pub async fn analyze(
        &self,
        rows: &[CreatorRow],
        language_hint: Option<&str>,
    ) -> KeywordAnalysis {
        let language = resolve_language(rows, language_hint);
        let keywords = mine_keywords(rows, language);

        let mut bundle = KeywordBundle {
            keywords,
            suggestions: std::collections::BTreeSet::new(),
            trends: BTreeMap::new(),
            language,
        };

        let top: Vec<String> = bundle
            .top_terms(self.config.top_terms)
            .into_iter()
            .map(ToString::to_string)
            .collect();

        if top.is_empty() {
            return KeywordAnalysis {
                bundle,
                enrichment_degraded: false,
            };
        }

        let enrichment_degraded = self.enrich(&mut bundle, &top).await;
        KeywordAnalysis {
            bundle,
            enrichment_degraded,
        }
    }

    /// Fan out one autocomplete and one trends lookup per term, all under a
    /// single wall-clock deadline. Returns true when anything was missed.
    async fn enrich(&self, bundle: &mut KeywordBundle, terms: &[String]) -> bool {
        enum Enriched {
            Suggestions(Vec<String>),
            Trend(String, TrendSignal),
            Miss,
        }

        let deadline = Instant::now() + Duration::from_secs(self.config.total_deadline_s);
        let language = bundle.language;
        let mut tasks: JoinSet<Enriched> = JoinSet::new();

        for term in terms {
            let provider = Arc::clone(&self.suggestions);
            let term_owned = term.clone();
            tasks.spawn(async move {
                match provider.suggest(&term_owned, language).await {
                    Ok(suggestions) => Enriched::Suggestions(suggestions),
                    Err(_) => Enriched::Miss,
                }
            });

            let provider = Arc::clone(&self.trends);
            let term_owned = term.clone();
            tasks.spawn(async move {
                match provider.interest(&term_owned).await {
                    Ok(signal) => Enriched::Trend(term_owned, signal),
                    Err(_) => Enriched::Miss,
                }
            });
        }

        let expected = terms.len() * 2;
        let mut completed = 0usize;
        let mut degraded = false;

        while completed < expected {
            let next = tokio::time::timeout_at(deadline, tasks.join_next()).await;
            match next {
                Ok(Some(Ok(Enriched::Suggestions(suggestions)))) => {
                    completed += 1;
                    for suggestion in suggestions {
                        let cleaned = suggestion.trim().to_lowercase();
                        if !cleaned.is_empty() {
                            bundle.suggestions.insert(cleaned);
                        }
                    }
                }
                Ok(Some(Ok(Enriched::Trend(term, signal)))) => {
                    completed += 1;
                    bundle.trends.insert(term, signal);
                }
                Ok(Some(Ok(Enriched::Miss))) | Ok(Some(Err(_))) => {
                    completed += 1;
                    degraded = true;
                }
                Ok(None) => break,
                Err(_) => {
                    // Deadline hit; whatever is still in flight is abandoned.
                    debug!(
                        outstanding = expected - completed,
                        "enrichment deadline reached"
                    );
                    tasks.abort_all();
                    degraded = true;
                    break;
                }
            }
        }

        degraded
    }
}

/// Detect the dominant language, honoring an explicit hint first.
fn resolve_language(rows: &[CreatorRow], hint: Option<&str>) -> Language {
    match hint.map(str::trim).map(str::to_lowercase).as_deref() {
        Some("en") => Language::En,
        Some("bn") => Language::Bn,
        _ => detect_language(rows),
    }
}

/// Character-class ratio detection over all titles.
///
/// The denominator is guarded: with no meaningful characters at all the
/// answer is `en`, without dividing.
pub fn detect_language(rows: &[CreatorRow]) -> Language {
    let mut bengali = 0usize;
    let mut latin = 0usize;

    for row in rows {
        for c in row.title.chars() {
            if ('\u{0980}'..='\u{09FF}').contains(&c) {
                bengali += 1;
            } else if c.is_alphabetic() && c.is_ascii() {
                latin += 1;
            }
        }
    }

    let meaningful = bengali + latin;
    if meaningful == 0 {
        return Language::En;
    }

    #[allow(clippy::cast_precision_loss)]
    let share = |count: usize| count as f64 / meaningful as f64;
    if share(bengali) > LANGUAGE_DOMINANCE {
        Language::Bn
    } else if share(latin) > LANGUAGE_DOMINANCE {
        Language::En
    } else {
        Language::Other
    }
}

/// Tokenize, filter, count, and rank. Deterministic for a given input.
pub fn mine_keywords(rows: &[CreatorRow], language: Language) -> Vec<KeywordEntry> {
    let stop_words: &[&str] = match language {
        Language::Bn => BN_STOP_WORDS,
        Language::En | Language::Other => EN_STOP_WORDS,
    };

    let mut counts: BTreeMap<String, (u32, Vec<usize>)> = BTreeMap::new();

    for (row_index, row) in rows.iter().enumerate() {
        for token_match in TOKEN.find_iter(&row.title) {
            let raw = token_match.as_str();
            let token = if raw.chars().any(|c| ('\u{0980}'..='\u{09FF}').contains(&c)) {
                raw.to_string()
            } else {
                raw.to_lowercase()
            };

            if token.chars().count() < MIN_TOKEN_CHARS {
                continue;
            }
            if stop_words.contains(&token.as_str()) {
                continue;
            }

            let entry = counts.entry(token).or_insert((0, Vec::new()));
            entry.0 += 1;
            if entry.1.last() != Some(&row_index) {
                entry.1.push(row_index);
            }
        }
    }

    let mut entries: Vec<KeywordEntry> = counts
        .into_iter()
        .map(|(term, (frequency, source_rows))| KeywordEntry {
            term,
            frequency,
            source_rows,
        })
        .collect();

    // Frequency descending, lexicographic tie-break (already lexicographic
    // from the BTreeMap, and the sort is stable).
    entries.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    entries.truncate(MAX_KEYWORDS);
    entries
}
