use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Detected dominant language of the creator's titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Bn,
    Other,
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::En => write!(f, "en"),
            Self::Bn => write!(f, "bn"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// One mined keyword with its frequency and the rows it appeared in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub term: String,
    pub frequency: u32,
    /// Indices into the validated row list where this term occurred.
    pub source_rows: Vec<usize>,
}

/// Interest signal for a term, from the trends provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSignal {
    /// Average interest over the lookback window, 0..=100.
    pub avg_interest: f64,
    /// Peak interest over the lookback window, 0..=100.
    pub peak_interest: f64,
    /// Whether interest is currently climbing.
    pub rising: bool,
}

/// Output of the keyword analysis stage.
///
/// `keywords` is ordered by descending frequency with a lexicographic
/// tie-break; `suggestions` and `trends` use ordered collections so that
/// serialized output is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordBundle {
    pub keywords: Vec<KeywordEntry>,
    pub suggestions: BTreeSet<String>,
    pub trends: BTreeMap<String, TrendSignal>,
    pub language: Language,
}

impl KeywordBundle {
    /// An empty bundle in the given language.
    pub fn empty(language: Language) -> Self {
        Self {
            keywords: Vec::new(),
            suggestions: BTreeSet::new(),
            trends: BTreeMap::new(),
            language,
        }
    }

    /// Frequency of a term, 0 when absent.
    pub fn frequency_of(&self, term: &str) -> u32 {
        self.keywords
            .iter()
            .find(|k| k.term == term)
            .map_or(0, |k| k.frequency)
    }

    /// The top `n` terms in ranked order.
    pub fn top_terms(&self, n: usize) -> Vec<&str> {
        self.keywords
            .iter()
            .take(n)
            .map(|k| k.term.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_of_absent_term_is_zero() {
        let bundle = KeywordBundle::empty(Language::En);
        assert_eq!(bundle.frequency_of("python"), 0);
    }

    #[test]
    fn top_terms_respects_order_and_bound() {
        let bundle = KeywordBundle {
            keywords: vec![
                KeywordEntry {
                    term: "python".to_string(),
                    frequency: 9,
                    source_rows: vec![0],
                },
                KeywordEntry {
                    term: "course".to_string(),
                    frequency: 4,
                    source_rows: vec![1],
                },
            ],
            suggestions: BTreeSet::new(),
            trends: BTreeMap::new(),
            language: Language::En,
        };
        assert_eq!(bundle.top_terms(1), vec!["python"]);
        assert_eq!(bundle.top_terms(10), vec!["python", "course"]);
    }

    #[test]
    fn suggestions_serialize_sorted() {
        let mut bundle = KeywordBundle::empty(Language::En);
        bundle.suggestions.insert("zebra".to_string());
        bundle.suggestions.insert("alpha".to_string());
        let json = serde_json::to_string(&bundle.suggestions).unwrap();
        assert_eq!(json, r#"["alpha","zebra"]"#);
    }
}
