//! Content-gap detection against competitor keyword bundles.
//!
//! Pure and deterministic: no I/O, no clocks. With no competitor bundles the
//! detector returns an empty bundle rather than failing.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::models::{Gap, GapBundle, KeywordBundle};

/// Minimum opportunity score worth reporting.
const MIN_OPPORTUNITY: f64 = 0.3;

/// Maximum gaps retained.
const MAX_GAPS: usize = 20;

/// Maximum creator strengths retained.
const MAX_STRENGTHS: usize = 20;

/// Score bonus for a term the creator's trends map marks as rising.
const RISING_BONUS: f64 = 0.2;

pub struct GapDetector;

impl GapDetector {
    /// Compare the creator's keyword distribution against competitors'.
    pub fn detect(creator: &KeywordBundle, competitors: &[KeywordBundle]) -> GapBundle {
        if competitors.is_empty() {
            return GapBundle::default();
        }

        // Highest frequency any single competitor gives each term.
        let mut competitor_max: BTreeMap<&str, u32> = BTreeMap::new();
        for bundle in competitors {
            for entry in &bundle.keywords {
                let slot = competitor_max.entry(entry.term.as_str()).or_insert(0);
                *slot = (*slot).max(entry.frequency);
            }
        }

        let mut gaps: Vec<Gap> = Vec::new();
        for (term, &cf) in &competitor_max {
            let mf = creator.frequency_of(term);
            #[allow(clippy::cast_precision_loss)]
            let base = f64::from(cf.saturating_sub(mf)) / f64::from(cf.max(1));
            let mut score = base.clamp(0.0, 1.0);

            if creator.trends.get(*term).is_some_and(|t| t.rising) {
                score = (score + RISING_BONUS).min(1.0);
            }

            if score < MIN_OPPORTUNITY {
                continue;
            }

            gaps.push(Gap {
                topic: (*term).to_string(),
                competitor_frequency: cf,
                creator_frequency: mf,
                opportunity_score: score,
                rationale: rationale(term, cf, mf),
            });
        }

        gaps.sort_by(|a, b| {
            b.opportunity_score
                .total_cmp(&a.opportunity_score)
                .then(b.competitor_frequency.cmp(&a.competitor_frequency))
                .then(a.topic.cmp(&b.topic))
        });
        gaps.truncate(MAX_GAPS);

        // Terms the creator owns outright: covered by the creator, absent
        // from every competitor bundle.
        let creator_strengths: BTreeSet<String> = creator
            .keywords
            .iter()
            .filter(|entry| entry.frequency > 0 && !competitor_max.contains_key(entry.term.as_str()))
            .take(MAX_STRENGTHS)
            .map(|entry| entry.term.clone())
            .collect();

        GapBundle {
            gaps,
            creator_strengths,
        }
    }
}

fn rationale(term: &str, cf: u32, mf: u32) -> String {
    if mf == 0 {
        format!("competitors mention '{term}' {cf} times; the creator has not covered it")
    } else {
        format!("competitors mention '{term}' {cf} times vs the creator's {mf}")
    }
}
