use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A topic competitors cover more than the creator does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub topic: String,
    pub competitor_frequency: u32,
    pub creator_frequency: u32,
    /// 0..=1, higher means a bigger uncovered opportunity.
    pub opportunity_score: f64,
    pub rationale: String,
}

/// Output of the gap detection stage.
///
/// `gaps` is ordered by descending score, then descending competitor
/// frequency, then ascending topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapBundle {
    pub gaps: Vec<Gap>,
    /// Terms the creator covers that no competitor does.
    pub creator_strengths: BTreeSet<String>,
}

impl GapBundle {
    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty() && self.creator_strengths.is_empty()
    }

    /// The top `n` gap topics in ranked order.
    pub fn top_topics(&self, n: usize) -> Vec<&str> {
        self.gaps.iter().take(n).map(|g| g.topic.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bundle_is_empty() {
        let bundle = GapBundle::default();
        assert!(bundle.is_empty());
        assert!(bundle.top_topics(5).is_empty());
    }
}
