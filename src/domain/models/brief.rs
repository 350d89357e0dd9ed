use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::error::ValidationError;

/// The creator's creative intent for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brief {
    /// What the creator wants to achieve (1..500 chars).
    pub goal: String,
    /// Who the content is for (1..200 chars).
    pub audience: String,
    /// Psychological style selector for prompts and re-ranking.
    pub tone: Tone,
    /// Optional language override for prompt examples (e.g. "en", "bn").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_hint: Option<String>,
}

impl Brief {
    /// Build a brief, enforcing field length bounds.
    pub fn new(
        goal: impl Into<String>,
        audience: impl Into<String>,
        tone: Tone,
    ) -> Result<Self, ValidationError> {
        let goal = goal.into().trim().to_string();
        let audience = audience.into().trim().to_string();

        if goal.is_empty() || goal.chars().count() > 500 {
            return Err(ValidationError::InvalidInput(
                "goal must be 1..500 characters".to_string(),
            ));
        }
        if audience.is_empty() || audience.chars().count() > 200 {
            return Err(ValidationError::InvalidInput(
                "audience must be 1..200 characters".to_string(),
            ));
        }

        Ok(Self {
            goal,
            audience,
            tone,
            language_hint: None,
        })
    }

    /// Attach a language hint (e.g. from a CLI flag).
    pub fn with_language_hint(mut self, hint: impl Into<String>) -> Self {
        self.language_hint = Some(hint.into());
        self
    }

    /// Canonical byte representation used when deriving strategy ids.
    pub fn canonical_string(&self) -> String {
        format!(
            "{}\u{1f}{}\u{1f}{}\u{1f}{}",
            self.goal,
            self.audience,
            self.tone,
            self.language_hint.as_deref().unwrap_or("")
        )
    }
}

/// The closed set of psychological-style selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Curiosity,
    Authority,
    Fear,
    Persuasive,
    Engaging,
}

impl Tone {
    /// All tones, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Curiosity,
        Self::Authority,
        Self::Fear,
        Self::Persuasive,
        Self::Engaging,
    ];
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Curiosity => write!(f, "curiosity"),
            Self::Authority => write!(f, "authority"),
            Self::Fear => write!(f, "fear"),
            Self::Persuasive => write!(f, "persuasive"),
            Self::Engaging => write!(f, "engaging"),
        }
    }
}

impl FromStr for Tone {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "curiosity" => Ok(Self::Curiosity),
            "authority" => Ok(Self::Authority),
            "fear" => Ok(Self::Fear),
            "persuasive" => Ok(Self::Persuasive),
            "engaging" => Ok(Self::Engaging),
            other => Err(ValidationError::InvalidInput(format!(
                "unknown tone '{other}', expected one of: curiosity, authority, fear, persuasive, engaging"
            ))),
        }
    }
}
