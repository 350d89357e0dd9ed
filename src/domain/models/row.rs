use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One validated row of the creator's performance export.
///
/// Only `title` is guaranteed present; every numeric field is optional and
/// absence is distinct from zero (a cell that fails coercion becomes `None`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatorRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_view_duration_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impressions: Option<u64>,
}

impl CreatorRow {
    /// Canonical field string used for input fingerprinting.
    ///
    /// Fields are joined with unit separators so that absence cannot collide
    /// with a different row's content.
    pub fn canonical_string(&self) -> String {
        fn opt<T: ToString>(v: &Option<T>) -> String {
            v.as_ref().map(ToString::to_string).unwrap_or_default()
        }
        [
            opt(&self.video_id),
            self.title.clone(),
            opt(&self.views),
            opt(&self.likes),
            opt(&self.comments),
            self.published_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
            opt(&self.country),
            opt(&self.ctr),
            opt(&self.avg_view_duration_s),
            opt(&self.impressions),
        ]
        .join("\u{1f}")
    }
}

/// Non-fatal observations produced while validating a tabular input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum ValidationWarning {
    /// A duplicate row (by video id or exact title) was dropped.
    DuplicateRowDropped(String),
    /// A column that matched no known alias was ignored.
    UnknownColumnIgnored(String),
    /// A date cell could not be parsed; the field was left absent.
    UnparsableDate(String),
    /// A row with an empty title was dropped.
    EmptyTitleDropped(usize),
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateRowDropped(key) => write!(f, "duplicate row dropped: {key}"),
            Self::UnknownColumnIgnored(name) => write!(f, "unknown column ignored: {name}"),
            Self::UnparsableDate(value) => write!(f, "unparsable date left absent: {value}"),
            Self::EmptyTitleDropped(index) => write!(f, "row {index} dropped: empty title"),
        }
    }
}
