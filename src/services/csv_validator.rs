//! Tabular input validation (creator and competitor CSV exports).
//!
//! Parses untrusted CSV bytes into [`CreatorRow`]s, enforcing the size caps
//! and the hostile-cell security policy before any coercion happens. A
//! security hit rejects the file in full; structural oddities degrade to
//! warnings wherever that is safe.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::domain::error::ValidationError;
use crate::domain::models::config::LimitsConfig;
use crate::domain::models::{CreatorRow, ValidationWarning};
use crate::services::sanitizer::{hostile_cell_rule, truncate_chars};

/// Maximum characters kept from a title cell.
const MAX_TITLE_CHARS: usize = 500;

/// A tabular input, either on disk or already in memory.
#[derive(Debug, Clone)]
pub enum TableSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl TableSource {
    /// Human-readable origin for warnings and logs.
    pub fn describe(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Bytes(bytes) => format!("<{} bytes in memory>", bytes.len()),
        }
    }
}

/// Successful validation output: sanitized rows plus non-fatal observations.
#[derive(Debug, Clone)]
pub struct ValidatedTable {
    pub rows: Vec<CreatorRow>,
    pub warnings: Vec<ValidationWarning>,
}

/// Recognized columns after case-insensitive alias matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    VideoId,
    Title,
    PublishedAt,
    Views,
    Impressions,
    Ctr,
    AvgViewDuration,
    Country,
    Likes,
    Comments,
    Unknown,
}

fn match_column(raw: &str) -> Column {
    // Alias matching ignores case, spaces, and underscores.
    let normalized: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect::<String>()
        .to_lowercase();

    match normalized.as_str() {
        "videoid" => Column::VideoId,
        "videotitle" | "title" => Column::Title,
        "date" | "publishedat" | "publishdate" => Column::PublishedAt,
        "views" | "viewcount" => Column::Views,
        "impressions" => Column::Impressions,
        "ctr" | "clickthroughrate" => Column::Ctr,
        "averageviewduration" | "avgviewduration" => Column::AvgViewDuration,
        "country" => Column::Country,
        "likes" | "likecount" => Column::Likes,
        "comments" | "commentcount" => Column::Comments,
        _ => Column::Unknown,
    }
}

/// Validator for untrusted CSV input.
#[derive(Debug, Clone)]
pub struct CsvValidator {
    limits: LimitsConfig,
}

impl CsvValidator {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Validate a CSV file on disk.
    pub fn validate_path(&self, path: &Path) -> Result<ValidatedTable, ValidationError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            ValidationError::InvalidInput(format!("cannot read {}: {e}", path.display()))
        })?;
        if metadata.len() > self.limits.max_csv_bytes {
            return Err(ValidationError::TooLarge(format!(
                "{} is {} bytes, limit is {}",
                path.display(),
                metadata.len(),
                self.limits.max_csv_bytes
            )));
        }

        let bytes = std::fs::read(path).map_err(|e| {
            ValidationError::InvalidInput(format!("cannot read {}: {e}", path.display()))
        })?;
        self.validate_bytes(&bytes)
    }

    /// Validate CSV bytes already in memory.
    pub fn validate_bytes(&self, bytes: &[u8]) -> Result<ValidatedTable, ValidationError> {
        if bytes.len() as u64 > self.limits.max_csv_bytes {
            return Err(ValidationError::TooLarge(format!(
                "input is {} bytes, limit is {}",
                bytes.len(),
                self.limits.max_csv_bytes
            )));
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::None)
            .from_reader(bytes);

        let mut warnings = Vec::new();

        let headers = reader
            .headers()
            .map_err(|e| ValidationError::InvalidInput(format!("unreadable header row: {e}")))?
            .clone();

        let columns: Vec<Column> = headers.iter().map(match_column).collect();
        for (header, column) in headers.iter().zip(&columns) {
            if *column == Column::Unknown {
                warnings.push(ValidationWarning::UnknownColumnIgnored(header.to_string()));
            }
        }

        if !columns.contains(&Column::Title) {
            return Err(ValidationError::InvalidInput(
                "no title-like column found (expected one of: title, videoTitle)".to_string(),
            ));
        }

        let mut rows = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for (row_index, record) in reader.records().enumerate() {
            if row_index >= self.limits.max_csv_rows {
                return Err(ValidationError::TooLarge(format!(
                    "row count exceeds limit of {}",
                    self.limits.max_csv_rows
                )));
            }

            let record = record.map_err(|e| {
                ValidationError::InvalidInput(format!("unreadable row {row_index}: {e}"))
            })?;

            // Security policy runs on raw cells, before trimming or coercion.
            for (cell_index, cell) in record.iter().enumerate() {
                if let Some(rule) = hostile_cell_rule(cell, self.limits.max_cell_chars) {
                    return Err(ValidationError::hostile(
                        rule,
                        format!("row {row_index}, column {cell_index}"),
                    ));
                }
            }

            let mut row = CreatorRow::default();
            for (column, cell) in columns.iter().zip(record.iter()) {
                let cell = cell.trim();
                match column {
                    Column::Title => {
                        row.title = truncate_chars(cell, MAX_TITLE_CHARS);
                    }
                    Column::VideoId => {
                        if !cell.is_empty() {
                            row.video_id = Some(cell.to_string());
                        }
                    }
                    Column::PublishedAt => {
                        if !cell.is_empty() {
                            match parse_date(cell) {
                                Some(date) => row.published_at = Some(date),
                                None => warnings
                                    .push(ValidationWarning::UnparsableDate(cell.to_string())),
                            }
                        }
                    }
                    Column::Views => row.views = coerce_u64(cell),
                    Column::Impressions => row.impressions = coerce_u64(cell),
                    Column::Likes => row.likes = coerce_u64(cell),
                    Column::Comments => row.comments = coerce_u64(cell),
                    Column::Ctr => row.ctr = coerce_ctr(cell),
                    Column::AvgViewDuration => {
                        row.avg_view_duration_s = coerce_f64(cell).filter(|v| *v >= 0.0);
                    }
                    Column::Country => {
                        if !cell.is_empty() {
                            row.country = Some(cell.to_string());
                        }
                    }
                    Column::Unknown => {}
                }
            }

            if row.title.is_empty() {
                warnings.push(ValidationWarning::EmptyTitleDropped(row_index));
                continue;
            }

            let dedup_key = row
                .video_id
                .clone()
                .map_or_else(|| format!("title:{}", row.title), |id| format!("id:{id}"));
            if !seen.insert(dedup_key.clone()) {
                warnings.push(ValidationWarning::DuplicateRowDropped(dedup_key));
                continue;
            }

            rows.push(row);
        }

        if rows.is_empty() {
            return Err(ValidationError::InvalidInput(
                "no rows with a usable title".to_string(),
            ));
        }

        Ok(ValidatedTable { rows, warnings })
    }

    /// Validate either source kind.
    pub fn validate(&self, source: &TableSource) -> Result<ValidatedTable, ValidationError> {
        match source {
            TableSource::Path(path) => self.validate_path(path),
            TableSource::Bytes(bytes) => self.validate_bytes(bytes),
        }
    }

    /// Apply the hostile-cell rules to a free-text field (brief goal or
    /// audience). Structural limits do not apply here, only the security
    /// patterns.
    pub fn check_free_text(&self, label: &str, text: &str) -> Result<(), ValidationError> {
        if let Some(rule) = hostile_cell_rule(text, self.limits.max_cell_chars) {
            return Err(ValidationError::hostile(rule, format!("brief field '{label}'")));
        }
        Ok(())
    }
}

fn coerce_u64(cell: &str) -> Option<u64> {
    let cleaned: String = cell.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

fn coerce_f64(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

/// CTR arrives either as a 0..1 ratio or as a percentage ("4.2%").
fn coerce_ctr(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    let (body, percent) = trimmed
        .strip_suffix('%')
        .map_or((trimmed, false), |body| (body, true));
    let value: f64 = body.trim().parse().ok()?;
    let ratio = if percent { value / 100.0 } else { value };
    (0.0..=1.0).contains(&ratio).then_some(ratio)
}

fn parse_date(cell: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(cell) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(cell, "%Y-%m-%d") {
        return Some(DateTime::from_naive_utc_and_offset(
            date.and_hms_opt(0, 0, 0)?,
            Utc,
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> CsvValidator {
        CsvValidator::new(LimitsConfig::default())
    }

    fn validate(csv: &str) -> Result<ValidatedTable, ValidationError> {
        validator().validate_bytes(csv.as_bytes())
    }

    #[test]
    fn single_valid_title_row_succeeds() {
        let table = validate("title,views\nComplete Python Course 2024,15420\n").unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].title, "Complete Python Course 2024");
        assert_eq!(table.rows[0].views, Some(15420));
    }

    #[test]
    fn zero_valid_title_rows_fails_invalid_input() {
        let err = validate("title,views\n,100\n  ,200\n").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidInput(_)));
    }

    #[test]
    fn missing_title_column_fails_invalid_input() {
        let err = validate("views,likes\n100,5\n").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidInput(_)));
    }

    #[test]
    fn column_aliases_match_case_insensitively() {
        let table = validate(
            "videoId,videoTitle,Date,Views,Impressions,CTR,averageViewDuration,Country,Likes,Comments\n\
             v1,My Video,2024-01-15,1000,5000,0.04,123.5,US,10,2\n",
        )
        .unwrap();
        let row = &table.rows[0];
        assert_eq!(row.video_id.as_deref(), Some("v1"));
        assert_eq!(row.title, "My Video");
        assert!(row.published_at.is_some());
        assert_eq!(row.views, Some(1000));
        assert_eq!(row.impressions, Some(5000));
        assert_eq!(row.ctr, Some(0.04));
        assert_eq!(row.avg_view_duration_s, Some(123.5));
        assert_eq!(row.country.as_deref(), Some("US"));
        assert_eq!(row.likes, Some(10));
        assert_eq!(row.comments, Some(2));
    }

    #[test]
    fn formula_injection_rejects_the_whole_file() {
        let err = validate("title,views\nGood Video,10\n=SUM(A1:A10),20\n").unwrap_err();
        match err {
            ValidationError::HostileInput { rule, .. } => assert_eq!(rule, "formula_prefix"),
            other => panic!("expected hostile input, got {other:?}"),
        }
    }

    #[test]
    fn negative_number_cell_is_accepted() {
        let table = validate("title,views\nGrowth Report,-500\n").unwrap();
        // -500 fails unsigned coercion and becomes absent, not an error.
        assert_eq!(table.rows[0].views, None);
    }

    #[test]
    fn dash_letter_cell_is_rejected() {
        let err = validate("title,views\n-Analysis of Trends,100\n").unwrap_err();
        assert!(err.is_hostile());
    }

    #[test]
    fn script_tag_in_any_cell_is_rejected() {
        let err = validate("title,country\nNice Video,<script>alert(1)</script>\n").unwrap_err();
        match err {
            ValidationError::HostileInput { rule, .. } => assert_eq!(rule, "script_tag"),
            other => panic!("expected hostile input, got {other:?}"),
        }
    }

    #[test]
    fn hostile_url_protocol_is_rejected() {
        let err = validate("title\njavascript:alert(1)\n").unwrap_err();
        assert!(err.is_hostile());
    }

    #[test]
    fn cell_length_boundary() {
        let limits = LimitsConfig {
            max_cell_chars: 20,
            ..Default::default()
        };
        let v = CsvValidator::new(limits);
        let ok = format!("title,note\nVideo,{}\n", "x".repeat(20));
        let over = format!("title,note\nVideo,{}\n", "x".repeat(21));
        assert!(v.validate_bytes(ok.as_bytes()).is_ok());
        let err = v.validate_bytes(over.as_bytes()).unwrap_err();
        match err {
            ValidationError::HostileInput { rule, .. } => assert_eq!(rule, "cell_too_long"),
            other => panic!("expected hostile input, got {other:?}"),
        }
    }

    #[test]
    fn byte_limit_rejects_too_large() {
        let limits = LimitsConfig {
            max_csv_bytes: 10,
            ..Default::default()
        };
        let err = CsvValidator::new(limits)
            .validate_bytes(b"title\nsomething long enough\n")
            .unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge(_)));
    }

    #[test]
    fn row_limit_rejects_too_large() {
        let limits = LimitsConfig {
            max_csv_rows: 2,
            ..Default::default()
        };
        let err = CsvValidator::new(limits)
            .validate_bytes(b"title\na a a\nb b b\nc c c\n")
            .unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge(_)));
    }

    #[test]
    fn duplicate_video_ids_are_dropped_with_warning() {
        let table = validate("videoId,title\nv1,First\nv1,Second\n").unwrap();
        assert_eq!(table.rows.len(), 1);
        assert!(table
            .warnings
            .iter()
            .any(|w| matches!(w, ValidationWarning::DuplicateRowDropped(_))));
    }

    #[test]
    fn duplicate_titles_without_ids_are_dropped() {
        let table = validate("title\nSame Title\nSame Title\nOther Title\n").unwrap();
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn unknown_columns_warn_but_do_not_fail() {
        let table = validate("title,watchTimeHours\nVideo,55\n").unwrap();
        assert!(table
            .warnings
            .iter()
            .any(|w| matches!(w, ValidationWarning::UnknownColumnIgnored(name) if name == "watchTimeHours")));
    }

    #[test]
    fn unparsable_numeric_cells_become_absent_not_zero() {
        let table = validate("title,views,likes\nVideo,n/a,\n").unwrap();
        assert_eq!(table.rows[0].views, None);
        assert_eq!(table.rows[0].likes, None);
    }

    #[test]
    fn unparsable_dates_warn_and_stay_absent() {
        let table = validate("title,date\nVideo,yesterday\n").unwrap();
        assert_eq!(table.rows[0].published_at, None);
        assert!(table
            .warnings
            .iter()
            .any(|w| matches!(w, ValidationWarning::UnparsableDate(_))));
    }

    #[test]
    fn ctr_accepts_ratio_and_percent_forms() {
        let table = validate("title,ctr\nA Video,0.042\nB Video,4.2%\nC Video,150%\n").unwrap();
        assert_eq!(table.rows[0].ctr, Some(0.042));
        assert!((table.rows[1].ctr.unwrap() - 0.042).abs() < 1e-9);
        assert_eq!(table.rows[2].ctr, None);
    }

    #[test]
    fn titles_are_truncated_at_500_chars() {
        let long_title = "t".repeat(600);
        let table = validate(&format!("title\n{long_title}\n")).unwrap();
        assert_eq!(table.rows[0].title.chars().count(), 500);
    }

    #[test]
    fn free_text_check_flags_hostile_brief_fields() {
        let v = validator();
        assert!(v.check_free_text("goal", "Grow subscribers").is_ok());
        assert!(v
            .check_free_text("goal", "=HYPERLINK(\"http://evil\")")
            .is_err());
    }
}
