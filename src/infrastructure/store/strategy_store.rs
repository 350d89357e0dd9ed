//! Atomic, append-only strategy store.
//!
//! One JSON file per strategy plus a side index of summaries. Every write
//! goes through a temp-file-then-rename discipline so a reader that opens
//! any indexed path always sees a complete record. `put` is serialized by an
//! in-process mutex; multiple processes are not supported.

use chrono::{DateTime, SecondsFormat, Utc};
use sha1::{Digest, Sha1};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::error::StoreError;
use crate::domain::models::{Strategy, StrategySummary, Tone};

/// Name of the side index file inside the store root.
const INDEX_FILE: &str = "_index.json";

/// Deadline for any one filesystem operation batch.
const FS_TIMEOUT_SECS: u64 = 5;

/// Optional constraints for `list`.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub tone: Option<Tone>,
    pub fingerprint: Option<String>,
}

struct IndexState {
    summaries: Vec<StrategySummary>,
    /// Enforces per-process monotonically non-decreasing created_at.
    last_created_at: Option<DateTime<Utc>>,
}

/// File-backed store of persisted strategies.
pub struct StrategyStore {
    root: PathBuf,
    state: Mutex<IndexState>,
}

impl StrategyStore {
    /// Open (creating if needed) a store rooted at `root`, loading the
    /// existing index when present.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        let root_clone = root.clone();

        let summaries = with_fs_deadline(move || {
            std::fs::create_dir_all(&root_clone)?;
            let index_path = root_clone.join(INDEX_FILE);
            if !index_path.exists() {
                return Ok(Vec::new());
            }
            let bytes = std::fs::read(&index_path)?;
            let summaries: Vec<StrategySummary> = serde_json::from_slice(&bytes)?;
            Ok(summaries)
        })
        .await?;

        let last_created_at = summaries.iter().map(|s| s.created_at).max();

        Ok(Self {
            root,
            state: Mutex::new(IndexState {
                summaries,
                last_created_at,
            }),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist a strategy, assigning its timestamp and id.
    ///
    /// The payload is written to a temp sibling and renamed, then the index
    /// is rewritten the same way. If the index update fails the payload file
    /// is removed so no record exists outside the index.
    pub async fn put(
        &self,
        mut strategy: Strategy,
        correlation_id: &str,
    ) -> Result<(Strategy, PathBuf), StoreError> {
        let mut state = self.state.lock().await;

        // Monotonic per process: never step backwards on clock skew.
        let now = Utc::now();
        let created_at = state.last_created_at.map_or(now, |last| now.max(last));
        strategy.created_at = created_at;
        strategy.id = derive_id(&strategy, &state.summaries);

        let file_name = format!(
            "{}_{}.json",
            strategy.id,
            created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        let final_path = self.root.join(&file_name);
        let tmp_path = self
            .root
            .join(format!(".tmp-{correlation_id}-{}.json", strategy.id));

        let mut payload = serde_json::to_string_pretty(&strategy)?;
        payload.push('\n');

        let mut summaries = state.summaries.clone();
        summaries.push(strategy.summary(file_name.as_str()));
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let mut index_payload = serde_json::to_string_pretty(&summaries)?;
        index_payload.push('\n');

        let root = self.root.clone();
        let final_path_clone = final_path.clone();
        let tmp_path_clone = tmp_path.clone();
        let correlation = correlation_id.to_string();

        let write_result = with_fs_deadline(move || {
            write_atomic(&tmp_path_clone, &final_path_clone, payload.as_bytes())?;

            let index_tmp = root.join(format!(".tmp-{correlation}-index.json"));
            let index_final = root.join(INDEX_FILE);
            if let Err(err) = write_atomic(&index_tmp, &index_final, index_payload.as_bytes()) {
                // The payload must not outlive a failed index update.
                let _ = std::fs::remove_file(&final_path_clone);
                return Err(err);
            }
            Ok(())
        })
        .await;

        if let Err(err) = write_result {
            // Deadline or I/O failure: make sure no partial files survive.
            let _ = std::fs::remove_file(&tmp_path);
            let _ = std::fs::remove_file(&final_path);
            warn!(id = %strategy.id, error = %err, "strategy persist failed");
            return Err(err);
        }

        state.summaries = summaries;
        state.last_created_at = Some(created_at);
        debug!(id = %strategy.id, path = %final_path.display(), "strategy persisted");

        Ok((strategy, final_path))
    }

    /// Load a strategy by id.
    pub async fn get(&self, id: &str) -> Result<Strategy, StoreError> {
        let path = {
            let state = self.state.lock().await;
            let summary = state
                .summaries
                .iter()
                .find(|s| s.id == id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            self.root.join(&summary.path)
        };

        with_fs_deadline(move || {
            let bytes = std::fs::read(&path)?;
            let strategy: Strategy = serde_json::from_slice(&bytes)?;
            Ok(strategy)
        })
        .await
    }

    /// List summaries, newest first.
    pub async fn list(
        &self,
        filter: &ListFilter,
        limit: usize,
        offset: usize,
    ) -> Vec<StrategySummary> {
        let state = self.state.lock().await;
        state
            .summaries
            .iter()
            .filter(|s| filter.tone.is_none_or(|tone| s.tone == tone))
            .filter(|s| {
                filter
                    .fingerprint
                    .as_deref()
                    .is_none_or(|fp| s.input_fingerprint == fp)
            })
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Case-insensitive substring search over goals and mined terms.
    pub async fn search(&self, text: &str) -> Vec<StrategySummary> {
        let needle = text.to_lowercase();
        let state = self.state.lock().await;
        state
            .summaries
            .iter()
            .filter(|s| {
                s.goal.to_lowercase().contains(&needle)
                    || s.top_keywords
                        .iter()
                        .any(|k| k.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect()
    }

    /// Number of persisted strategies.
    pub async fn len(&self) -> usize {
        self.state.lock().await.summaries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Derive the 8-hex id from fingerprint, brief, and timestamp. A collision
/// re-hashes with an increasing counter salt until the id is free.
fn derive_id(strategy: &Strategy, existing: &[StrategySummary]) -> String {
    let base = format!(
        "{}|{}|{}",
        strategy.input_fingerprint,
        strategy.brief.canonical_string(),
        strategy.created_at.to_rfc3339()
    );

    let mut counter = 0u32;
    loop {
        let input = if counter == 0 {
            base.clone()
        } else {
            format!("{base}|{counter}")
        };
        let digest = Sha1::digest(input.as_bytes());
        let id = hex::encode(&digest[..4]);
        if !existing.iter().any(|s| s.id == id) {
            return id;
        }
        counter += 1;
    }
}

/// Write bytes to `tmp`, fsync, and rename onto `final_path`. The temp file
/// is removed on any failure path.
fn write_atomic(tmp: &Path, final_path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    use std::io::Write;

    let result = (|| -> Result<(), StoreError> {
        let mut file = std::fs::File::create(tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(tmp, final_path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(tmp);
    }
    result
}

/// Run a blocking filesystem closure under the storage deadline.
async fn with_fs_deadline<T, F>(op: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(op);
    match tokio::time::timeout(Duration::from_secs(FS_TIMEOUT_SECS), handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(StoreError::Io(format!("storage task failed: {join_err}"))),
        Err(_) => Err(StoreError::Timeout(FS_TIMEOUT_SECS)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        Brief, CandidateSet, CandidateSource, KeywordBundle, Language, PipelineStats,
        PsychologicalMetadata, Tone, STRATEGY_VERSION,
    };
    use std::collections::BTreeSet;

    fn strategy(goal: &str, fingerprint: &str) -> Strategy {
        Strategy {
            id: String::new(),
            created_at: Utc::now(),
            brief: Brief::new(goal, "developers", Tone::Authority).unwrap(),
            input_fingerprint: fingerprint.to_string(),
            keywords: KeywordBundle::empty(Language::En),
            gaps: None,
            candidates: CandidateSet {
                titles: vec!["A Title Long Enough to Pass Validation Checks".to_string()],
                descriptions: vec![],
                tags: BTreeSet::new(),
                thumbnail_lines: vec![],
                source: CandidateSource::Fallback,
                confidence: 0.4,
            },
            psychological_metadata: PsychologicalMetadata {
                tone: Tone::Authority,
                triggers_applied: vec![],
                rerank_deltas: vec![],
            },
            pipeline: PipelineStats::default(),
            version: STRATEGY_VERSION,
        }
    }

    #[tokio::test]
    async fn put_then_get_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = StrategyStore::open(dir.path()).await.unwrap();

        let (persisted, path) = store
            .put(strategy("Grow subscribers", "aaaa111122223333"), "c0ffee00c0ffee00")
            .await
            .unwrap();

        assert_eq!(persisted.id.len(), 8);
        assert!(path.exists());

        let loaded = store.get(&persisted.id).await.unwrap();
        assert_eq!(loaded, persisted);
    }

    #[tokio::test]
    async fn file_name_matches_contract() {
        let dir = tempfile::tempdir().unwrap();
        let store = StrategyStore::open(dir.path()).await.unwrap();
        let (_, path) = store
            .put(strategy("Grow", "aaaa111122223333"), "c0ffee00c0ffee00")
            .await
            .unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        let pattern =
            regex::Regex::new(r"^[0-9a-f]{8}_\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z\.json$").unwrap();
        assert!(pattern.is_match(name), "unexpected file name {name}");
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = StrategyStore::open(dir.path()).await.unwrap();
        assert!(matches!(
            store.get("deadbeef").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_is_newest_first_and_paginated() {
        let dir = tempfile::tempdir().unwrap();
        let store = StrategyStore::open(dir.path()).await.unwrap();
        for i in 0..3 {
            store
                .put(strategy(&format!("goal {i}"), "aaaa111122223333"), "cafe")
                .await
                .unwrap();
        }

        let all = store.list(&ListFilter::default(), 10, 0).await;
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));

        let page = store.list(&ListFilter::default(), 1, 1).await;
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, all[1].id);
    }

    #[tokio::test]
    async fn search_matches_goal_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let store = StrategyStore::open(dir.path()).await.unwrap();
        store
            .put(strategy("Grow my Python channel", "aaaa111122223333"), "cafe")
            .await
            .unwrap();
        store
            .put(strategy("Cooking shorts", "bbbb111122223333"), "cafe")
            .await
            .unwrap();

        let hits = store.search("PYTHON").await;
        assert_eq!(hits.len(), 1);
        assert!(hits[0].goal.contains("Python"));
    }

    #[tokio::test]
    async fn index_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let store = StrategyStore::open(dir.path()).await.unwrap();
            let (persisted, _) = store
                .put(strategy("Grow", "aaaa111122223333"), "cafe")
                .await
                .unwrap();
            persisted.id
        };

        let reopened = StrategyStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.len().await, 1);
        assert!(reopened.get(&id).await.is_ok());
    }

    #[tokio::test]
    async fn identical_inputs_distinct_timestamps_get_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = StrategyStore::open(dir.path()).await.unwrap();
        let (a, _) = store
            .put(strategy("Grow", "aaaa111122223333"), "cafe")
            .await
            .unwrap();
        let (b, _) = store
            .put(strategy("Grow", "aaaa111122223333"), "cafe")
            .await
            .unwrap();
        // created_at differs (monotonic clock), so ids differ; even if the
        // timestamps collided, the counter salt would separate them.
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn concurrent_puts_all_land_in_index_and_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(StrategyStore::open(dir.path()).await.unwrap());

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = std::sync::Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .put(
                        strategy(&format!("goal {i}"), &format!("{i:016x}")),
                        &format!("{i:016x}"),
                    )
                    .await
                    .unwrap()
            }));
        }

        let mut ids = BTreeSet::new();
        for handle in handles {
            let (persisted, path) = handle.await.unwrap();
            assert!(path.exists());
            ids.insert(persisted.id);
        }

        assert_eq!(ids.len(), 20);
        assert_eq!(store.len().await, 20);

        // Every indexed payload parses cleanly.
        for summary in store.list(&ListFilter::default(), 100, 0).await {
            let bytes = std::fs::read(dir.path().join(&summary.path)).unwrap();
            let parsed: Strategy = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(parsed.id, summary.id);
        }
    }
}
