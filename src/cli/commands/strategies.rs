//! `strategies` command: enumerate, search, and inspect persisted runs.

use anyhow::Result;

use crate::cli::{output, CliFailure};
use crate::domain::models::Config;
use crate::infrastructure::store::{ListFilter, StrategyStore};

pub async fn handle_strategies(
    config: &Config,
    list: bool,
    id: Option<String>,
    search: Option<String>,
    limit: usize,
    offset: usize,
    json: bool,
) -> Result<()> {
    let store = StrategyStore::open(config.strategies_dir()).await?;

    if let Some(id) = id {
        let strategy = store
            .get(&id)
            .await
            .map_err(|e| CliFailure::new(e.to_string(), 1))?;
        println!("{}", serde_json::to_string_pretty(&strategy)?);
        return Ok(());
    }

    if let Some(text) = search {
        let hits = store.search(&text).await;
        if json {
            println!("{}", serde_json::to_string_pretty(&hits)?);
        } else {
            output::print_summaries(&hits);
        }
        return Ok(());
    }

    if !list {
        return Err(CliFailure::new(
            "nothing to do: pass --list, --id ID, or --search TEXT",
            2,
        )
        .into());
    }

    let summaries = store.list(&ListFilter::default(), limit, offset).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        output::print_summaries(&summaries);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_at(dir: &std::path::Path) -> Config {
        Config {
            storage_root: dir.to_path_buf(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn bare_strategies_requires_an_action() {
        let dir = tempfile::tempdir().unwrap();
        let err = handle_strategies(&config_at(dir.path()), false, None, None, 10, 0, false)
            .await
            .unwrap_err();
        let failure = err.downcast_ref::<CliFailure>().unwrap();
        assert_eq!(failure.code, 2);
    }

    #[tokio::test]
    async fn explicit_list_succeeds_on_an_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        handle_strategies(&config_at(dir.path()), true, None, None, 10, 0, true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_id_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = handle_strategies(
            &config_at(dir.path()),
            false,
            Some("deadbeef".to_string()),
            None,
            10,
            0,
            false,
        )
        .await
        .unwrap_err();
        let failure = err.downcast_ref::<CliFailure>().unwrap();
        assert_eq!(failure.code, 1);
    }
}
