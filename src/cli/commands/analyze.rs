//! `analyze` command: run the full pipeline from the terminal.

use anyhow::Result;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::application::pipeline::new_correlation_id;
use crate::application::AnalysisRequest;
use crate::cli::{output, CliFailure};
use crate::domain::models::{Brief, Config, Tone};
use crate::infrastructure::setup;
use crate::services::csv_validator::TableSource;

#[allow(clippy::too_many_arguments)]
pub async fn handle_analyze(
    config: &Config,
    input: PathBuf,
    goal: String,
    audience: String,
    tone: String,
    competitors: Vec<PathBuf>,
    language: Option<String>,
    json: bool,
) -> Result<()> {
    let tone: Tone = tone
        .parse()
        .map_err(|e| CliFailure::new(format!("rejected: {e}"), 2))?;
    let mut brief = Brief::new(goal, audience, tone)
        .map_err(|e| CliFailure::new(format!("rejected: {e}"), 2))?;
    if let Some(language) = language {
        brief = brief.with_language_hint(language);
    }

    let (pipeline, _store) = setup::build_pipeline(config).await?;

    let request = AnalysisRequest {
        brief,
        creator: TableSource::Path(input),
        competitors: competitors.into_iter().map(TableSource::Path).collect(),
    };

    // Ctrl-C cancels the invocation; nothing is persisted after that point.
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("ctrl-c received, cancelling invocation");
            signal_cancel.cancel();
        }
    });

    let correlation_id = new_correlation_id();
    let outcome = pipeline
        .run_with_correlation(request, cancel, correlation_id.clone())
        .await
        .map_err(|err| cli_failure_for(&err, &correlation_id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.strategy)?);
    } else {
        output::print_analysis(&outcome);
    }

    Ok(())
}

fn cli_failure_for(
    err: &crate::domain::error::PipelineError,
    correlation_id: &str,
) -> CliFailure {
    use crate::domain::error::PipelineError;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let code = err.exit_code() as u8;
    match err {
        PipelineError::Validation(inner) => CliFailure::new(format!("rejected: {inner}"), code),
        PipelineError::Cancelled => CliFailure::new("cancelled; nothing persisted", code),
        PipelineError::Storage(inner) => CliFailure::new(
            format!("internal failure [{correlation_id}]: {inner}"),
            code,
        ),
    }
}
