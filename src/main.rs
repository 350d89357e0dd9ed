//! Vidstrat CLI entry point.

use clap::Parser;
use std::process::ExitCode;

use vidstrat::cli::commands::{analyze, serve, strategies, validate};
use vidstrat::cli::{Cli, CliFailure, Commands};
use vidstrat::domain::error::PipelineError;
use vidstrat::domain::models::Config;
use vidstrat::infrastructure::config::ConfigLoader;
use vidstrat::infrastructure::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    let _log_guard = match logging::init(&config.logging) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("logging setup failed: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    match dispatch(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

async fn dispatch(cli: Cli, config: &Config) -> anyhow::Result<()> {
    match cli.command {
        Commands::Analyze {
            input,
            goal,
            audience,
            tone,
            competitors,
            language,
        } => {
            analyze::handle_analyze(
                config,
                input,
                goal,
                audience,
                tone,
                competitors,
                language,
                cli.json,
            )
            .await
        }
        Commands::Strategies {
            list,
            id,
            search,
            limit,
            offset,
        } => {
            strategies::handle_strategies(config, list, id, search, limit, offset, cli.json).await
        }
        Commands::Validate { path } => validate::handle_validate(config, path, cli.json).await,
        Commands::Serve { port } => serve::handle_serve(config, port).await,
    }
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    if let Some(failure) = err.downcast_ref::<CliFailure>() {
        return failure.code;
    }
    if let Some(pipeline_err) = err.downcast_ref::<PipelineError>() {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        return pipeline_err.exit_code() as u8;
    }
    1
}
