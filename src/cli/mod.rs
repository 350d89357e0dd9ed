//! CLI interface module: command definitions, handlers, and terminal output.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strategy assistant for video creators.
#[derive(Parser, Debug)]
#[command(name = "vidstrat", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Emit machine-readable JSON instead of human output
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose logging (forces debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the strategy pipeline over a performance CSV
    Analyze {
        /// Creator performance CSV
        #[arg(long)]
        input: PathBuf,

        /// What the creator wants to achieve
        #[arg(long)]
        goal: String,

        /// Who the content is for
        #[arg(long)]
        audience: String,

        /// Psychological tone: curiosity, authority, fear, persuasive, engaging
        #[arg(long)]
        tone: String,

        /// Competitor CSVs, comma separated
        #[arg(long, value_delimiter = ',')]
        competitors: Vec<PathBuf>,

        /// Language hint for generated examples (e.g. en, bn)
        #[arg(long)]
        language: Option<String>,
    },

    /// List or inspect persisted strategies
    Strategies {
        /// Enumerate strategies, newest first
        #[arg(long)]
        list: bool,

        /// Print one strategy in full
        #[arg(long)]
        id: Option<String>,

        /// Case-insensitive search over goals and keywords
        #[arg(long)]
        search: Option<String>,

        #[arg(long, default_value_t = 20)]
        limit: usize,

        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Validate a CSV without running the pipeline
    Validate {
        /// CSV file to check
        path: PathBuf,
    },

    /// Host the local HTTP playground (loopback only)
    Serve {
        /// Port override; defaults to the configured port
        #[arg(long)]
        port: Option<u16>,
    },
}

/// A handler failure that already knows its process exit code.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct CliFailure {
    pub message: String,
    pub code: u8,
}

impl CliFailure {
    pub fn new(message: impl Into<String>, code: u8) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }
}
