//! CLI entry point for taskfilter.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;

/// Filter hierarchical task plans with built-in and query-backed filters.
#[derive(Parser, Debug)]
#[command(
    name = "taskfilter",
    version,
    about = "taskfilter: built-in and query-backed filters over task trees"
)]
struct Cli {
    /// Project directory holding `.taskfilter/` (defaults to current).
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List built-in and custom filters.
    Filters,

    /// Print the tasks visible under a filter.
    Show {
        /// JSON file with the task tree.
        #[arg(long)]
        tasks: PathBuf,
        /// Filter title (defaults to the persisted active filter).
        #[arg(long)]
        filter: Option<String>,
        /// Evaluate date filters as of this day (YYYY-MM-DD).
        #[arg(long)]
        today: Option<String>,
    },

    /// Add a custom filter.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        expression: String,
        #[arg(long)]
        description: Option<String>,
    },

    /// Remove a custom filter.
    Remove {
        #[arg(long)]
        title: String,
    },

    /// Replace the custom filters with a filter set file.
    Import {
        #[arg(long)]
        file: PathBuf,
    },

    /// Write the custom filters to a filter set file.
    Export {
        #[arg(long)]
        file: PathBuf,
    },

    /// Set a persisted built-in filter option.
    Option {
        /// Option name, e.g. `filter.completedTasks`.
        name: String,
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
}

fn main() -> Result<()> {
    let Cli { dir, cmd } = Cli::parse();
    install_tracing();
    commands::run(&dir, cmd)
}

fn install_tracing() {
    // RUST_LOG overrides the INFO default.
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
