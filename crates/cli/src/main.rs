//! svntopo command-line tool.
//!
//! Provides subcommands for running the full topology analysis, validating a
//! collected history dump, and checking how a single path classifies.
//!
//! The directive stream goes to stdout (or `--output`); all diagnostics go
//! to stderr via `tracing`, so the contractual stream stays clean.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use svntopo_core::config::AppConfig;
use svntopo_core::{analyzer, branch, input};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// svntopo command-line tool.
#[derive(Parser, Debug)]
#[command(
    name = "svntopo",
    version,
    about = "Infer branch/merge topology from collected SVN history"
)]
struct Cli {
    /// Path to an optional TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the full analysis and emit the directive stream.
    Analyze {
        /// Path to the collected history dump (JSON).
        input: Option<PathBuf>,

        /// Write directives to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load a history dump and report its shape without emitting directives.
    Validate {
        /// Path to the collected history dump (JSON).
        input: PathBuf,
    },

    /// Print the branch key a path classifies to.
    Classify {
        /// Canonical SVN path (leading `/`).
        path: String,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    // Diagnostics go to stderr so stdout stays reserved for directives.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("failed to load config '{}'", path.display())),
        None => Ok(AppConfig::default()),
    }
}

fn run(cli: Cli, config: AppConfig) -> Result<()> {
    match cli.command {
        Commands::Analyze { input, output } => {
            let input = input
                .or(config.input)
                .context("no input dump given (argument or config `input`)")?;
            let dump = input::load_dump(&input)
                .with_context(|| format!("failed to load '{}'", input.display()))?;
            let report = analyzer::analyze(&dump).context("analysis failed")?;

            let rendered = report.render();
            match output.or(config.output) {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write '{}'", path.display()))?;
                    tracing::info!(path = %path.display(), "directives written");
                }
                None => {
                    std::io::stdout().write_all(rendered.as_bytes())?;
                }
            }

            tracing::info!(
                directives = report.directives.len(),
                ambiguous = report.ambiguous.len(),
                spurious = report.spurious.len(),
                "analysis finished"
            );
            Ok(())
        }

        Commands::Validate { input } => {
            let dump = input::load_dump(&input)
                .with_context(|| format!("failed to load '{}'", input.display()))?;
            println!("revisions:   {}", dump.max_rev());
            println!("paths:       {}", dump.path_histories.len());
            println!(
                "transitions: {}",
                dump.path_histories.values().map(Vec::len).sum::<usize>()
            );
            println!(
                "merge refs:  {}",
                dump.merges.iter().map(Vec::len).sum::<usize>()
            );
            Ok(())
        }

        Commands::Classify { path } => {
            let branch = branch::classify(&path)?;
            println!("{}", branch);
            Ok(())
        }
    }
}
