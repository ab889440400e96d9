//! agentlens CLI
//!
//! Inspect agent execution logs from the command line.

use std::path::{Path, PathBuf};

use agentlens::config::{DEFAULT_LOGS_DIR, LOGS_DIR};
use agentlens::prelude::*;
use agentlens::render;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "agentlens")]
#[command(about = "Reconstruct and summarise LLM agent execution logs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the full analysis report as JSON
    Report {
        /// Agent log file
        file: PathBuf,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Print agent info, run metrics and tool usage
    Summary {
        /// Agent log file
        file: PathBuf,
    },

    /// Print the call-span tree
    Tree {
        /// Agent log file
        file: PathBuf,
    },

    /// List log files, newest first
    List {
        /// Directory to scan
        #[arg(long, env = LOGS_DIR, default_value = DEFAULT_LOGS_DIR)]
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report { file, pretty } => {
            let report = analyse(&file)?.report();
            let json = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{}", json);
        }
        Commands::Summary { file } => {
            print!("{}", render::summary(&analyse(&file)?));
        }
        Commands::Tree { file } => {
            print!("{}", render::tree(&analyse(&file)?.trace()));
        }
        Commands::List { dir } => {
            let files = list_log_files(&dir)
                .with_context(|| format!("failed to list {}", dir.display()))?;
            if files.is_empty() {
                eprintln!("No log files in {}", dir.display());
            }
            for file in files {
                println!("{}", file.display());
            }
        }
    }

    Ok(())
}

fn analyse(file: &Path) -> Result<LogAnalysis> {
    let log = load_log_file(file).with_context(|| format!("failed to load {}", file.display()))?;
    tracing::info!(
        entries = log.log.len(),
        model = log.model().unwrap_or("N/A"),
        "Loaded {}",
        file.display()
    );
    Ok(LogAnalysis::new(log))
}
