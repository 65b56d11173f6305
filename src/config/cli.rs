use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "travel-warehouse-etl")]
#[command(about = "Prepare US travel datasets and load them into the warehouse")]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log CPU / memory usage after each stage
    #[arg(long, global = true)]
    pub monitor: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Normalize the four source datasets and upload the staged files
    Prep {
        /// Path to TOML configuration file
        #[arg(short, long, default_value = "etl-config.toml")]
        config: PathBuf,

        /// Write the staged files locally only
        #[arg(long)]
        skip_upload: bool,

        /// Override processing.workers
        #[arg(long)]
        workers: Option<usize>,

        /// Write a JSON run report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Rebuild the warehouse schema from the staged files
    Load {
        #[arg(short, long, default_value = "etl-config.toml")]
        config: PathBuf,

        /// Print the SQL script instead of executing it
        #[arg(long)]
        dry_run: bool,

        #[arg(long)]
        report: Option<PathBuf>,
    },
}

impl Command {
    pub fn config_path(&self) -> &PathBuf {
        match self {
            Command::Prep { config, .. } | Command::Load { config, .. } => config,
        }
    }
}
