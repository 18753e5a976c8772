//! CLI parse: clap types for autopost. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Autopost CLI - generate and publish posts from a queue of ideas
#[derive(Parser)]
#[command(name = "autopost")]
#[command(about = "Generate long-form posts from queued ideas and publish them on a schedule")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (queue, archive, config/ and log live here)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Debug-level logging, mirrored to stderr
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Publish queued ideas until the queue is empty
    Run {
        /// Stop after this many successful posts
        #[arg(long)]
        limit: Option<usize>,

        /// Seconds to wait between posts (overrides pipeline.throttle_secs)
        #[arg(long)]
        throttle_secs: Option<u64>,
    },
    /// Append an idea to the queue
    Add {
        /// Idea text
        text: String,
    },
    /// List pending ideas
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Resolve and print the publishing identity
    Whoami,
    /// Validate configuration without contacting any service
    Validate,
}
