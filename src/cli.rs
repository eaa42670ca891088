//! CLI argument parsing for timerlog

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output format for timing reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table (default)
    #[default]
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "timerlog")]
#[command(version)]
#[command(about = "Named start/end timers with binary event logs", long_about = None)]
pub struct Cli {
    /// Enable debug tracing output on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Load defaults from a TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode log files and report timer durations
    Report {
        /// Log files, decoded in the order given
        #[arg(required = true, value_name = "LOG")]
        files: Vec<PathBuf>,

        /// Output format (overrides the config file)
        #[arg(long = "format", value_enum)]
        format: Option<OutputFormat>,

        /// Exit with an error if any timer had to be excluded
        #[arg(long)]
        strict: bool,
    },

    /// Append start/end events to a log file
    Emit {
        /// Log file to write
        #[arg(long = "log", value_name = "FILE")]
        log: PathBuf,

        /// Append instead of truncating
        #[arg(long)]
        append: bool,

        /// Events in order, as `start:NAME` or `end:NAME`
        #[arg(required = true, value_name = "EVENT")]
        events: Vec<String>,
    },

    /// Start a per-file timer
    Start(FileTimerArgs),

    /// End a per-file timer
    End(FileTimerArgs),

    /// Print nanoseconds since a per-file timer started
    Poll(FileTimerArgs),

    /// Print the duration of a per-file timer
    Delta(FileTimerArgs),

    /// Remove a per-file timer
    Delete {
        #[command(flatten)]
        timer: FileTimerArgs,

        /// Do not fail if the timer does not exist
        #[arg(long = "if-exists")]
        if_exists: bool,
    },
}

#[derive(clap::Args, Debug)]
pub struct FileTimerArgs {
    /// Timer name
    pub name: String,

    /// Timer directory (overrides the config file)
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,
}
