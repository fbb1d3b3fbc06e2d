//! CLI argument parsing for daqinspect

use crate::config::InspectConfig;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for the time-warp report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "daqinspect")]
#[command(version)]
#[command(about = "Inspect DAQ event logs: time-warp checks and hierarchical dumps", long_about = None)]
pub struct Cli {
    /// Read default settings from a TOML file
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a simple event dump for unexpected jumps in time stamps
    Timewarp(TimewarpArgs),
    /// Dump a hierarchical store as simple text columns
    Dump(DumpArgs),
    /// Periodically display all elements of a hierarchical store
    Monitor(MonitorArgs),
}

#[derive(Args, Debug)]
pub struct TimewarpArgs {
    /// Path of the simple dump to check
    #[arg(value_name = "DUMP_PATH")]
    pub dump: PathBuf,

    /// Allowed deviation from the expected time step (default: 10)
    #[arg(short = 't', long, value_name = "TICKS")]
    pub tolerance: Option<u64>,

    /// Only check the first N entries
    #[arg(short = 'n', long, value_name = "N")]
    pub limit: Option<usize>,

    /// Report format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    /// JSON store snapshot to read
    #[arg(default_value = "out.json")]
    pub input: PathBuf,

    /// Text table to write
    #[arg(default_value = "out.txt")]
    pub output: PathBuf,

    /// Prepend global time column (y/yes/1/true)
    #[arg(value_parser = parse_flag)]
    pub global_time: Option<bool>,

    /// Sort lines by their rendered text (y/yes/1/true)
    #[arg(value_parser = parse_flag)]
    pub sort: Option<bool>,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// JSON store snapshot to watch
    #[arg(default_value = "out.json")]
    pub input: PathBuf,

    /// Seconds between refreshes (default: 2)
    #[arg(short = 'i', long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Stop after N refreshes
    #[arg(long, value_name = "N")]
    pub iterations: Option<u64>,
}

/// Boolean-like positional flag: true iff it starts with y, 1 or t
pub fn parse_flag(value: &str) -> Result<bool, String> {
    Ok(matches!(
        value.chars().next().map(|c| c.to_ascii_lowercase()),
        Some('y' | '1' | 't')
    ))
}

impl TimewarpArgs {
    /// Override file settings with flags given on the command line
    pub fn apply(&self, config: &mut InspectConfig) {
        if let Some(tolerance) = self.tolerance {
            config.warp.tolerance = tolerance;
        }
        if self.limit.is_some() {
            config.warp.scan_limit = self.limit;
        }
    }
}

impl DumpArgs {
    pub fn apply(&self, config: &mut InspectConfig) {
        if let Some(global_time) = self.global_time {
            config.export.include_global_time = global_time;
        }
        if let Some(sort) = self.sort {
            config.export.sort_output = sort;
        }
    }
}

impl MonitorArgs {
    pub fn apply(&self, config: &mut InspectConfig) {
        if let Some(interval) = self.interval {
            config.monitor.interval_secs = interval;
        }
        if self.iterations.is_some() {
            config.monitor.iterations = self.iterations;
        }
    }
}
