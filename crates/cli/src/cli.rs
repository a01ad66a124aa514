//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// WildGuard - wildlife rescue dispatch for ranger stations
#[derive(Parser, Debug)]
#[command(
    name = "wildguard",
    author,
    version,
    about = "Wildlife rescue dispatch across ranger stations",
    long_about = "Runs a sanctuary of ranger-station actors.\n\n\
                  Field reports become incidents; every station is asked for its \n\
                  availability and the nearest capable one is dispatched, or the \n\
                  incident is escalated."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "WILDGUARD_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "WILDGUARD_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the sanctuary and feed it reports
    Run(RunArgs),

    /// Validate a park blueprint without running
    Validate(ValidateArgs),

    /// Display blueprint information
    Info(InfoArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Park blueprint (TOML or JSON); the bundled Yala blueprint when omitted
    #[arg(short, long, env = "WILDGUARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// JSON-lines file of raw reports ({text, gps, reporter})
    #[arg(long, env = "WILDGUARD_REPORTS")]
    pub reports: Option<PathBuf>,

    /// Number of synthetic reports to generate when no file is given
    #[arg(long, default_value = "3", env = "WILDGUARD_SYNTHETIC")]
    pub synthetic: usize,

    /// Seed for synthetic reports
    #[arg(long, env = "WILDGUARD_SEED")]
    pub seed: Option<u64>,

    /// Delay between reports in milliseconds
    #[arg(long, default_value = "500", env = "WILDGUARD_INTERVAL_MS")]
    pub interval_ms: u64,

    /// Time to let the last round and treatments finish, in milliseconds
    #[arg(long, default_value = "5000", env = "WILDGUARD_SETTLE_MS")]
    pub settle_ms: u64,

    /// Overall run timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "WILDGUARD_TIMEOUT")]
    pub timeout: u64,

    #[arg(long, value_enum, default_value = "stub", env = "WILDGUARD_ORACLE")]
    pub oracle: OracleKind,

    /// Override the blueprint's oracle endpoint
    #[arg(long, env = "WILDGUARD_ORACLE_ENDPOINT")]
    pub oracle_endpoint: Option<String>,

    /// Also write blackboard records to this JSON-lines file
    #[arg(long, env = "WILDGUARD_BLACKBOARD_FILE")]
    pub blackboard_file: Option<PathBuf>,

    /// Request veterinary treatment after every dispatch
    #[arg(long, env = "WILDGUARD_VET_TRIGGER")]
    pub vet_trigger: bool,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", env = "WILDGUARD_METRICS_PORT")]
    pub metrics_port: u16,
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Blueprint to validate; the bundled one when omitted
    #[arg(short, long, env = "WILDGUARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct InfoArgs {
    #[arg(short, long, env = "WILDGUARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show per-station vehicles and equipment
    #[arg(long)]
    pub stations: bool,
}

#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OracleKind {
    /// Deterministic offline answers
    #[default]
    Stub,
    /// Remote agent gateway over HTTP
    Http,
}
