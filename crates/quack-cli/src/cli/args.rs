use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "quack",
    version,
    about = "Run the Quack multi-agent decision engine and normalize its result"
)]
pub struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Invoke the engine for one decision request
    Decide(DecideArgs),
    /// Show the strategies a call would try, in order
    Plan(PlanArgs),
    /// Parse captured engine stdout without running anything
    Extract(ExtractArgs),
    Version,
}

/// Engine location and timeouts, layered over config file or environment.
#[derive(Args, Debug, Clone, Default)]
pub struct EngineArgs {
    /// YAML config file (default: QUACK_ENGINE_* environment)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Engine working directory
    #[arg(long)]
    pub home: Option<PathBuf>,

    /// Timeout for the compiled artifact, in seconds
    #[arg(long, value_name = "SECS")]
    pub compiled_timeout: Option<u64>,

    /// Timeout for the entry script, in seconds
    #[arg(long, value_name = "SECS")]
    pub script_timeout: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct DecideArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Request JSON file, or `-` for stdin (default: auto-select a market)
    #[arg(long, value_name = "FILE")]
    pub request: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Captured stdout, or `-` for stdin
    #[arg(value_name = "FILE", default_value = "-")]
    pub input: PathBuf,

    #[arg(long)]
    pub pretty: bool,
}
