//! Clap derive structures for the `fwsync` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fwsync -- keep cloud firewall rules in sync with published IP lists
#[derive(Debug, Parser)]
#[command(
    name = "fwsync",
    version,
    about = "Reconcile cloud firewall rules against vendor-published IP allow-lists",
    long_about = "Reconciles named firewall rules against dynamic IP allow-lists.\n\n\
        Each rule spec names an endpoint URL publishing one IP/CIDR per line;\n\
        fwsync fetches the list, compares it with the existing rule, and\n\
        creates or updates the rule only when something actually changed.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the config file (default: platform config dir)
    #[arg(long, env = "FWSYNC_CONFIG_FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Target project (repeatable; overrides the config file)
    #[arg(long, short = 'p', global = true)]
    pub project: Vec<String>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Accept self-signed TLS certificates (test endpoints only)
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one reconciliation pass from a payload file
    #[command(alias = "run")]
    Apply(ApplyArgs),

    /// Validate a payload without any network traffic
    Validate(ValidateArgs),

    /// Fetch an IP list endpoint and print its entries
    Fetch(FetchArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Payload JSON file ("-" reads stdin)
    #[arg(long, short = 'f')]
    pub payload: PathBuf,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Payload JSON file ("-" reads stdin)
    #[arg(long, short = 'f')]
    pub payload: PathBuf,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// IP list URL
    pub url: String,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
