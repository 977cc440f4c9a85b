//! CLI error types with miette diagnostics.
//!
//! Maps config and transport failures into user-facing errors with
//! actionable help text, plus the exit codes the trigger layer (cron,
//! CI) keys off.

use miette::Diagnostic;
use thiserror::Error;

/// Exit codes observed by the scheduler driving this tool.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const AUTH: i32 = 4;
    /// At least one rule failed to reconcile; the rest were applied.
    pub const PARTIAL: i32 = 5;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(fwsync::config))]
    Config(#[from] fwsync_config::ConfigError),

    #[error("No target projects configured")]
    #[diagnostic(
        code(fwsync::no_projects),
        help(
            "Set `projects = [\"...\"]` in the config file, pass --project,\n\
             or give each payload entry its own \"project\" field."
        )
    )]
    NoProjects,

    #[error("No provider token available")]
    #[diagnostic(
        code(fwsync::no_token),
        help("Export the token in the configured environment variable (default: FWSYNC_TOKEN).")
    )]
    NoToken {
        #[source]
        source: fwsync_config::ConfigError,
    },

    // ── Payload ──────────────────────────────────────────────────────
    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(
        code(fwsync::payload),
        help("The payload must be `{{\"configs\": [ ... ]}}`. Check the file and try again.")
    )]
    Payload(#[from] serde_json::Error),

    #[error("Payload validation failed: {count} spec(s) rejected")]
    #[diagnostic(code(fwsync::payload_invalid))]
    PayloadInvalid { count: usize },

    // ── Transport ────────────────────────────────────────────────────
    #[error("Failed to build HTTP client: {message}")]
    #[diagnostic(code(fwsync::transport))]
    Transport { message: String },

    #[error("Fetch failed: {message}")]
    #[diagnostic(code(fwsync::fetch))]
    Fetch { message: String },

    // ── Reconciliation ───────────────────────────────────────────────
    #[error("{failed} of {total} rule(s) failed to reconcile")]
    #[diagnostic(
        code(fwsync::partial_failure),
        help("Re-run with -v for per-rule details; the pass is safe to retry wholesale.")
    )]
    PartialFailure { failed: usize, total: usize },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::NoProjects => exit_code::CONFIG,
            Self::NoToken { .. } => exit_code::AUTH,
            Self::Payload(_) | Self::PayloadInvalid { .. } => exit_code::USAGE,
            Self::PartialFailure { .. } => exit_code::PARTIAL,
            _ => exit_code::GENERAL,
        }
    }
}
