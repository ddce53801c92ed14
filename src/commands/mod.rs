//! Command modules for the lintscope CLI
//!
//! ## Architecture
//!
//! Each command module implements a single top-level command:
//! - `profile` - Detect languages, frameworks and complexity
//! - `plan` - Generate, validate and export a linter configuration
//! - `run` - Execute the plan in a container and report results
//!
//! All command handlers take their respective `Args` struct from `cli.rs`,
//! the resolved [`EngineSettings`](crate::config::EngineSettings) and a
//! shared `CommandContext` for output format and verbosity.

pub mod plan;
pub mod profile;
pub mod run;

pub use plan::run_plan;
pub use profile::run_profile;
pub use run::{run_run, RunOutcome};

use crate::cli::OutputFormat;

/// Shared context passed to all command handlers
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Output format (text, toon, or json)
    pub format: OutputFormat,
    /// Show verbose output
    pub verbose: bool,
}

impl Default for CommandContext {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            verbose: false,
        }
    }
}

impl CommandContext {
    /// Create a new CommandContext from CLI args
    pub fn from_cli(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }
}

/// Encode a JSON value as proper TOON using the rtoon library
pub fn encode_toon(value: &serde_json::Value) -> String {
    rtoon::encode_default(value).unwrap_or_else(|e| format!("TOON encoding error: {}", e))
}

/// Render `value` as JSON or TOON; `None` for text output
pub(crate) fn render_structured(
    value: &serde_json::Value,
    ctx: &CommandContext,
) -> crate::error::Result<Option<String>> {
    match ctx.format {
        OutputFormat::Json => Ok(Some(serde_json::to_string_pretty(value)? + "\n")),
        OutputFormat::Toon => Ok(Some(encode_toon(value) + "\n")),
        OutputFormat::Text => Ok(None),
    }
}

pub(crate) fn banner(title: &str) -> String {
    format!(
        "═══════════════════════════════════════════\n  {}\n═══════════════════════════════════════════\n\n",
        title
    )
}

pub(crate) fn section(title: &str) -> String {
    format!(
        "\n───────────────────────────────────────────\n  {}\n───────────────────────────────────────────\n",
        title
    )
}
