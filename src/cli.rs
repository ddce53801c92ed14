//! CLI argument definitions using clap with subcommand architecture
//!
//! Global flags configure output and the container runtime; each subcommand
//! maps to one engine stage: `profile`, `plan`, `run`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::lint::PerformanceProfile;

/// Repository profiler and adaptive multi-linter engine
#[derive(Parser, Debug)]
#[command(name = "lintscope")]
#[command(about = "Profiles a repository, plans a linter configuration and runs it in a container")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (applies to all commands)
    #[arg(short, long, default_value = "json", value_enum, global = true)]
    pub format: OutputFormat,

    /// Show verbose output (info-level logs on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Container runtime binary
    #[arg(long, env = "LINTSCOPE_RUNTIME", default_value = "docker", global = true)]
    pub runtime: String,

    /// Linting image
    #[arg(
        long,
        env = "LINTSCOPE_IMAGE",
        default_value = crate::execution::DEFAULT_IMAGE,
        global = true
    )]
    pub image: String,

    /// Seconds a stopping container gets before it is killed
    #[arg(long, env = "LINTSCOPE_GRACE_PERIOD", default_value = "10", global = true)]
    pub grace_period: u64,

    /// Maximum directory depth for the profiling walk
    #[arg(long, env = "LINTSCOPE_MAX_DEPTH", default_value = "12", global = true)]
    pub max_depth: usize,
}

// ============================================
// Main Commands Enum
// ============================================

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect languages, frameworks, config files and complexity
    #[command(visible_alias = "p")]
    Profile(ProfileArgs),

    /// Generate and validate a linter configuration
    Plan(PlanArgs),

    /// Execute the plan in a container and report results
    #[command(visible_alias = "r")]
    Run(RunArgs),
}

// ============================================
// Subcommand Arguments
// ============================================

#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// Repository root
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Repository root
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Preferences file (TOML or JSON)
    #[arg(long, value_name = "FILE")]
    pub prefs: Option<PathBuf>,

    /// Override the performance profile from preferences
    #[arg(long, value_enum)]
    pub profile: Option<PerformanceProfile>,

    /// Print the KEY=value export instead of the configuration
    #[arg(long)]
    pub env: bool,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Repository root
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Wall-clock limit overriding the planned one (e.g. 120, 120s, 5m)
    #[arg(long, value_name = "DURATION", value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// Override the performance profile from preferences
    #[arg(long, value_enum)]
    pub profile: Option<PerformanceProfile>,

    /// Preferences file (TOML or JSON)
    #[arg(long, value_name = "FILE")]
    pub prefs: Option<PathBuf>,

    /// Stream execution events to stderr as JSON lines
    #[arg(long)]
    pub events: bool,
}

/// Output format options
#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// JSON - standard JSON output for machine parsing (default)
    #[default]
    Json,
    /// TOON (Token-Oriented Object Notation) - token-efficient format
    Toon,
    /// Human-readable text with visual formatting
    #[value(alias = "pretty")]
    Text,
}

// ============================================
// Helper Implementations
// ============================================

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Parse `120`, `120s`, `5m` or `1h` into a duration
pub fn parse_timeout(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let (digits, multiplier) = match raw.char_indices().last() {
        Some((idx, 's')) => (&raw[..idx], 1),
        Some((idx, 'm')) => (&raw[..idx], 60),
        Some((idx, 'h')) => (&raw[..idx], 3600),
        _ => (raw, 1),
    };
    let value: u64 = digits
        .trim()
        .parse()
        .map_err(|_| format!("invalid duration '{}': expected e.g. 120, 120s or 5m", raw))?;
    if value == 0 {
        return Err("duration must be greater than zero".to_string());
    }
    Ok(Duration::from_secs(value * multiplier))
}
