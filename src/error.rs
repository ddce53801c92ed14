//! Error types and exit codes for lintscope

use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;

use crate::lint::validator::ValidationIssue;

/// Repository inspection failures.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A configuration that is still invalid after the automatic fix pass.
#[derive(Error, Debug)]
#[error("Configuration invalid after auto-fix: {}", summarize(.issues))]
pub struct ConfigValidationError {
    pub issues: Vec<ValidationIssue>,
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{} ({})", i.code, i.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failures while driving the container process.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Container runtime '{runtime}' is not available")]
    RuntimeUnavailable { runtime: String },

    #[error("Engine busy: an execution is already in progress")]
    Busy,

    #[error("Failed to prepare execution in {path}: {source}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Linting container exited with code {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("Execution timed out after {after_secs}s")]
    TimedOut { after_secs: u64 },

    #[error("Execution cancelled")]
    Cancelled,
}

/// Malformed tool output or exported plan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Parse error: {message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Main error type for lintscope operations
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    ConfigValidation(#[from] ConfigValidationError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Invalid preferences file {path}: {message}")]
    Preferences { path: PathBuf, message: String },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Convert error to the CLI exit code:
    /// - 1: Unreadable path / bad input files
    /// - 2: Configuration invalid after auto-fix
    /// - 3: Execution timed out or was cancelled
    /// - 4: Container runtime unavailable
    /// - 5: Any other execution failure
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }

    /// Numeric form of [`EngineError::exit_code`].
    pub fn exit_status(&self) -> u8 {
        match self {
            Self::Analysis(_) => 1,
            Self::ConfigValidation(_) => 2,
            Self::Execution(ExecutionError::TimedOut { .. } | ExecutionError::Cancelled) => 3,
            Self::Execution(ExecutionError::RuntimeUnavailable { .. }) => 4,
            Self::Execution(_) => 5,
            Self::Parse(_) | Self::Preferences { .. } | Self::Serialization(_) | Self::Io(_) => 1,
        }
    }
}

/// Result type alias for lintscope operations
pub type Result<T> = std::result::Result<T, EngineError>;
