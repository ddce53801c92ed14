//! Configuration validation.
//!
//! Each check is a standalone function over a [`Configuration`]; `validate`
//! runs them all and folds the findings into a [`ValidationReport`].

use serde::{Deserialize, Serialize};

use crate::lint::memory::{parse_memory_mb, MIN_MEMORY_MB};
use crate::lint::registry;
use crate::lint::types::Configuration;

pub const LINTER_CONFLICT: &str = "LINTER_CONFLICT";
pub const INSUFFICIENT_MEMORY: &str = "INSUFFICIENT_MEMORY";
pub const NO_OUTPUT_FORMATS: &str = "NO_OUTPUT_FORMATS";
pub const LOW_EXECUTION_TIME: &str = "LOW_EXECUTION_TIME";

/// Below this many seconds a full run rarely finishes
pub const MIN_EXECUTION_SECS: u64 = 60;

/// Above this many enabled linters incremental scanning pays off
pub const INCREMENTAL_HINT_THRESHOLD: usize = 15;

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: String,
    pub message: String,
    /// Linters involved, when the issue is about specific tools
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linters: Vec<String>,
}

impl ValidationIssue {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            linters: Vec::new(),
        }
    }

    pub fn with_linters(mut self, linters: Vec<String>) -> Self {
        self.linters = linters;
        self
    }
}

/// Outcome of validating a configuration.
///
/// `valid` is true exactly when `errors` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub suggestions: Vec<String>,
}

impl ValidationReport {
    pub fn has_error(&self, code: &str) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }
}

/// Enabled pairs that must not run together, in enabled order
pub fn conflicting_pairs(config: &Configuration) -> Vec<(String, String)> {
    let names = config.linters.enabled_names();
    let mut pairs = Vec::new();
    for (i, a) in names.iter().enumerate() {
        for b in &names[i + 1..] {
            if registry::conflicts(a, b) {
                pairs.push((a.to_string(), b.to_string()));
            }
        }
    }
    pairs
}

pub fn check_conflicts(config: &Configuration) -> Vec<ValidationIssue> {
    conflicting_pairs(config)
        .into_iter()
        .map(|(a, b)| {
            ValidationIssue::new(LINTER_CONFLICT, format!("{a} conflicts with {b}"))
                .with_linters(vec![a, b])
        })
        .collect()
}

pub fn check_memory(config: &Configuration) -> Option<ValidationIssue> {
    let raw = &config.performance.resource_limits.max_memory;
    match parse_memory_mb(raw) {
        Some(mb) if mb >= MIN_MEMORY_MB => None,
        Some(mb) => Some(ValidationIssue::new(
            INSUFFICIENT_MEMORY,
            format!("Memory limit {raw} ({mb}MB) is below the {MIN_MEMORY_MB}MB minimum"),
        )),
        None => Some(ValidationIssue::new(
            INSUFFICIENT_MEMORY,
            format!("Memory limit '{raw}' is not a recognizable size"),
        )),
    }
}

pub fn check_output_formats(config: &Configuration) -> Option<ValidationIssue> {
    config.reporting.formats.is_empty().then(|| {
        ValidationIssue::new(NO_OUTPUT_FORMATS, "At least one report format is required")
    })
}

pub fn check_execution_time(config: &Configuration) -> Option<ValidationIssue> {
    let secs = config.performance.max_execution_time;
    (secs < MIN_EXECUTION_SECS).then(|| {
        ValidationIssue::new(
            LOW_EXECUTION_TIME,
            format!("Execution time {secs}s may be too short to finish (minimum {MIN_EXECUTION_SECS}s)"),
        )
    })
}

fn suggestions(config: &Configuration) -> Vec<String> {
    let enabled = config.linters.enabled.len();
    let mut out = Vec::new();

    if enabled == 0 {
        out.push("No linters are enabled; check preferences and exclusions".to_string());
    }
    if enabled > INCREMENTAL_HINT_THRESHOLD && !config.performance.incremental_scanning {
        out.push(format!(
            "Enable incremental scanning for {enabled} linters to shorten runs"
        ));
    }
    if (config.performance.parallelism as usize) > enabled.max(1) {
        out.push(format!(
            "Parallelism {} exceeds the {} enabled linters",
            config.performance.parallelism, enabled
        ));
    }
    if !config.security.enabled {
        out.push("Security scanning is disabled".to_string());
    }
    if !config
        .reporting
        .formats
        .iter()
        .any(|f| f.is_machine_readable())
    {
        out.push("Add a machine-readable report format (json or sarif)".to_string());
    }
    out
}

/// Run every check against `config`
pub fn validate(config: &Configuration) -> ValidationReport {
    let mut errors = check_conflicts(config);
    errors.extend(check_memory(config));
    errors.extend(check_output_formats(config));

    let warnings: Vec<ValidationIssue> = check_execution_time(config).into_iter().collect();

    ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings,
        suggestions: suggestions(config),
    }
}
