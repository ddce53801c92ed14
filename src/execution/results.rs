//! Execution results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::lint::Configuration;
use crate::profile::LanguageProfile;

/// Normalized issue severity
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl IssueSeverity {
    /// Map a tool-reported level onto the normalized scale
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ERROR" | "CRITICAL" | "BLOCKER" | "FATAL" => IssueSeverity::Critical,
            "MAJOR" | "WARNING" | "WARN" => IssueSeverity::High,
            "INFO" | "MINOR" => IssueSeverity::Medium,
            _ => IssueSeverity::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSeverity::Low => "low",
            IssueSeverity::Medium => "medium",
            IssueSeverity::High => "high",
            IssueSeverity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinterIssue {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    pub severity: IssueSeverity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    pub message: String,
    #[serde(default)]
    pub fixable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinterStatus {
    Success,
    Failed,
}

/// Outcome of one executed tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinterResult {
    pub name: String,
    pub status: LinterStatus,
    pub files_linted: usize,
    pub errors: usize,
    pub warnings: usize,
    pub fixable: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<LinterIssue>,
}

impl LinterResult {
    pub fn new(name: impl Into<String>, status: LinterStatus) -> Self {
        Self {
            name: name.into(),
            status,
            files_linted: 0,
            errors: 0,
            warnings: 0,
            fixable: 0,
            duration_ms: None,
            issues: Vec::new(),
        }
    }

    /// Issue count, preferring reported counters over collected issues
    pub fn issue_count(&self) -> usize {
        (self.errors + self.warnings).max(self.issues.len())
    }
}

/// Aggregate counts across all tools
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintingSummary {
    pub total_linters: usize,
    pub passed_linters: usize,
    pub failed_linters: usize,
    pub files_analyzed: usize,
    pub total_issues: usize,
    pub fixable_issues: usize,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub by_severity: BTreeMap<IssueSeverity, usize>,
}

impl LintingSummary {
    pub fn from_linters(linters: &[LinterResult]) -> Self {
        let mut summary = LintingSummary {
            total_linters: linters.len(),
            ..Default::default()
        };
        for linter in linters {
            match linter.status {
                LinterStatus::Success => summary.passed_linters += 1,
                LinterStatus::Failed => summary.failed_linters += 1,
            }
            summary.files_analyzed += linter.files_linted;
            summary.total_issues += linter.issue_count();
            summary.fixable_issues += linter
                .fixable
                .max(linter.issues.iter().filter(|i| i.fixable).count());
            for issue in &linter.issues {
                *summary.by_severity.entry(issue.severity).or_default() += 1;
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub duration_ms: u64,
    pub time_budget_secs: u64,
    pub parallelism: u32,
    pub linters_executed: usize,
    pub output_lines: usize,
}

/// Record of one completed execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintingResults {
    pub execution_id: String,
    /// Completion time (RFC 3339)
    pub timestamp: String,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<LanguageProfile>,
    pub configuration: Configuration,
    pub linters: Vec<LinterResult>,
    pub summary: LintingSummary,
    pub performance: PerformanceMetrics,
    /// Non-fatal problems, e.g. output that could not be fully parsed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl LintingResults {
    pub fn has_issues(&self) -> bool {
        self.summary.total_issues > 0
    }
}
