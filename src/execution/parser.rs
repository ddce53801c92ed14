//! Best-effort extraction of per-linter results from container output.
//!
//! A JSON report embedded in stdout wins. Otherwise status lines, the
//! summary table and `file:line:col` issue lines are scraped. Nothing here
//! fails the run: problems become warnings on the parsed output.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::error::ParseError;
use crate::execution::results::{IssueSeverity, LinterIssue, LinterResult, LinterStatus};

/// What could be recovered from one execution's output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOutput {
    pub linters: Vec<LinterResult>,
    pub warnings: Vec<String>,
}

// ============================================================================
// JSON report
// ============================================================================

#[derive(Debug, Deserialize)]
struct JsonReport {
    linters: Vec<JsonLinter>,
}

#[derive(Debug, Deserialize)]
struct JsonLinter {
    #[serde(alias = "linter_name", alias = "linter")]
    name: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, alias = "files_number", alias = "files")]
    files_linted: usize,
    #[serde(default, alias = "total_number_errors", alias = "errors_number")]
    errors: usize,
    #[serde(default, alias = "total_number_warnings", alias = "warnings_number")]
    warnings: usize,
    #[serde(default, alias = "fixed_number")]
    fixable: usize,
    #[serde(default, alias = "elapsed_time_s")]
    elapsed: Option<f64>,
    #[serde(default)]
    issues: Vec<JsonIssue>,
}

#[derive(Debug, Deserialize)]
struct JsonIssue {
    #[serde(alias = "path")]
    file: String,
    #[serde(default)]
    line: Option<u32>,
    #[serde(default, alias = "col")]
    column: Option<u32>,
    #[serde(default, alias = "level")]
    severity: Option<String>,
    #[serde(default, alias = "rule_id", alias = "code")]
    rule: Option<String>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    fixable: bool,
}

fn status_from(raw: Option<&str>, errors: usize) -> LinterStatus {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        Some("success" | "ok" | "passed") => LinterStatus::Success,
        Some(_) => LinterStatus::Failed,
        None if errors > 0 => LinterStatus::Failed,
        None => LinterStatus::Success,
    }
}

impl From<JsonLinter> for LinterResult {
    fn from(linter: JsonLinter) -> Self {
        LinterResult {
            status: status_from(linter.status.as_deref(), linter.errors),
            name: linter.name,
            files_linted: linter.files_linted,
            errors: linter.errors,
            warnings: linter.warnings,
            fixable: linter.fixable,
            duration_ms: linter.elapsed.map(|s| (s * 1000.0).round() as u64),
            issues: linter
                .issues
                .into_iter()
                .map(|i| LinterIssue {
                    file: i.file,
                    line: i.line,
                    column: i.column,
                    severity: IssueSeverity::normalize(i.severity.as_deref().unwrap_or("")),
                    rule: i.rule,
                    message: i.message,
                    fixable: i.fixable,
                })
                .collect(),
        }
    }
}

/// First line-leading JSON object carrying a `linters` key.
///
/// `None` when there is no candidate at all.
fn parse_json_report(stdout: &str) -> Option<Result<Vec<LinterResult>, ParseError>> {
    let mut offset = 0;
    for line in stdout.split_inclusive('\n') {
        let start = offset + (line.len() - line.trim_start().len());
        offset += line.len();
        if !line.trim_start().starts_with('{') || !line.contains("\"linters\"") {
            continue;
        }

        let mut stream = serde_json::Deserializer::from_str(&stdout[start..]).into_iter::<JsonReport>();
        return Some(match stream.next() {
            Some(Ok(report)) => Ok(report.linters.into_iter().map(LinterResult::from).collect()),
            Some(Err(e)) => Err(ParseError::new(format!("embedded JSON report: {e}"))),
            None => Err(ParseError::new("embedded JSON report is empty")),
        });
    }
    None
}

// ============================================================================
// Line extraction
// ============================================================================

static STATUS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(✅|❌|✔|✖)\s*Linted \[([A-Z0-9_]+)\] files with \[([\w.\-]+)\](.*)$")
        .expect("valid status regex")
});

static ERRORS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s+errors?").expect("valid errors regex"));

static WARNINGS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s+warnings?").expect("valid warnings regex"));

static ELAPSED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((\d+(?:\.\d+)?)s\)").expect("valid elapsed regex"));

static ISSUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?P<file>[^\s:|\[\]()]+):(?P<line>\d+)(?::(?P<col>\d+))?:?\s+(?:\[?(?P<sev>error|warning|warn|info|note|major|minor|critical|blocker|fatal)\]?:?\s+)?(?P<msg>.+)$",
    )
    .expect("valid issue regex")
});

static RULE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([\w@/\-.]+)\)\s*$|\[([\w@/\-.]+)\]\s*$").expect("valid rule regex"));

fn capture_usize(re: &Regex, text: &str) -> usize {
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// A `| ✅ DESCRIPTOR | linter | mode | files | fixed | errors | warnings | time |` row
fn parse_table_row(line: &str) -> Option<LinterResult> {
    let line = line.trim();
    if !line.starts_with('|') {
        return None;
    }
    let cells: Vec<&str> = line.trim_matches('|').split('|').map(str::trim).collect();
    if cells.len() < 7 {
        return None;
    }

    let status = if cells[0].starts_with('✅') {
        LinterStatus::Success
    } else if cells[0].starts_with('❌') {
        LinterStatus::Failed
    } else {
        return None;
    };

    let number = |cell: &str| cell.trim_end_matches('s').parse::<usize>().unwrap_or(0);
    let mut result = LinterResult::new(cells[1], status);
    result.files_linted = number(cells[3]);
    result.fixable = number(cells[4]);
    result.errors = number(cells[5]);
    result.warnings = number(cells[6]);
    result.duration_ms = cells
        .get(7)
        .and_then(|c| c.trim_end_matches('s').parse::<f64>().ok())
        .map(|s| (s * 1000.0).round() as u64);
    Some(result)
}

/// A relative path or a bare file name with an extension
fn looks_like_path(file: &str) -> bool {
    if file.contains('/') || file.contains('\\') {
        return true;
    }
    match file.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}

fn parse_issue(line: &str) -> Option<LinterIssue> {
    let caps = ISSUE_RE.captures(line.trim_end())?;
    let file = caps.name("file")?.as_str();
    if !looks_like_path(file) {
        return None;
    }
    let message = caps.name("msg")?.as_str().trim().to_string();
    let rule = RULE_RE
        .captures(&message)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().to_string());

    Some(LinterIssue {
        file: file.to_string(),
        line: caps.name("line").and_then(|m| m.as_str().parse().ok()),
        column: caps.name("col").and_then(|m| m.as_str().parse().ok()),
        severity: IssueSeverity::normalize(caps.name("sev").map_or("", |m| m.as_str())),
        fixable: message.contains("[*]") || message.to_ascii_lowercase().contains("fixable"),
        rule,
        message,
    })
}

fn parse_lines(stdout: &str) -> Vec<LinterResult> {
    let mut by_name: BTreeMap<String, usize> = BTreeMap::new();
    let mut linters: Vec<LinterResult> = Vec::new();
    let mut current: Option<usize> = None;

    let mut slot = |linters: &mut Vec<LinterResult>, result: LinterResult| -> usize {
        match by_name.get(&result.name) {
            Some(&idx) => {
                let existing = &mut linters[idx];
                existing.status = result.status;
                existing.files_linted = existing.files_linted.max(result.files_linted);
                existing.errors = existing.errors.max(result.errors);
                existing.warnings = existing.warnings.max(result.warnings);
                existing.fixable = existing.fixable.max(result.fixable);
                existing.duration_ms = existing.duration_ms.or(result.duration_ms);
                idx
            }
            None => {
                by_name.insert(result.name.clone(), linters.len());
                linters.push(result);
                linters.len() - 1
            }
        }
    };

    for line in stdout.lines() {
        if let Some(caps) = STATUS_RE.captures(line) {
            let success = matches!(&caps[1], "✅" | "✔");
            let tail = caps.get(4).map_or("", |m| m.as_str());
            let mut result = LinterResult::new(
                &caps[3],
                if success {
                    LinterStatus::Success
                } else {
                    LinterStatus::Failed
                },
            );
            result.errors = capture_usize(&ERRORS_RE, tail);
            result.warnings = capture_usize(&WARNINGS_RE, tail);
            result.duration_ms = ELAPSED_RE
                .captures(tail)
                .and_then(|c| c[1].parse::<f64>().ok())
                .map(|s| (s * 1000.0).round() as u64);
            current = Some(slot(&mut linters, result));
        } else if let Some(row) = parse_table_row(line) {
            slot(&mut linters, row);
            current = None;
        } else if line.trim_start().starts_with(['|', '+']) {
            // summary table borders and header
            current = None;
        } else if let (Some(idx), Some(issue)) = (current, parse_issue(line)) {
            linters[idx].issues.push(issue);
        }
    }

    linters
}

/// Parse one execution's stdout
pub fn parse_output(stdout: &str) -> ParsedOutput {
    let mut warnings = Vec::new();

    match parse_json_report(stdout) {
        Some(Ok(linters)) => {
            debug!("Parsed {} linters from embedded JSON report", linters.len());
            return ParsedOutput { linters, warnings };
        }
        Some(Err(e)) => {
            debug!("{}; falling back to line extraction", e);
            warnings.push(e.to_string());
        }
        None => {}
    }

    let linters = parse_lines(stdout);
    if linters.is_empty() && !stdout.trim().is_empty() {
        warnings.push(ParseError::new("no linter results recognized in output").to_string());
    }
    ParsedOutput { linters, warnings }
}

// ============================================================================
// Progress detection
// ============================================================================

/// Spots enabled linter names in streamed output lines
#[derive(Debug, Clone)]
pub struct ToolMatcher {
    re: Option<Regex>,
}

impl ToolMatcher {
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        let mut names: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();
        // Longer names first so "eslint-plugin-react" beats "eslint"
        names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        names.dedup();

        let re = if names.is_empty() {
            None
        } else {
            let alternation = names
                .iter()
                .map(|n| regex::escape(n))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!(r"(?i)\[({alternation})\]|\b(?:Linting|Running)\b.*?\b({alternation})\b")).ok()
        };
        Self { re }
    }

    /// Linter a progress line is about, if any
    pub fn detect(&self, line: &str) -> Option<String> {
        let caps = self.re.as_ref()?.captures(line)?;
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_ascii_lowercase())
    }
}
