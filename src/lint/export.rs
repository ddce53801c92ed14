//! `KEY=value` rendering of a [`Configuration`] for the linting container.
//!
//! The same pairs are written to `lint.env` and passed as container
//! environment variables. `parse_export` reads them back.

use std::collections::BTreeMap;

use crate::error::ParseError;
use crate::lint::types::{
    CacheStrategy, Configuration, PerformanceConfig, ReportFormat, ResourceLimits, Severity,
};

pub const ENABLE_LINTERS: &str = "ENABLE_LINTERS";
pub const DISABLE_LINTERS: &str = "DISABLE_LINTERS";
pub const PARALLEL: &str = "PARALLEL";
pub const PARALLEL_PROCESS_NUMBER: &str = "PARALLEL_PROCESS_NUMBER";
pub const MAX_EXECUTION_TIME: &str = "MAX_EXECUTION_TIME";
pub const MAX_MEMORY: &str = "MAX_MEMORY";
pub const MAX_CPUS: &str = "MAX_CPUS";
pub const CACHE_STRATEGY: &str = "CACHE_STRATEGY";
pub const INCREMENTAL_SCAN: &str = "INCREMENTAL_SCAN";
pub const REPORT_FORMATS: &str = "REPORT_FORMATS";
pub const REPORT_OUTPUT_FOLDER: &str = "REPORT_OUTPUT_FOLDER";
pub const SECURITY_SCAN: &str = "SECURITY_SCAN";
pub const SECURITY_SEVERITY: &str = "SECURITY_SEVERITY";
pub const LOG_LEVEL: &str = "LOG_LEVEL";

const HEADER: &str = "# lintscope execution plan";

/// Settings recovered from an exported plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedPlan {
    pub enabled: Vec<String>,
    pub disabled: Vec<String>,
    pub performance: PerformanceConfig,
    pub report_formats: Vec<ReportFormat>,
    pub output_dir: String,
    pub security_scan: bool,
    pub security_severity: Severity,
}

fn join(items: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    items
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Key/value pairs for the container, sorted by key
pub fn env_pairs(config: &Configuration) -> BTreeMap<&'static str, String> {
    let perf = &config.performance;
    let mut env = BTreeMap::new();

    env.insert(ENABLE_LINTERS, join(config.linters.enabled_names()));
    env.insert(DISABLE_LINTERS, join(&config.linters.disabled));
    env.insert(PARALLEL, (perf.parallelism > 1).to_string());
    env.insert(PARALLEL_PROCESS_NUMBER, perf.parallelism.to_string());
    env.insert(MAX_EXECUTION_TIME, perf.max_execution_time.to_string());
    env.insert(MAX_MEMORY, perf.resource_limits.max_memory.clone());
    env.insert(MAX_CPUS, perf.resource_limits.max_cpus.to_string());
    env.insert(CACHE_STRATEGY, perf.cache_strategy.as_str().to_string());
    env.insert(INCREMENTAL_SCAN, perf.incremental_scanning.to_string());
    env.insert(
        REPORT_FORMATS,
        join(config.reporting.formats.iter().map(|f| f.as_str())),
    );
    env.insert(REPORT_OUTPUT_FOLDER, config.reporting.output_dir.clone());
    env.insert(SECURITY_SCAN, config.security.enabled.to_string());
    env.insert(
        SECURITY_SEVERITY,
        config.security.severity_threshold.as_str().to_string(),
    );
    env.insert(LOG_LEVEL, "INFO".to_string());
    env
}

/// Render `config` as a `KEY=value` document
pub fn export(config: &Configuration) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for (key, value) in env_pairs(config) {
        out.push_str(key);
        out.push('=');
        out.push_str(&value);
        out.push('\n');
    }
    out
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

struct Fields(BTreeMap<String, String>);

impl Fields {
    fn raw(&self, key: &str) -> Result<&str, ParseError> {
        self.0
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ParseError::new(format!("missing {key}")))
    }

    fn parsed<T: std::str::FromStr>(&self, key: &str) -> Result<T, ParseError> {
        let raw = self.raw(key)?;
        raw.parse()
            .map_err(|_| ParseError::new(format!("invalid {key}: '{raw}'")))
    }
}

/// Read an exported plan back. Blank lines and `#` comments are ignored.
pub fn parse_export(text: &str) -> Result<ExportedPlan, ParseError> {
    let mut map = BTreeMap::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| ParseError::new(format!("line {}: expected KEY=value", idx + 1)))?;
        map.insert(key.trim().to_string(), value.trim().to_string());
    }
    let fields = Fields(map);

    let report_formats = split_list(fields.raw(REPORT_FORMATS)?)
        .iter()
        .map(|f| {
            f.parse::<ReportFormat>()
                .map_err(|_| ParseError::new(format!("unknown report format '{f}'")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExportedPlan {
        enabled: split_list(fields.raw(ENABLE_LINTERS)?),
        disabled: split_list(fields.raw(DISABLE_LINTERS)?),
        performance: PerformanceConfig {
            max_execution_time: fields.parsed(MAX_EXECUTION_TIME)?,
            parallelism: fields.parsed(PARALLEL_PROCESS_NUMBER)?,
            resource_limits: ResourceLimits {
                max_memory: fields.raw(MAX_MEMORY)?.to_string(),
                max_cpus: fields.parsed(MAX_CPUS)?,
            },
            cache_strategy: fields.parsed::<CacheStrategy>(CACHE_STRATEGY)?,
            incremental_scanning: fields.parsed(INCREMENTAL_SCAN)?,
        },
        report_formats,
        output_dir: fields.raw(REPORT_OUTPUT_FOLDER)?.to_string(),
        security_scan: fields.parsed(SECURITY_SCAN)?,
        security_severity: fields.parsed(SECURITY_SEVERITY)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::registry::find;

    fn sample() -> Configuration {
        let mut config = Configuration::default();
        config.linters.enabled = vec![
            find("eslint").unwrap().instantiate(None),
            find("prettier").unwrap().instantiate(None),
        ];
        config.linters.disabled = vec!["eslint-plugin-prettier".into()];
        config.reporting.formats = vec![ReportFormat::Json, ReportFormat::Text];
        config
    }

    #[test]
    fn test_export_is_sorted() {
        let text = export(&sample());
        let keys: Vec<&str> = text
            .lines()
            .skip(1)
            .filter_map(|l| l.split_once('=').map(|(k, _)| k))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert!(text.contains("ENABLE_LINTERS=eslint,prettier\n"));
        assert!(text.contains("MAX_MEMORY=2GB\n"));
    }

    #[test]
    fn test_parse_recovers_plan() {
        let config = sample();
        let plan = parse_export(&export(&config)).unwrap();
        assert_eq!(plan.enabled, vec!["eslint", "prettier"]);
        assert_eq!(plan.disabled, vec!["eslint-plugin-prettier"]);
        assert_eq!(plan.performance, config.performance);
        assert_eq!(plan.report_formats, config.reporting.formats);
        assert!(plan.security_scan);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_export("ENABLE_LINTERS\n").is_err());
        let err = parse_export("# only a comment\n").unwrap_err();
        assert!(err.message.contains("missing"));
    }
}
