//! Core types for the lint planning module.
//!
//! - `Severity` / `LinterCategory` - ordinal enums used for filtering
//! - `LinterTemplate` - static catalog entry
//! - `LinterConfiguration` - a template bound to a language, enabled or not
//! - `Configuration` - the validated, tuned execution plan
//! - `UserPreferences` - caller-supplied tuning input

use std::collections::BTreeMap;

use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::lang::Lang;

// ============================================================================
// Core Enums
// ============================================================================

/// Severity level, totally ordered: info < warning < error
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" | "note" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" | "err" => Ok(Severity::Error),
            _ => Err(()),
        }
    }
}

/// Category of linting tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinterCategory {
    /// Language-level linting (style, bugs)
    Language,
    Security,
    Quality,
    /// Code formatting
    Format,
    Documentation,
    Performance,
    Accessibility,
}

impl LinterCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinterCategory::Language => "language",
            LinterCategory::Security => "security",
            LinterCategory::Quality => "quality",
            LinterCategory::Format => "format",
            LinterCategory::Documentation => "documentation",
            LinterCategory::Performance => "performance",
            LinterCategory::Accessibility => "accessibility",
        }
    }
}

// ============================================================================
// Templates
// ============================================================================

/// Static, read-only catalog entry describing a tool
#[derive(Debug)]
pub struct LinterTemplate {
    pub name: &'static str,
    /// Languages the tool lints; empty together with `frameworks` means any
    pub languages: &'static [Lang],
    /// Frameworks that pull this tool in
    pub frameworks: &'static [&'static str],
    pub category: LinterCategory,
    pub severity: Severity,
    pub rules: &'static [&'static str],
    pub include: &'static [&'static str],
    pub exclude: &'static [&'static str],
    pub conflicts_with: &'static [&'static str],
}

impl LinterTemplate {
    /// Applies regardless of language or framework
    pub fn is_universal(&self) -> bool {
        self.languages.is_empty() && self.frameworks.is_empty()
    }

    pub fn supports_language(&self, lang: Lang) -> bool {
        self.languages.contains(&lang)
    }

    pub fn supports_framework(&self, framework: &str) -> bool {
        self.frameworks.contains(&framework)
    }

    /// Whether a repository-relative path falls inside this tool's scope
    pub fn matches_file(&self, relative: &str) -> bool {
        let hit = |patterns: &[&str]| {
            patterns
                .iter()
                .filter_map(|p| Pattern::new(p).ok())
                .any(|p| p.matches(relative))
        };
        hit(self.include) && !hit(self.exclude)
    }

    /// Materialize an enabled configuration bound to `language`
    pub fn instantiate(&self, language: Option<Lang>) -> LinterConfiguration {
        LinterConfiguration {
            name: self.name.to_string(),
            language,
            category: self.category,
            severity: self.severity,
            enabled: true,
            rules: self.rules.iter().map(|r| r.to_string()).collect(),
            include: self.include.iter().map(|r| r.to_string()).collect(),
            exclude: self.exclude.iter().map(|r| r.to_string()).collect(),
        }
    }
}

// ============================================================================
// Configuration Types
// ============================================================================

/// A template instance bound to a language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinterConfiguration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Lang>,
    pub category: LinterCategory,
    pub severity: Severity,
    pub enabled: bool,
    #[serde(default)]
    pub rules: Vec<String>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Enabled tools, names switched off, and per-tool rule overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinterSet {
    pub enabled: Vec<LinterConfiguration>,
    pub disabled: Vec<String>,
    #[serde(default)]
    pub custom_rules: BTreeMap<String, Vec<String>>,
}

impl LinterSet {
    pub fn enabled_names(&self) -> Vec<&str> {
        self.enabled.iter().map(|l| l.name.as_str()).collect()
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.iter().any(|l| l.name == name)
    }

    /// Move `name` from enabled to disabled (no-op when absent)
    pub fn disable(&mut self, name: &str) {
        if let Some(pos) = self.enabled.iter().position(|l| l.name == name) {
            self.enabled.remove(pos);
        }
        if !self.disabled.iter().any(|d| d == name) {
            self.disabled.push(name.to_string());
        }
    }
}

/// Result caching behaviour inside the linting container
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStrategy {
    None,
    #[default]
    Conservative,
    Aggressive,
}

impl CacheStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStrategy::None => "none",
            CacheStrategy::Conservative => "conservative",
            CacheStrategy::Aggressive => "aggressive",
        }
    }
}

impl std::str::FromStr for CacheStrategy {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(CacheStrategy::None),
            "conservative" => Ok(CacheStrategy::Conservative),
            "aggressive" => Ok(CacheStrategy::Aggressive),
            _ => Err(()),
        }
    }
}

/// Container resource bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Human-readable size, e.g. "2GB" or "512MB"
    pub max_memory: String,
    pub max_cpus: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Wall-clock budget in seconds
    pub max_execution_time: u64,
    pub parallelism: u32,
    pub resource_limits: ResourceLimits,
    pub cache_strategy: CacheStrategy,
    pub incremental_scanning: bool,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            max_execution_time: 300,
            parallelism: 4,
            resource_limits: ResourceLimits {
                max_memory: "2GB".to_string(),
                max_cpus: 4,
            },
            cache_strategy: CacheStrategy::Conservative,
            incremental_scanning: false,
        }
    }
}

/// Report output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Sarif,
    Text,
    Html,
    Markdown,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Sarif => "sarif",
            ReportFormat::Text => "text",
            ReportFormat::Html => "html",
            ReportFormat::Markdown => "markdown",
        }
    }

    /// Formats a program can consume without scraping
    pub fn is_machine_readable(&self) -> bool {
        matches!(self, ReportFormat::Json | ReportFormat::Sarif)
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "sarif" => Ok(ReportFormat::Sarif),
            "text" | "console" => Ok(ReportFormat::Text),
            "html" => Ok(ReportFormat::Html),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingConfig {
    pub formats: Vec<ReportFormat>,
    pub output_dir: String,
    /// Include linters that passed in reports
    pub show_passed: bool,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            formats: vec![ReportFormat::Json],
            output_dir: "lint-reports".to_string(),
            show_passed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enabled: bool,
    /// Lowest finding severity reported by security scanners
    pub severity_threshold: Severity,
    pub secret_scanning: bool,
    pub dependency_scanning: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity_threshold: Severity::Warning,
            secret_scanning: true,
            dependency_scanning: false,
        }
    }
}

/// The executable linting plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub linters: LinterSet,
    pub performance: PerformanceConfig,
    pub reporting: ReportingConfig,
    pub security: SecurityConfig,
}

// ============================================================================
// Preferences
// ============================================================================

/// Overall speed/depth trade-off requested by the user
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceProfile {
    Fast,
    #[default]
    Balanced,
    Thorough,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityPreferences {
    /// Opt in to stricter security scanning
    pub enhanced_scanning: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportingPreferences {
    pub preferred_format: ReportFormat,
    pub output_dir: Option<String>,
    pub show_passed: bool,
}

impl Default for ReportingPreferences {
    fn default() -> Self {
        Self {
            preferred_format: ReportFormat::Text,
            output_dir: None,
            show_passed: false,
        }
    }
}

/// Organization-wide tooling requirements
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrganizationStandards {
    pub required_linters: Vec<String>,
    pub custom_rules: BTreeMap<String, Vec<String>>,
}

/// Signals computed from past runs by an external analytics layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistorySignals {
    /// Technical-debt indicator in [0, 1]
    pub technical_debt: f64,
    pub team_size: Option<u32>,
}

/// Caller-supplied tuning input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UserPreferences {
    pub severity_threshold: Severity,
    pub performance_profile: PerformanceProfile,
    pub preferred_linters: Vec<String>,
    pub excluded_linters: Vec<String>,
    pub security: SecurityPreferences,
    pub reporting: ReportingPreferences,
    pub organization_standards: Option<OrganizationStandards>,
    pub history: Option<HistorySignals>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_total_order() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert_eq!("WARN".parse::<Severity>(), Ok(Severity::Warning));
    }

    #[test]
    fn test_linter_set_disable_moves_name() {
        let mut set = LinterSet {
            enabled: vec![LinterConfiguration {
                name: "eslint".into(),
                language: Some(Lang::JavaScript),
                category: LinterCategory::Language,
                severity: Severity::Error,
                enabled: true,
                rules: vec![],
                include: vec![],
                exclude: vec![],
            }],
            ..Default::default()
        };

        set.disable("eslint");
        set.disable("eslint");

        assert!(set.enabled.is_empty());
        assert_eq!(set.disabled, vec!["eslint".to_string()]);
    }

    #[test]
    fn test_preferences_reject_unknown_keys() {
        let err = toml::from_str::<UserPreferences>("severity_treshold = \"error\"\n");
        assert!(err.is_err());

        let prefs: UserPreferences = toml::from_str(
            "severity_threshold = \"error\"\nperformance_profile = \"thorough\"\n\
             [security]\nenhanced_scanning = true\n",
        )
        .unwrap();
        assert_eq!(prefs.severity_threshold, Severity::Error);
        assert_eq!(prefs.performance_profile, PerformanceProfile::Thorough);
        assert!(prefs.security.enhanced_scanning);
    }
}
