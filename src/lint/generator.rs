//! Builds a validated [`Configuration`] from a [`LanguageProfile`] and
//! [`UserPreferences`].
//!
//! Generation runs in fixed order: select candidates, deduplicate, resolve
//! conflicts, apply preferences, tune performance, set reporting and
//! security, then validate, auto-fix and optimize. The output depends only
//! on the inputs.

use tracing::{debug, info, warn};

use crate::error::{ConfigValidationError, ParseError};
use crate::lang::Lang;
use crate::lint::export::{self, ExportedPlan};
use crate::lint::memory::{format_memory_mb, parse_memory_mb, FALLBACK_MEMORY, MAX_MEMORY_MB};
use crate::lint::registry;
use crate::lint::types::{
    CacheStrategy, Configuration, LinterCategory, LinterConfiguration, LinterSet, LinterTemplate,
    PerformanceConfig, PerformanceProfile, ReportFormat, ReportingConfig, ResourceLimits,
    SecurityConfig, Severity, UserPreferences,
};
use crate::lint::validator::{
    self, conflicting_pairs, ValidationReport, INSUFFICIENT_MEMORY, LINTER_CONFLICT,
    NO_OUTPUT_FORMATS,
};
use crate::profile::{Complexity, LanguageProfile};

/// Language count above which time and memory are scaled up
pub const MANY_LANGUAGES: usize = 5;
/// Technical-debt level above which time and memory are scaled up
pub const HIGH_TECH_DEBT: f64 = 0.7;
/// Enabled-linter count that forces incremental scanning
pub const INCREMENTAL_THRESHOLD: usize = 15;
/// Enabled-linter count that forces aggressive caching
pub const AGGRESSIVE_CACHE_THRESHOLD: usize = 25;

const SUPPORT_CATEGORIES: [LinterCategory; 3] = [
    LinterCategory::Quality,
    LinterCategory::Format,
    LinterCategory::Documentation,
];

/// Stateless generator; every call works on its own inputs
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigurationGenerator;

impl ConfigurationGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Produce a validated configuration.
    ///
    /// Fails only when the configuration is still invalid after automatic
    /// fixes.
    pub fn generate(
        &self,
        profile: &LanguageProfile,
        prefs: &UserPreferences,
    ) -> Result<Configuration, ConfigValidationError> {
        let candidates = dedupe(select_candidates(profile));
        let mut linters = resolve_conflicts(candidates);
        apply_preferences(&mut linters, prefs);

        let mut config = Configuration {
            linters,
            performance: tune_performance(profile, prefs),
            reporting: reporting_config(prefs),
            security: security_config(prefs),
        };

        let report = validator::validate(&config);
        if !report.valid {
            debug!("Generated configuration needs fixes: {:?}", report.errors);
            apply_fixes(&mut config, &report);
        }
        optimize(&mut config);

        let report = validator::validate(&config);
        if !report.valid {
            return Err(ConfigValidationError {
                issues: report.errors,
            });
        }
        for warning in &report.warnings {
            warn!("{}: {}", warning.code, warning.message);
        }

        info!(
            "Planned {} linters ({} disabled), {}s budget, parallelism {}",
            config.linters.enabled.len(),
            config.linters.disabled.len(),
            config.performance.max_execution_time,
            config.performance.parallelism
        );
        Ok(config)
    }

    pub fn validate(&self, config: &Configuration) -> ValidationReport {
        validator::validate(config)
    }

    /// Validate `config` and repair what can be repaired automatically
    pub fn auto_fix(
        &self,
        mut config: Configuration,
    ) -> Result<Configuration, ConfigValidationError> {
        let report = validator::validate(&config);
        if report.valid {
            return Ok(config);
        }
        apply_fixes(&mut config, &report);

        let report = validator::validate(&config);
        if report.valid {
            Ok(config)
        } else {
            Err(ConfigValidationError {
                issues: report.errors,
            })
        }
    }

    /// Render the plan as sorted `KEY=value` lines
    pub fn export(&self, config: &Configuration) -> String {
        export::export(config)
    }

    pub fn parse_export(&self, text: &str) -> Result<ExportedPlan, ParseError> {
        export::parse_export(text)
    }
}

// ============================================================================
// Selection
// ============================================================================

fn select_candidates(profile: &LanguageProfile) -> Vec<LinterConfiguration> {
    let languages = profile.detected_languages();
    let mut out = Vec::new();

    for lang in &languages {
        out.extend(registry::for_language(*lang).map(|t| t.instantiate(Some(*lang))));
    }

    for framework in &profile.frameworks {
        out.extend(
            registry::for_framework(&framework.name)
                .filter_map(registry::find)
                .map(|t| t.instantiate(Some(framework.language))),
        );
    }

    out.extend(
        registry::templates()
            .iter()
            .filter(|t| t.category == LinterCategory::Security && relevant(&languages, t))
            .map(|t| t.instantiate(first_supported(t.languages, &languages))),
    );

    out.extend(
        registry::templates()
            .iter()
            .filter(|t| SUPPORT_CATEGORIES.contains(&t.category) && relevant(&languages, t))
            .map(|t| t.instantiate(first_supported(t.languages, &languages))),
    );

    out
}

fn relevant(languages: &[Lang], template: &LinterTemplate) -> bool {
    template.is_universal() || languages.iter().any(|l| template.supports_language(*l))
}

fn first_supported(supported: &[Lang], detected: &[Lang]) -> Option<Lang> {
    detected.iter().copied().find(|l| supported.contains(l))
}

/// Keep the first configuration of each name
fn dedupe(candidates: Vec<LinterConfiguration>) -> Vec<LinterConfiguration> {
    let mut seen = std::collections::HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.name.clone()))
        .collect()
}

/// Disable every candidate that conflicts with one already kept
fn resolve_conflicts(candidates: Vec<LinterConfiguration>) -> LinterSet {
    let mut set = LinterSet::default();
    for candidate in candidates {
        let clash = set
            .enabled
            .iter()
            .find(|kept| registry::conflicts(&kept.name, &candidate.name))
            .map(|kept| kept.name.clone());

        match clash {
            Some(kept) => {
                debug!("Disabling {} (conflicts with {})", candidate.name, kept);
                set.disabled.push(candidate.name);
            }
            None => set.enabled.push(candidate),
        }
    }
    set
}

// ============================================================================
// Preferences
// ============================================================================

fn apply_preferences(set: &mut LinterSet, prefs: &UserPreferences) {
    if !prefs.preferred_linters.is_empty() {
        let dropped: Vec<String> = set
            .enabled
            .iter()
            .filter(|l| !prefs.preferred_linters.contains(&l.name))
            .map(|l| l.name.clone())
            .collect();
        for name in dropped {
            set.disable(&name);
        }
    }

    for name in &prefs.excluded_linters {
        if set.is_enabled(name) {
            set.disable(name);
        }
    }

    let below: Vec<String> = set
        .enabled
        .iter()
        .filter(|l| l.severity < prefs.severity_threshold)
        .map(|l| l.name.clone())
        .collect();
    for name in below {
        set.disable(&name);
    }

    if let Some(standards) = &prefs.organization_standards {
        for name in &standards.required_linters {
            require(set, name, &standards.required_linters);
        }
        for (linter, rules) in &standards.custom_rules {
            set.custom_rules
                .entry(linter.clone())
                .or_default()
                .extend(rules.iter().cloned());
        }
    }
}

/// Enable `name`, displacing any non-required tool it conflicts with
fn require(set: &mut LinterSet, name: &str, required: &[String]) {
    if set.is_enabled(name) {
        return;
    }

    let displaced: Vec<String> = set
        .enabled
        .iter()
        .filter(|l| registry::conflicts(&l.name, name) && !required.contains(&l.name))
        .map(|l| l.name.clone())
        .collect();
    for other in displaced {
        debug!("Required {} displaces {}", name, other);
        set.disable(&other);
    }

    let config = match registry::find(name) {
        Some(template) => template.instantiate(template.languages.first().copied()),
        None => LinterConfiguration {
            name: name.to_string(),
            language: None,
            category: LinterCategory::Quality,
            severity: Severity::Warning,
            enabled: true,
            rules: Vec::new(),
            include: vec!["**/*".to_string()],
            exclude: Vec::new(),
        },
    };
    set.disabled.retain(|d| d != name);
    set.enabled.push(config);
}

// ============================================================================
// Performance, reporting, security
// ============================================================================

fn base_performance(complexity: Complexity) -> PerformanceConfig {
    let (time, parallelism, memory, cache, incremental) = match complexity {
        Complexity::Simple => (120, 2, "1GB", CacheStrategy::Aggressive, false),
        Complexity::Moderate => (300, 4, "2GB", CacheStrategy::Conservative, false),
        Complexity::Complex => (600, 6, "4GB", CacheStrategy::Conservative, true),
    };
    PerformanceConfig {
        max_execution_time: time,
        parallelism,
        resource_limits: ResourceLimits {
            max_memory: memory.to_string(),
            max_cpus: parallelism,
        },
        cache_strategy: cache,
        incremental_scanning: incremental,
    }
}

fn scale_secs(secs: u64, factor: f64) -> u64 {
    (secs as f64 * factor).round() as u64
}

fn tune_performance(profile: &LanguageProfile, prefs: &UserPreferences) -> PerformanceConfig {
    let mut perf = base_performance(profile.complexity);
    let mut memory_mb = parse_memory_mb(&perf.resource_limits.max_memory).unwrap_or(2048);

    if profile.language_count() > MANY_LANGUAGES {
        perf.max_execution_time = scale_secs(perf.max_execution_time, 1.2);
        memory_mb = (memory_mb as f64 * 1.5).round() as u64;
    }

    let debt = prefs.history.as_ref().map_or(0.0, |h| h.technical_debt);
    if debt > HIGH_TECH_DEBT {
        perf.max_execution_time = scale_secs(perf.max_execution_time, 1.5);
        memory_mb = (memory_mb as f64 * 1.2).round() as u64;
    }

    match prefs.performance_profile {
        PerformanceProfile::Fast => {
            perf.cache_strategy = CacheStrategy::Aggressive;
            perf.incremental_scanning = true;
        }
        PerformanceProfile::Balanced => {}
        PerformanceProfile::Thorough => {
            perf.max_execution_time = scale_secs(perf.max_execution_time, 1.5);
            perf.incremental_scanning = false;
        }
    }

    perf.resource_limits.max_memory = format_memory_mb(memory_mb.min(MAX_MEMORY_MB));
    perf
}

fn reporting_config(prefs: &UserPreferences) -> ReportingConfig {
    let mut formats = vec![ReportFormat::Json];
    if prefs.reporting.preferred_format != ReportFormat::Json {
        formats.push(prefs.reporting.preferred_format);
    }
    ReportingConfig {
        formats,
        output_dir: prefs
            .reporting
            .output_dir
            .clone()
            .unwrap_or_else(|| ReportingConfig::default().output_dir),
        show_passed: prefs.reporting.show_passed,
    }
}

fn security_config(prefs: &UserPreferences) -> SecurityConfig {
    let enhanced = prefs.security.enhanced_scanning;
    SecurityConfig {
        enabled: true,
        severity_threshold: if enhanced {
            Severity::Info
        } else {
            Severity::Warning
        },
        secret_scanning: true,
        dependency_scanning: enhanced,
    }
}

// ============================================================================
// Fixes and optimization
// ============================================================================

fn apply_fixes(config: &mut Configuration, report: &ValidationReport) {
    if report.has_error(LINTER_CONFLICT) {
        while let Some((kept, later)) = conflicting_pairs(config).into_iter().next() {
            debug!("Auto-fix: disabling {} (conflicts with {})", later, kept);
            config.linters.disable(&later);
        }
    }
    if report.has_error(INSUFFICIENT_MEMORY) {
        debug!(
            "Auto-fix: memory {} -> {}",
            config.performance.resource_limits.max_memory, FALLBACK_MEMORY
        );
        config.performance.resource_limits.max_memory = FALLBACK_MEMORY.to_string();
    }
    if report.has_error(NO_OUTPUT_FORMATS) {
        config.reporting.formats = vec![ReportFormat::Json];
    }
}

fn optimize(config: &mut Configuration) {
    let enabled = config.linters.enabled.len();
    let cap = enabled.max(1) as u32;
    if config.performance.parallelism > cap {
        config.performance.parallelism = cap;
    }
    if enabled > INCREMENTAL_THRESHOLD {
        config.performance.incremental_scanning = true;
    }
    if enabled > AGGRESSIVE_CACHE_THRESHOLD {
        config.performance.cache_strategy = CacheStrategy::Aggressive;
    }
}
