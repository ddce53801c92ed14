//! Plan command handler - Generate, validate and export a linter configuration

use std::path::Path;

use tracing::info;

use crate::cli::PlanArgs;
use crate::commands::{banner, render_structured, section, CommandContext};
use crate::config::{load_preferences, EngineSettings};
use crate::error::Result;
use crate::lint::{
    Configuration, ConfigurationGenerator, PerformanceProfile, UserPreferences, ValidationReport,
};
use crate::profile::{LanguageProfile, Profiler};

/// Profile, then plan, the repository at `path`
pub fn build_plan(
    path: &Path,
    prefs_path: Option<&Path>,
    profile_override: Option<PerformanceProfile>,
    settings: &EngineSettings,
) -> Result<(LanguageProfile, UserPreferences, Configuration)> {
    let profile = Profiler::new(settings.profiler_options()).analyze(path)?;
    let mut prefs = load_preferences(prefs_path)?;
    if let Some(p) = profile_override {
        prefs.performance_profile = p;
    }
    let config = ConfigurationGenerator::new().generate(&profile, &prefs)?;
    Ok((profile, prefs, config))
}

/// Run the plan command
pub fn run_plan(args: &PlanArgs, settings: &EngineSettings, ctx: &CommandContext) -> Result<String> {
    let (profile, prefs, config) = build_plan(
        &args.path,
        args.prefs.as_deref(),
        args.profile,
        settings,
    )?;
    let generator = ConfigurationGenerator::new();

    if args.env {
        return Ok(generator.export(&config));
    }

    let report = generator.validate(&config);
    info!(
        "Planned {} for {}",
        config.linters.enabled_names().join(","),
        args.path.display()
    );

    let value = serde_json::json!({
        "_type": "plan",
        "path": args.path.to_string_lossy(),
        "performance_profile": prefs.performance_profile,
        "profile": {
            "primary": profile.primary,
            "secondary": profile.secondary,
            "frameworks": profile.frameworks.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            "complexity": profile.complexity,
            "confidence": profile.confidence,
        },
        "configuration": config,
        "validation": report,
    });
    if let Some(output) = render_structured(&value, ctx)? {
        return Ok(output);
    }
    Ok(format_plan_text(&args.path, &profile, &config, &report))
}

fn format_plan_text(
    path: &Path,
    profile: &LanguageProfile,
    config: &Configuration,
    report: &ValidationReport,
) -> String {
    let mut output = banner("LINT PLAN");
    output.push_str(&format!("path: {}\n", path.display()));
    output.push_str(&format!(
        "complexity: {} | languages: {}\n",
        profile.complexity.as_str(),
        profile
            .detected_languages()
            .iter()
            .map(|l| l.name())
            .collect::<Vec<_>>()
            .join(", ")
    ));

    output.push_str("\nenabled:\n");
    for linter in &config.linters.enabled {
        output.push_str(&format!(
            "  ✓ {} ({}, {})\n",
            linter.name,
            linter.category.as_str(),
            linter.severity.as_str()
        ));
    }
    if !config.linters.disabled.is_empty() {
        output.push_str(&format!("disabled: {}\n", config.linters.disabled.join(", ")));
    }

    let perf = &config.performance;
    output.push_str(&section("PERFORMANCE"));
    output.push_str(&format!(
        "time: {}s | parallelism: {} | memory: {} | cpus: {} | cache: {} | incremental: {}\n",
        perf.max_execution_time,
        perf.parallelism,
        perf.resource_limits.max_memory,
        perf.resource_limits.max_cpus,
        perf.cache_strategy.as_str(),
        perf.incremental_scanning
    ));
    output.push_str(&format!(
        "reports: {} -> {}\n",
        config
            .reporting
            .formats
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        config.reporting.output_dir
    ));
    output.push_str(&format!(
        "security: {} (threshold {})\n",
        if config.security.enabled { "on" } else { "off" },
        config.security.severity_threshold.as_str()
    ));

    if !report.warnings.is_empty() || !report.suggestions.is_empty() {
        output.push_str(&section("NOTES"));
        for warning in &report.warnings {
            output.push_str(&format!("  ⚠ {}: {}\n", warning.code, warning.message));
        }
        for suggestion in &report.suggestions {
            output.push_str(&format!("  → {}\n", suggestion));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn settings() -> EngineSettings {
        EngineSettings {
            runtime: "docker".into(),
            image: "img".into(),
            grace_period: Duration::from_secs(1),
            max_depth: 12,
        }
    }

    fn python_repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.py"), "import os\n").unwrap();
        fs::write(dir.path().join("prefs.toml"), "excluded_linters = [\"bandit\"]\n").unwrap();
        dir
    }

    #[test]
    fn test_plan_env_export() {
        let dir = python_repo();
        let args = PlanArgs {
            path: dir.path().to_path_buf(),
            prefs: Some(dir.path().join("prefs.toml")),
            profile: None,
            env: true,
        };
        let output = run_plan(&args, &settings(), &CommandContext::default()).unwrap();

        let plan = ConfigurationGenerator::new().parse_export(&output).unwrap();
        assert!(!plan.enabled.is_empty());
        assert!(!plan.enabled.contains(&"bandit".to_string()));
    }

    #[test]
    fn test_plan_text_lists_enabled() {
        let dir = python_repo();
        let args = PlanArgs {
            path: dir.path().to_path_buf(),
            prefs: Some(dir.path().join("prefs.toml")),
            profile: Some(PerformanceProfile::Thorough),
            env: false,
        };
        let ctx = CommandContext::from_cli(OutputFormat::Text, false);
        let output = run_plan(&args, &settings(), &ctx).unwrap();

        assert!(output.contains("LINT PLAN"));
        assert!(output.contains("enabled:"));
        assert!(output.contains("incremental: false"));
    }
}
