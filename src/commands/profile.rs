//! Profile command handler - Detect repository composition

use tracing::info;

use crate::cli::ProfileArgs;
use crate::commands::{banner, render_structured, CommandContext};
use crate::config::EngineSettings;
use crate::error::Result;
use crate::profile::{LanguageProfile, Profiler};

/// Run the profile command
pub fn run_profile(
    args: &ProfileArgs,
    settings: &EngineSettings,
    ctx: &CommandContext,
) -> Result<String> {
    let profile = Profiler::new(settings.profiler_options()).analyze(&args.path)?;
    info!(
        "Profiled {} ({} languages)",
        args.path.display(),
        profile.language_count()
    );

    let value = serde_json::to_value(&profile)?;
    if let Some(output) = render_structured(&value, ctx)? {
        return Ok(output);
    }
    Ok(format_profile_text(&args.path.display().to_string(), &profile, ctx.verbose))
}

/// Human-readable profile report
pub fn format_profile_text(path: &str, profile: &LanguageProfile, verbose: bool) -> String {
    let mut output = banner("REPOSITORY PROFILE");
    output.push_str(&format!("path: {}\n", path));
    output.push_str(&format!(
        "complexity: {} | confidence: {:.2} | files: {} | dirs: {} | depth: {} | lines: {}\n",
        profile.complexity.as_str(),
        profile.confidence,
        profile.stats.files,
        profile.stats.directories,
        profile.stats.max_depth,
        profile.stats.total_lines
    ));

    let names = |langs: &[crate::lang::Lang]| {
        if langs.is_empty() {
            "-".to_string()
        } else {
            langs.iter().map(|l| l.name()).collect::<Vec<_>>().join(", ")
        }
    };
    output.push_str(&format!("primary: {}\n", names(profile.primary.as_slice())));
    output.push_str(&format!("secondary: {}\n", names(profile.secondary.as_slice())));

    if verbose && !profile.languages.is_empty() {
        output.push_str("\nlanguages:\n");
        for stat in &profile.languages {
            output.push_str(&format!(
                "  {} ({} files, {} lines)\n",
                stat.language.name(),
                stat.files,
                stat.lines
            ));
        }
    }

    if !profile.frameworks.is_empty() {
        output.push_str("\nframeworks:\n");
        for fw in &profile.frameworks {
            output.push_str(&format!("  {} [{}] from {}\n", fw.name, fw.language.name(), fw.source));
        }
    }

    if !profile.build_tools.is_empty() {
        let tools: Vec<&str> = profile.build_tools.iter().map(|b| b.name.as_str()).collect();
        output.push_str(&format!("\nbuild tools: {}\n", tools.join(", ")));
    }

    if !profile.config_files.is_empty() {
        output.push_str("\nconfig files:\n");
        for (tool, file) in &profile.config_files {
            output.push_str(&format!("  {}: {}\n", tool, file.path));
        }
    }

    for warning in &profile.warnings {
        output.push_str(&format!("\n⚠ {}\n", warning));
    }
    output
}
