//! Engine settings and user-preference loading.
//!
//! Preferences come from an explicit `--prefs` file, else
//! `<config_dir>/lintscope/preferences.toml` when it exists, else defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::cli::Cli;
use crate::error::{EngineError, Result};
use crate::execution::{DockerRuntime, OrchestratorOptions};
use crate::lint::UserPreferences;
use crate::profile::ProfilerOptions;
use crate::walker::DEFAULT_MAX_DEPTH;

pub const PREFERENCES_FILE: &str = "preferences.toml";

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub runtime: String,
    pub image: String,
    pub grace_period: Duration,
    pub max_depth: usize,
}

impl EngineSettings {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            runtime: cli.runtime.clone(),
            image: cli.image.clone(),
            grace_period: Duration::from_secs(cli.grace_period),
            max_depth: cli.max_depth,
        }
    }

    pub fn profiler_options(&self) -> ProfilerOptions {
        ProfilerOptions {
            scan_depth: self.max_depth.max(1),
            config_depth: DEFAULT_MAX_DEPTH.min(self.max_depth.max(1)),
        }
    }

    pub fn orchestrator_options(&self) -> OrchestratorOptions {
        OrchestratorOptions {
            image: self.image.clone(),
            grace_period: self.grace_period,
            ..Default::default()
        }
    }

    pub fn container_runtime(&self) -> DockerRuntime {
        DockerRuntime::new(self.runtime.clone())
    }
}

/// Default preferences location, if a config directory exists
pub fn default_preferences_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lintscope").join(PREFERENCES_FILE))
}

/// Resolve and load preferences
pub fn load_preferences(explicit: Option<&Path>) -> Result<UserPreferences> {
    if let Some(path) = explicit {
        return read_preferences(path);
    }
    match default_preferences_path() {
        Some(path) if path.is_file() => read_preferences(&path),
        _ => {
            debug!("No preferences file, using defaults");
            Ok(UserPreferences::default())
        }
    }
}

/// Parse a preferences file; `.json` is JSON, anything else TOML
pub fn read_preferences(path: &Path) -> Result<UserPreferences> {
    let content = std::fs::read_to_string(path).map_err(|e| EngineError::Preferences {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let parsed = if is_json {
        serde_json::from_str::<UserPreferences>(&content).map_err(|e| e.to_string())
    } else {
        toml::from_str::<UserPreferences>(&content).map_err(|e| e.to_string())
    };

    let prefs = parsed.map_err(|message| EngineError::Preferences {
        path: path.to_path_buf(),
        message,
    })?;
    validate_preferences(path, &prefs)?;
    debug!("Loaded preferences from {}", path.display());
    Ok(prefs)
}

fn validate_preferences(path: &Path, prefs: &UserPreferences) -> Result<()> {
    let invalid = |message: String| EngineError::Preferences {
        path: path.to_path_buf(),
        message,
    };

    if let Some(history) = &prefs.history {
        if !(0.0..=1.0).contains(&history.technical_debt) {
            return Err(invalid(format!(
                "history.technical_debt must be within [0, 1], got {}",
                history.technical_debt
            )));
        }
    }

    let required = prefs
        .organization_standards
        .iter()
        .flat_map(|o| o.required_linters.iter());
    let names = prefs
        .preferred_linters
        .iter()
        .chain(&prefs.excluded_linters)
        .chain(required);
    for name in names {
        if !is_plain_linter_name(name) {
            return Err(invalid(format!("invalid linter name {name:?}")));
        }
    }

    if let Some(dir) = &prefs.reporting.output_dir {
        if dir.is_empty() || dir.trim() != dir || dir.contains(['\n', '\r']) {
            return Err(invalid(format!("invalid reporting.output_dir {dir:?}")));
        }
    }
    Ok(())
}

/// Linter names travel through comma-separated `KEY=value` lines
fn is_plain_linter_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, ',' | '='))
}
