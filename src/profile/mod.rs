//! Repository profiling.
//!
//! A [`Profiler`] walks a repository once, then feeds the walked entries to
//! the language, framework/build-tool, and config-file detectors and scores
//! the result. Every call returns a fresh [`LanguageProfile`]; nothing is
//! shared between calls.
//!
//! ```rust,ignore
//! use lintscope::profile::Profiler;
//!
//! let profile = Profiler::default().analyze(Path::new("."))?;
//! println!("{:?} ({})", profile.primary, profile.complexity.as_str());
//! ```

pub mod config_files;
pub mod frameworks;
pub mod languages;
pub mod scoring;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::AnalysisError;
use crate::lang::Lang;
use crate::walker::{TreeWalker, WalkEntry, WalkOptions, DEFAULT_MAX_DEPTH};

pub use config_files::{locate_config_files, ConfigFile, ConfigFileKind, Importance};
pub use frameworks::{detect_build_tools, detect_frameworks, BuildTool, Framework};
pub use languages::{count_languages, detect_languages, split_primary_secondary, LanguageStat};
pub use scoring::{classify, complexity_score, confidence, Complexity, ConfidenceSignals, RepoStats};

/// Default depth for the language/complexity walk
pub const DEFAULT_SCAN_DEPTH: usize = 12;

/// Detected composition of a repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageProfile {
    /// Dominant languages (at most 3)
    pub primary: Vec<Lang>,
    /// Supporting languages, disjoint from `primary` (at most 5)
    pub secondary: Vec<Lang>,
    /// Every detected language with file and line counts
    pub languages: Vec<LanguageStat>,
    pub frameworks: Vec<Framework>,
    pub build_tools: Vec<BuildTool>,
    /// Located tooling config, keyed by tool
    pub config_files: BTreeMap<String, ConfigFile>,
    pub complexity: Complexity,
    /// Detection confidence in [0, 1]
    pub confidence: f64,
    pub stats: RepoStats,
    /// Non-fatal detection problems (unreadable or malformed manifests)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl LanguageProfile {
    /// Primary languages followed by secondary ones
    pub fn detected_languages(&self) -> Vec<Lang> {
        self.primary
            .iter()
            .chain(self.secondary.iter())
            .copied()
            .collect()
    }

    /// Number of languages with at least one file
    pub fn language_count(&self) -> usize {
        self.languages.len()
    }

    pub fn has_framework(&self, name: &str) -> bool {
        self.frameworks.iter().any(|f| f.name == name)
    }
}

/// Profiler settings
#[derive(Debug, Clone)]
pub struct ProfilerOptions {
    /// Depth of the language/complexity walk
    pub scan_depth: usize,
    /// Depth at which config files are still considered
    pub config_depth: usize,
}

impl Default for ProfilerOptions {
    fn default() -> Self {
        Self {
            scan_depth: DEFAULT_SCAN_DEPTH,
            config_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Builds [`LanguageProfile`]s
#[derive(Debug, Clone, Default)]
pub struct Profiler {
    options: ProfilerOptions,
}

impl Profiler {
    pub fn new(options: ProfilerOptions) -> Self {
        Self { options }
    }

    /// Profile the repository at `root`.
    ///
    /// Only an unusable root is an error; problems below it lower the
    /// detection signal instead.
    pub fn analyze(&self, root: &Path) -> Result<LanguageProfile, AnalysisError> {
        let walker = TreeWalker::new(root, WalkOptions::with_max_depth(self.options.scan_depth))?;
        let root = walker.root().to_path_buf();

        let files: Vec<WalkEntry> = walker.files().collect();
        let directories: Vec<WalkEntry> = walker.directories().collect();

        let languages = detect_languages(&files);
        let (primary, secondary) = split_primary_secondary(&languages);

        let mut detected = primary.clone();
        detected.extend(secondary.iter().copied());
        let framework_detection = detect_frameworks(&root, &detected);
        let build_tools = detect_build_tools(&root);

        let config_files = locate_config_files(
            files
                .iter()
                .filter(|e| e.depth <= self.options.config_depth),
        );

        let stats = RepoStats {
            files: files.len(),
            directories: directories.len(),
            max_depth: files
                .iter()
                .chain(directories.iter())
                .map(|e| e.depth)
                .max()
                .unwrap_or(0),
            total_lines: languages.iter().map(|l| l.lines).sum(),
        };

        let score = complexity_score(&stats, languages.len());
        let complexity = classify(score);
        let confidence = confidence(&ConfidenceSignals {
            languages: languages.len(),
            frameworks: framework_detection.frameworks.len(),
            build_tools: build_tools.len(),
            config_files: config_files.len(),
        });

        debug!(
            "Profiled {}: {} files, {} dirs, complexity score {}",
            root.display(),
            stats.files,
            stats.directories,
            score
        );
        info!(
            "Detected primary={:?} secondary={:?} confidence={:.1}",
            primary, secondary, confidence
        );

        Ok(LanguageProfile {
            primary,
            secondary,
            languages,
            frameworks: framework_detection.frameworks,
            build_tools,
            config_files,
            complexity,
            confidence,
            stats,
            warnings: framework_detection.warnings,
        })
    }
}

/// Profile `root` with default options
pub fn analyze(root: &Path) -> Result<LanguageProfile, AnalysisError> {
    Profiler::default().analyze(root)
}
