//! Lint planning for lintscope.
//!
//! Turns a [`LanguageProfile`](crate::profile::LanguageProfile) into an
//! executable [`Configuration`]:
//!
//! ## Catalog
//! - **Language**: eslint, pylint, golangci-lint, clippy, checkstyle, ...
//! - **Format**: prettier, black, gofmt, rustfmt, ...
//! - **Security**: bandit, gosec, cargo-audit, gitleaks, ...
//! - **Quality / Documentation / Performance / Accessibility**
//!
//! ## Planning
//! - Template selection per language and framework
//! - Conflict resolution (first listed tool wins)
//! - Preference, exclusion and severity filtering
//! - Performance tuning from complexity and history
//! - Validation with automatic fixes
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lintscope::lint::{ConfigurationGenerator, UserPreferences};
//!
//! let generator = ConfigurationGenerator::new();
//! let config = generator.generate(&profile, &UserPreferences::default())?;
//! std::fs::write("lint.env", generator.export(&config))?;
//! ```

pub mod export;
pub mod generator;
pub mod memory;
pub mod registry;
pub mod types;
pub mod validator;

pub use export::{env_pairs, parse_export, ExportedPlan};
pub use generator::ConfigurationGenerator;
pub use types::{
    CacheStrategy, Configuration, HistorySignals, LinterCategory, LinterConfiguration, LinterSet,
    LinterTemplate, OrganizationStandards, PerformanceConfig, PerformanceProfile, ReportFormat,
    ReportingConfig, ReportingPreferences, ResourceLimits, SecurityConfig, SecurityPreferences,
    Severity, UserPreferences,
};
pub use validator::{validate, ValidationIssue, ValidationReport};
