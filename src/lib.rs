//! lintscope: repository profiler and adaptive multi-linter engine
//!
//! Inspects a source tree to build a [`LanguageProfile`], turns that profile
//! plus optional [`UserPreferences`] into a validated, tuned [`Configuration`]
//! of linters, formatters and security scanners, and runs the plan inside a
//! container image, parsing its output into [`LintingResults`].
//!
//! # Pipeline
//!
//! - `profile` - tree walk, language/framework/config-file detection, scoring
//! - `lint` - template registry, generator, validator, env export
//! - `execution` - container orchestration, events, result parsing
//!
//! # Example
//!
//! ```ignore
//! use lintscope::{ConfigurationGenerator, DockerRuntime, Orchestrator, Profiler, UserPreferences};
//! use std::path::Path;
//!
//! let repo = Path::new(".");
//! let profile = Profiler::default().analyze(repo)?;
//! let config = ConfigurationGenerator::new().generate(&profile, &UserPreferences::default())?;
//!
//! let orchestrator = Orchestrator::new(DockerRuntime::default());
//! let results = orchestrator.execute(&config, repo, Some(&profile)).await?;
//! println!("{} issues", results.summary.total_issues);
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod execution;
pub mod fs_utils;
pub mod lang;
pub mod lint;
pub mod profile;
pub mod walker;

// Re-export commonly used types
pub use cli::{Cli, OutputFormat};
pub use commands::encode_toon;
pub use error::{
    AnalysisError, ConfigValidationError, EngineError, ExecutionError, ParseError, Result,
};
pub use execution::{
    ContainerRuntime, DockerRuntime, ExecutionEvent, ExecutionState, LintingResults,
    Orchestrator,
};
pub use lang::Lang;
pub use lint::{Configuration, ConfigurationGenerator, UserPreferences};
pub use profile::{LanguageProfile, Profiler};
