//! CLI command integration tests
//!
//! Verifies each subcommand, its exit codes and its output formats
//! (json, toon, text).

pub mod plan_tests;
pub mod profile_tests;
pub mod run_tests;
