//! Integration tests for lintscope
//!
//! These tests drive the built binary end to end.
//!
//! ## Running Integration Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test --test integration_tests
//!
//! # Run CLI command tests
//! cargo test --test integration_tests cli::plan_tests
//! cargo test --test integration_tests cli::run_tests
//! ```
//!
//! ## Test Fixture Strategy
//!
//! Tests use tempfile to create temporary directories with specific source
//! structures. `run` tests point `--runtime` at a scripted stand-in for the
//! container engine, so no container engine is needed.

#![allow(dead_code)]

// Shared test infrastructure
mod common;

// CLI command tests (profile, plan, run)
mod cli;
