//! Fixtures and output checks for the lintscope integration tests

#![allow(dead_code)]

pub mod assertions;
pub mod test_repo;

pub use assertions::*;
pub use test_repo::TestRepo;
