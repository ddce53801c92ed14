//! Complexity classification and detection confidence.
//!
//! Both scores are pure functions of counts, so identical repository
//! contents always produce identical results.

use serde::{Deserialize, Serialize};

/// Repository size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
        }
    }
}

/// Structural counts gathered during the walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoStats {
    pub files: usize,
    pub directories: usize,
    pub max_depth: usize,
    pub total_lines: usize,
}

const FILE_THRESHOLDS: [usize; 3] = [100, 500, 1000];
const DIRECTORY_THRESHOLDS: [usize; 2] = [10, 50];
const DEPTH_THRESHOLDS: [usize; 2] = [5, 10];
const LANGUAGE_THRESHOLDS: [usize; 2] = [3, 6];

/// One point per threshold crossed
pub fn complexity_score(stats: &RepoStats, language_count: usize) -> u32 {
    fn crossed(value: usize, thresholds: &[usize]) -> u32 {
        thresholds.iter().filter(|t| value > **t).count() as u32
    }

    crossed(stats.files, &FILE_THRESHOLDS)
        + crossed(stats.directories, &DIRECTORY_THRESHOLDS)
        + crossed(stats.max_depth, &DEPTH_THRESHOLDS)
        + crossed(language_count, &LANGUAGE_THRESHOLDS)
}

pub fn classify(score: u32) -> Complexity {
    match score {
        0..=2 => Complexity::Simple,
        3..=5 => Complexity::Moderate,
        _ => Complexity::Complex,
    }
}

/// Detection signals feeding the confidence score
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceSignals {
    pub languages: usize,
    pub frameworks: usize,
    pub build_tools: usize,
    pub config_files: usize,
}

/// Weighted sum of signal strengths, capped at 1.0.
///
/// Accumulated in tenths so repeated runs never differ in the last bit.
pub fn confidence(signals: &ConfidenceSignals) -> f64 {
    let mut tenths: u32 = 3;
    if signals.languages > 0 {
        tenths += 3;
    }
    if signals.languages > 2 {
        tenths += 1;
    }
    if signals.frameworks > 0 {
        tenths += 2;
    }
    if signals.build_tools > 0 {
        tenths += 1;
    }
    if signals.config_files > 0 {
        tenths += 1;
    }
    if signals.config_files > 5 {
        tenths += 1;
    }
    f64::from(tenths.min(10)) / 10.0
}
