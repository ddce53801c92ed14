//! Language frequency counting and the primary/secondary split.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lang::Lang;
use crate::walker::WalkEntry;

/// Primary languages need this share of source files...
pub const PRIMARY_SHARE: f64 = 0.10;
/// ...or at least this many files.
pub const PRIMARY_MIN_FILES: usize = 5;
pub const MAX_PRIMARY: usize = 3;

pub const SECONDARY_SHARE: f64 = 0.02;
pub const SECONDARY_MIN_FILES: usize = 1;
pub const MAX_SECONDARY: usize = 5;

/// Per-language totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageStat {
    pub language: Lang,
    pub files: usize,
    pub lines: usize,
}

/// Count files per language in one pass.
///
/// Returns languages with at least one file, most frequent first; ties are
/// broken by language name so the order never depends on walk order.
pub fn count_languages<'a>(files: impl IntoIterator<Item = &'a WalkEntry>) -> Vec<(Lang, usize)> {
    let mut counts: BTreeMap<Lang, usize> = BTreeMap::new();
    for entry in files {
        if let Some(lang) = Lang::from_path(&entry.path) {
            *counts.entry(lang).or_insert(0) += 1;
        }
    }

    let mut sorted: Vec<(Lang, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.name().cmp(b.0.name())));
    sorted
}

/// Count files and lines per language.
///
/// Line counting reads every source file, so it fans out across the rayon
/// pool. Files that cannot be read contribute zero lines.
pub fn detect_languages(files: &[WalkEntry]) -> Vec<LanguageStat> {
    let by_lang: Vec<(Lang, &PathBuf)> = files
        .iter()
        .filter_map(|e| Lang::from_path(&e.path).map(|l| (l, &e.path)))
        .collect();

    let line_counts: Vec<(Lang, usize)> = by_lang
        .par_iter()
        .map(|(lang, path)| (*lang, count_lines(path)))
        .collect();

    let mut totals: BTreeMap<Lang, (usize, usize)> = BTreeMap::new();
    for (lang, lines) in line_counts {
        let slot = totals.entry(lang).or_insert((0, 0));
        slot.0 += 1;
        slot.1 += lines;
    }

    let mut stats: Vec<LanguageStat> = totals
        .into_iter()
        .map(|(language, (files, lines))| LanguageStat {
            language,
            files,
            lines,
        })
        .collect();
    stats.sort_by(|a, b| {
        b.files
            .cmp(&a.files)
            .then_with(|| a.language.name().cmp(b.language.name()))
    });
    stats
}

fn count_lines(path: &Path) -> usize {
    match std::fs::read(path) {
        Ok(bytes) => {
            let newlines = bytes.iter().filter(|b| **b == b'\n').count();
            if !bytes.is_empty() && bytes.last() != Some(&b'\n') {
                newlines + 1
            } else {
                newlines
            }
        }
        Err(err) => {
            debug!("Cannot count lines in {}: {}", path.display(), err);
            0
        }
    }
}

/// Split detected languages into primary and secondary sets.
///
/// Candidates are ranked by line count (then file count, then name). File
/// share is measured against all recognized source files.
pub fn split_primary_secondary(stats: &[LanguageStat]) -> (Vec<Lang>, Vec<Lang>) {
    let total_files: usize = stats.iter().map(|s| s.files).sum();
    if total_files == 0 {
        return (Vec::new(), Vec::new());
    }

    let mut ranked: Vec<&LanguageStat> = stats.iter().collect();
    ranked.sort_by(|a, b| {
        b.lines
            .cmp(&a.lines)
            .then_with(|| b.files.cmp(&a.files))
            .then_with(|| a.language.name().cmp(b.language.name()))
    });

    let share = |s: &LanguageStat| s.files as f64 / total_files as f64;

    let primary: Vec<Lang> = ranked
        .iter()
        .filter(|s| share(**s) >= PRIMARY_SHARE || s.files >= PRIMARY_MIN_FILES)
        .take(MAX_PRIMARY)
        .map(|s| s.language)
        .collect();

    let secondary: Vec<Lang> = ranked
        .iter()
        .filter(|s| !primary.contains(&s.language))
        .filter(|s| share(**s) >= SECONDARY_SHARE || s.files >= SECONDARY_MIN_FILES)
        .take(MAX_SECONDARY)
        .map(|s| s.language)
        .collect();

    (primary, secondary)
}
