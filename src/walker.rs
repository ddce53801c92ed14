//! Bounded, filtered repository traversal.
//!
//! [`TreeWalker`] validates the root once and then hands out fresh iterators
//! on every call, so a walk can be restarted as often as a detector needs.
//! Entries are sorted by file name, which keeps every downstream score
//! independent of directory-listing order.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ignore::{DirEntry, WalkBuilder};
use tracing::warn;

use crate::error::AnalysisError;
use crate::fs_utils::normalize_path;

/// Default traversal depth (root children are depth 1)
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Dot-directories that still carry tooling configuration worth seeing.
pub const ALLOWED_HIDDEN_DIRS: &[&str] = &[".github", ".gitlab", ".circleci", ".husky", ".vscode"];

/// VCS, dependency, build output, and cache directories.
pub const SKIPPED_DIRS: &[&str] = &[
    // VCS
    ".git",
    ".hg",
    ".svn",
    // Dependencies
    "node_modules",
    "bower_components",
    "vendor",
    ".venv",
    "venv",
    "env",
    // Build output
    "target",
    "dist",
    "build",
    "out",
    "bin",
    "obj",
    ".next",
    ".nuxt",
    // Caches
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    ".ruff_cache",
    ".tox",
    ".gradle",
    ".cache",
    "coverage",
    ".lintscope",
];

/// Traversal options
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Deepest level to yield (root children are depth 1)
    pub max_depth: usize,
    /// Hidden directories that are traversed anyway
    pub allowed_hidden: Vec<String>,
    /// Directory names that are never entered
    pub skipped: Vec<String>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            allowed_hidden: ALLOWED_HIDDEN_DIRS.iter().map(|s| s.to_string()).collect(),
            skipped: SKIPPED_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl WalkOptions {
    /// Default filters with a different depth bound
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    /// Whether a directory with this name should be entered
    pub fn should_enter(&self, name: &str) -> bool {
        if self.skipped.iter().any(|s| s == name) {
            return false;
        }
        if name.starts_with('.') {
            return self.allowed_hidden.iter().any(|a| a == name);
        }
        true
    }
}

/// A file or directory yielded by the walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Absolute path
    pub path: PathBuf,
    /// Path relative to the walk root
    pub relative: PathBuf,
    /// Depth below the root (root children are 1)
    pub depth: usize,
}

/// Restartable walker over a validated repository root
#[derive(Debug, Clone)]
pub struct TreeWalker {
    root: PathBuf,
    options: Arc<WalkOptions>,
}

impl TreeWalker {
    /// Validate `root` and prepare a walker.
    ///
    /// Fails when the root is missing, not a directory, or cannot be listed.
    pub fn new(root: &Path, options: WalkOptions) -> Result<Self, AnalysisError> {
        let metadata = std::fs::metadata(root).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                AnalysisError::NotFound {
                    path: root.to_path_buf(),
                }
            } else {
                AnalysisError::Unreadable {
                    path: root.to_path_buf(),
                    source,
                }
            }
        })?;

        if !metadata.is_dir() {
            return Err(AnalysisError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        std::fs::read_dir(root).map_err(|source| AnalysisError::Unreadable {
            path: root.to_path_buf(),
            source,
        })?;

        let root = root
            .canonicalize()
            .map(|p| normalize_path(&p))
            .unwrap_or_else(|_| root.to_path_buf());

        Ok(Self {
            root,
            options: Arc::new(options),
        })
    }

    /// Canonical root of the walk
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Options in effect
    pub fn options(&self) -> &WalkOptions {
        &self.options
    }

    /// All regular files within the depth bound
    pub fn files(&self) -> impl Iterator<Item = WalkEntry> + '_ {
        self.entries()
            .filter(|e| e.file_type().is_some_and(|t| t.is_file()))
            .map(move |e| self.to_entry(e))
    }

    /// All directories within the depth bound, excluding the root itself
    pub fn directories(&self) -> impl Iterator<Item = WalkEntry> + '_ {
        self.entries()
            .filter(|e| e.depth() > 0 && e.file_type().is_some_and(|t| t.is_dir()))
            .map(move |e| self.to_entry(e))
    }

    fn entries(&self) -> impl Iterator<Item = DirEntry> {
        let options = Arc::clone(&self.options);

        let mut builder = WalkBuilder::new(&self.root);
        builder
            .standard_filters(false)
            .follow_links(false)
            .max_depth(Some(self.options.max_depth))
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                if entry.depth() == 0 || !entry.file_type().is_some_and(|t| t.is_dir()) {
                    return true;
                }
                entry
                    .file_name()
                    .to_str()
                    .map(|name| options.should_enter(name))
                    .unwrap_or(false)
            });

        builder.build().filter_map(|result| match result {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Skipping unreadable entry during walk: {}", err);
                None
            }
        })
    }

    fn to_entry(&self, entry: DirEntry) -> WalkEntry {
        let depth = entry.depth();
        let path = entry.into_path();
        let relative = path
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.clone());
        WalkEntry {
            path,
            relative,
            depth,
        }
    }
}
