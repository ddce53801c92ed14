//! Path and file helpers that behave the same on Unix and Windows

use std::io;
use std::path::{Path, PathBuf};

/// Drop the verbatim `\\?\` prefix that `canonicalize` adds on Windows.
///
/// Without this, profile output and `strip_prefix` calls see two spellings
/// of the same directory. Unix paths pass through untouched.
///
/// ```
/// use std::path::PathBuf;
/// use lintscope::fs_utils::normalize_path;
///
/// let repo = PathBuf::from("/srv/checkout");
/// assert_eq!(normalize_path(&repo), repo);
/// ```
pub fn normalize_path(path: &Path) -> PathBuf {
    #[cfg(windows)]
    {
        let raw = path.to_string_lossy();
        if let Some(share) = raw.strip_prefix(r"\\?\UNC\") {
            return PathBuf::from(format!(r"\\{share}"));
        }
        if let Some(local) = raw.strip_prefix(r"\\?\") {
            return PathBuf::from(local);
        }
    }
    path.to_path_buf()
}

/// Move `src` over `dst`, replacing it.
///
/// Windows refuses to rename onto an existing file, so it is removed first.
pub fn atomic_rename(src: &Path, dst: &Path) -> io::Result<()> {
    #[cfg(windows)]
    if dst.exists() {
        std::fs::remove_file(dst)?;
    }
    std::fs::rename(src, dst)
}

/// Write `contents` to `dst` without ever exposing a half-written file.
///
/// Parent directories are created as needed.
pub fn write_atomic(dst: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file_name = dst
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "lintscope".to_string());
    let tmp = dst.with_file_name(format!(".{}.tmp", file_name));
    std::fs::write(&tmp, contents)?;
    atomic_rename(&tmp, dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_path_preserves_regular_paths() {
        let unix_path = PathBuf::from("/home/user/repo");
        assert_eq!(normalize_path(&unix_path), unix_path);

        let windows_path = PathBuf::from(r"C:\Users\Test\repo");
        assert_eq!(normalize_path(&windows_path), windows_path);
    }

    #[test]
    #[cfg(windows)]
    fn test_normalize_path_strips_windows_prefix() {
        let prefixed = PathBuf::from(r"\\?\C:\Users\Test\repo");
        assert_eq!(normalize_path(&prefixed), PathBuf::from(r"C:\Users\Test\repo"));

        let unc_prefixed = PathBuf::from(r"\\?\UNC\server\share\path");
        assert_eq!(
            normalize_path(&unc_prefixed),
            PathBuf::from(r"\\server\share\path")
        );
    }

    #[test]
    fn test_atomic_rename_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("new.txt");
        let dst = dir.path().join("existing.txt");

        fs::write(&dst, "old content").unwrap();
        fs::write(&src, "new content").unwrap();

        atomic_rename(&src, &dst).expect("Failed to rename over existing");

        assert!(!src.exists(), "Source should not exist after rename");
        assert_eq!(fs::read_to_string(&dst).unwrap(), "new content");
    }

    #[test]
    fn test_write_atomic_creates_parents_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let dst = dir.path().join(".lintscope").join("lint.env");

        write_atomic(&dst, "A=1\n").unwrap();
        write_atomic(&dst, "A=2\n").unwrap();

        assert_eq!(fs::read_to_string(&dst).unwrap(), "A=2\n");
        let leftovers: Vec<_> = fs::read_dir(dst.parent().unwrap())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
