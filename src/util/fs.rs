//! Filesystem utilities.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Remove a file, if it exists.
pub fn remove_file_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)
            .with_context(|| format!("failed to remove file: {}", path.display()))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write bytes to a file, creating parent directories if needed.
pub fn write_bytes(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Find files matching glob patterns relative to a base directory.
pub fn glob_files(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    glob_paths(base, patterns, |p| p.is_file())
}

/// Find directories matching glob patterns relative to a base directory.
pub fn glob_dirs(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    glob_paths(base, patterns, |p| p.is_dir())
}

fn glob_paths(
    base: &Path,
    patterns: &[String],
    keep: impl Fn(&Path) -> bool,
) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for pattern in patterns {
        let full_pattern = base.join(pattern);
        let pattern_str = full_pattern.to_string_lossy();

        let entries =
            glob(&pattern_str).with_context(|| format!("invalid glob pattern: {}", pattern))?;
        for entry in entries {
            match entry {
                Ok(path) => {
                    if keep(&path) {
                        results.push(normalize_path(&path));
                    }
                }
                Err(e) => {
                    tracing::warn!("glob error: {}", e);
                }
            }
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

/// Lexically normalize a path: drop `.` components and fold `..` into
/// their parent. The filesystem is not consulted, so missing paths work.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_glob_files() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("Sources");
        fs::create_dir_all(src.join("Nested")).unwrap();
        fs::write(src.join("App.swift"), "import Core").unwrap();
        fs::write(src.join("Nested/View.swift"), "").unwrap();
        fs::write(src.join("README.md"), "readme").unwrap();

        let files = glob_files(tmp.path(), &["Sources/**/*.swift".to_string()]).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_glob_dirs() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("Modules/Core")).unwrap();
        fs::create_dir_all(tmp.path().join("Modules/UI")).unwrap();
        fs::write(tmp.path().join("Modules/notes.txt"), "").unwrap();

        let dirs = glob_dirs(tmp.path(), &["Modules/*".to_string()]).unwrap();
        assert_eq!(dirs.len(), 2);
        assert!(dirs[0].ends_with("Modules/Core"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/work/App/../Core/./Sources")),
            PathBuf::from("/work/Core/Sources")
        );
        assert_eq!(normalize_path(Path::new("../a")), PathBuf::from("../a"));
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(Path::new("/work"), Path::new("/work/Modules/Core")),
            PathBuf::from("Modules/Core")
        );
    }

    #[test]
    fn test_write_and_remove() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a/b/c.txt");
        write_bytes(&file, b"hello").unwrap();
        assert_eq!(read_to_string(&file).unwrap(), "hello");

        remove_file_if_exists(&file).unwrap();
        assert!(!file.exists());
        remove_dir_all_if_exists(&tmp.path().join("a")).unwrap();
        assert!(!tmp.path().join("a").exists());
    }
}
