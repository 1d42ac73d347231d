//! Test fixtures for common test scenarios.
//!
//! This module provides fixture generators that write real manifest trees
//! into a directory, usually a `TempDir`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::manifest::{PROJECT_MANIFEST, WORKSPACE_MANIFEST};
use crate::util::config::{CONFIG_DIRECTORY, CONFIG_FILE_NAME};

/// Fixture for a project directory.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    /// Directory relative to the fixture root.
    pub path: PathBuf,
    /// Project.toml content.
    pub manifest: String,
    /// Source files (path relative to the project -> content).
    pub sources: BTreeMap<PathBuf, String>,
}

impl ProjectFixture {
    /// Create a project fixture with the given manifest.
    pub fn new(path: impl Into<PathBuf>, manifest: impl Into<String>) -> Self {
        ProjectFixture {
            path: path.into(),
            manifest: manifest.into(),
            sources: BTreeMap::new(),
        }
    }

    /// A project with a single app target.
    pub fn app(path: impl Into<PathBuf>, name: &str) -> Self {
        ProjectFixture::new(path, manifests::single_target(name, "app"))
    }

    /// Add a source file.
    pub fn with_source(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.sources.insert(path.into(), content.into());
        self
    }

    /// Write the project under `base_path`, returning its directory.
    pub fn write_to(&self, base_path: &Path) -> std::io::Result<PathBuf> {
        let dir = base_path.join(&self.path);
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join(PROJECT_MANIFEST), &self.manifest)?;

        for (path, content) in &self.sources {
            let full = dir.join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(full, content)?;
        }

        Ok(dir)
    }
}

/// Write a workspace manifest into `base_path`.
pub fn write_workspace(base_path: &Path, name: &str, members: &[&str]) -> std::io::Result<()> {
    std::fs::create_dir_all(base_path)?;
    std::fs::write(base_path.join(WORKSPACE_MANIFEST), manifests::workspace(name, members))
}

/// Write `Loom/Config.toml` into `base_path`.
pub fn write_config(base_path: &Path, contents: &str) -> std::io::Result<()> {
    let dir = base_path.join(CONFIG_DIRECTORY);
    std::fs::create_dir_all(&dir)?;
    std::fs::write(dir.join(CONFIG_FILE_NAME), contents)
}

/// Manifest templates.
pub mod manifests {
    /// A project with one target.
    pub fn single_target(name: &str, product: &str) -> String {
        format!(
            r#"name = "{name}"

[[targets]]
name = "{name}"
product = "{product}"
sources = ["Sources/**/*.swift"]
"#
        )
    }

    /// A workspace manifest.
    pub fn workspace(name: &str, members: &[&str]) -> String {
        let members: Vec<String> = members.iter().map(|m| format!("\"{}\"", m)).collect();
        format!("name = \"{}\"\nprojects = [{}]\n", name, members.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_project_fixture() {
        let tmp = TempDir::new().unwrap();
        let dir = ProjectFixture::app("App", "App")
            .with_source("Sources/App.swift", "import Core\n")
            .write_to(tmp.path())
            .unwrap();

        assert!(dir.join(PROJECT_MANIFEST).is_file());
        assert!(dir.join("Sources/App.swift").is_file());
    }

    #[test]
    fn test_workspace_manifest() {
        assert_eq!(
            manifests::workspace("WS", &["App", "Modules/*"]),
            "name = \"WS\"\nprojects = [\"App\", \"Modules/*\"]\n"
        );
    }
}
