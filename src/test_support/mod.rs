//! Test utilities for Loom unit tests.
//!
//! Provides an in-memory manifest loader, so loading and generation can be
//! tested without touching the filesystem, and fixtures that write real
//! manifest trees into a temporary directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use loom::test_support::InMemoryManifestLoader;
//!
//! let loader = InMemoryManifestLoader::new()
//!     .with_project("/ws/App", "name = \"App\"")
//!     .with_workspace("/ws", "name = \"WS\"\nprojects = [\"App\"]");
//! ```

pub mod fixtures;

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::errors::GeneratorError;
use crate::manifest::{ManifestKind, ManifestLoading, RawProject, RawWorkspace};

pub use fixtures::*;

/// Manifest loader backed by in-memory TOML documents.
///
/// Records how often each project manifest was loaded.
#[derive(Debug, Default)]
pub struct InMemoryManifestLoader {
    projects: HashMap<PathBuf, RawProject>,
    workspaces: HashMap<PathBuf, RawWorkspace>,
    loads: Mutex<HashMap<PathBuf, usize>>,
}

impl InMemoryManifestLoader {
    pub fn new() -> Self {
        InMemoryManifestLoader::default()
    }

    /// Add a project manifest. Panics on invalid TOML.
    pub fn with_project(mut self, path: impl Into<PathBuf>, manifest: &str) -> Self {
        let raw: RawProject = toml::from_str(manifest).expect("invalid project manifest in test");
        self.projects.insert(path.into(), raw);
        self
    }

    /// Add a workspace manifest. Panics on invalid TOML.
    pub fn with_workspace(mut self, path: impl Into<PathBuf>, manifest: &str) -> Self {
        let raw: RawWorkspace =
            toml::from_str(manifest).expect("invalid workspace manifest in test");
        self.workspaces.insert(path.into(), raw);
        self
    }

    /// Number of times the project manifest at `path` was loaded.
    pub fn load_count(&self, path: impl AsRef<Path>) -> usize {
        self.loads
            .lock()
            .unwrap()
            .get(path.as_ref())
            .copied()
            .unwrap_or(0)
    }
}

impl ManifestLoading for InMemoryManifestLoader {
    fn manifests_at(&self, path: &Path) -> BTreeSet<ManifestKind> {
        let mut kinds = BTreeSet::new();
        if self.projects.contains_key(path) {
            kinds.insert(ManifestKind::Project);
        }
        if self.workspaces.contains_key(path) {
            kinds.insert(ManifestKind::Workspace);
        }
        kinds
    }

    fn load_project(&self, path: &Path) -> Result<RawProject, GeneratorError> {
        *self.loads.lock().unwrap().entry(path.to_path_buf()).or_default() += 1;
        self.projects
            .get(path)
            .cloned()
            .ok_or_else(|| GeneratorError::ManifestNotFound {
                path: path.to_path_buf(),
            })
    }

    fn load_workspace(&self, path: &Path) -> Result<RawWorkspace, GeneratorError> {
        self.workspaces
            .get(path)
            .cloned()
            .ok_or_else(|| GeneratorError::ManifestNotFound {
                path: path.to_path_buf(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_loader() {
        let loader = InMemoryManifestLoader::new()
            .with_project("/ws/App", "name = \"App\"")
            .with_workspace("/ws", "name = \"WS\"\nprojects = [\"App\"]");

        assert_eq!(
            loader.manifests_at(Path::new("/ws")),
            BTreeSet::from([ManifestKind::Workspace])
        );
        assert_eq!(loader.load_project(Path::new("/ws/App")).unwrap().name, "App");
        assert_eq!(loader.load_count("/ws/App"), 1);
        assert!(loader.load_project(Path::new("/ws/Other")).is_err());
    }
}
