//! Workspace - the set of projects generated and opened together.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A named collection of project paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    /// Directory containing the workspace (or root project) manifest
    pub path: PathBuf,

    pub name: String,

    /// Member project paths, in order
    pub projects: Vec<PathBuf>,
}

impl Workspace {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, projects: Vec<PathBuf>) -> Self {
        Workspace {
            path: path.into(),
            name: name.into(),
            projects,
        }
    }

    /// Synthesize the workspace of a standalone project.
    pub fn synthesized(path: &Path, name: Option<&str>) -> Self {
        Workspace::new(path, name.unwrap_or("Workspace"), Vec::new())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return a copy with `projects` appended, skipping paths already present.
    pub fn merging(&self, projects: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut merged = self.projects.clone();
        for path in projects {
            if !merged.contains(&path) {
                merged.push(path);
            }
        }
        Workspace {
            projects: merged,
            ..self.clone()
        }
    }

    pub fn contains(&self, project: &Path) -> bool {
        self.projects.iter().any(|p| p == project)
    }
}
