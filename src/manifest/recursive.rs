//! Breadth-first discovery of every manifest reachable from a root.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use crate::errors::GeneratorError;
use crate::manifest::{
    workspace_member_paths, ManifestKind, ManifestLoading, RawProject, RawWorkspace,
};
use crate::util::fs::normalize_path;

/// Projects reachable from a root project.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedProjects {
    pub path: PathBuf,
    pub projects: BTreeMap<PathBuf, RawProject>,
}

/// A workspace manifest plus every project reachable from its members.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedWorkspace {
    pub path: PathBuf,
    pub workspace: RawWorkspace,
    pub projects: BTreeMap<PathBuf, RawProject>,
}

/// Loads a root manifest and follows local project dependencies.
///
/// Only projects reachable from the root are loaded; other manifests in
/// the tree are never read.
pub struct RecursiveManifestLoader<'a> {
    manifest_loader: &'a dyn ManifestLoading,
}

impl<'a> RecursiveManifestLoader<'a> {
    pub fn new(manifest_loader: &'a dyn ManifestLoading) -> Self {
        RecursiveManifestLoader { manifest_loader }
    }

    pub fn load_project(&self, path: &Path) -> Result<LoadedProjects, GeneratorError> {
        let path = normalize_path(path);
        let projects = self.load_projects(vec![path.clone()])?;
        Ok(LoadedProjects { path, projects })
    }

    pub fn load_workspace(&self, path: &Path) -> Result<LoadedWorkspace, GeneratorError> {
        let path = normalize_path(path);
        if !self
            .manifest_loader
            .manifests_at(&path)
            .contains(&ManifestKind::Workspace)
        {
            return Err(GeneratorError::ManifestNotFound { path });
        }

        let workspace = self.manifest_loader.load_workspace(&path)?;
        let members = workspace_member_paths(self.manifest_loader, &path, &workspace.projects)?;
        let projects = self.load_projects(members)?;

        Ok(LoadedWorkspace {
            path,
            workspace,
            projects,
        })
    }

    fn load_projects(
        &self,
        roots: Vec<PathBuf>,
    ) -> Result<BTreeMap<PathBuf, RawProject>, GeneratorError> {
        let mut projects = BTreeMap::new();
        let mut queued: HashSet<PathBuf> = roots.iter().cloned().collect();
        let mut queue: VecDeque<PathBuf> = roots.into();

        while let Some(path) = queue.pop_front() {
            if !self
                .manifest_loader
                .manifests_at(&path)
                .contains(&ManifestKind::Project)
            {
                return Err(GeneratorError::ManifestNotFound { path });
            }

            let manifest = self.manifest_loader.load_project(&path)?;
            for dependency in manifest.local_project_dependencies(&path) {
                if queued.insert(dependency.clone()) {
                    tracing::debug!("Discovered project {}", dependency.display());
                    queue.push_back(dependency);
                }
            }
            projects.insert(path, manifest);
        }

        Ok(projects)
    }
}
