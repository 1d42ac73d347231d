//! Builds the [`Graph`] from converted projects.

use std::path::Path;

use crate::core::{Graph, Project, TargetReference, Workspace};
use crate::errors::GeneratorError;
use crate::loader::resolve::ProjectIndex;

#[derive(Debug, Clone, Copy, Default)]
pub struct GraphLoader;

impl GraphLoader {
    pub fn new() -> Self {
        GraphLoader
    }

    /// Load the graph of a standalone project.
    ///
    /// The graph gets a synthetic workspace named after the root project.
    pub fn load_project(
        &self,
        path: &Path,
        projects: Vec<Project>,
    ) -> Result<(Project, Graph), GeneratorError> {
        let root = projects
            .iter()
            .find(|p| p.path == path)
            .cloned()
            .ok_or_else(|| GeneratorError::ManifestNotFound {
                path: path.to_path_buf(),
            })?;

        let workspace = Workspace::synthesized(path, Some(&root.name)).merging([root.path.clone()]);
        let graph = self.build(&root.name, path, workspace, projects)?;
        Ok((root, graph))
    }

    pub fn load_workspace(
        &self,
        workspace: Workspace,
        projects: Vec<Project>,
    ) -> Result<Graph, GeneratorError> {
        let name = workspace.name.clone();
        let path = workspace.path.clone();
        self.build(&name, &path, workspace, projects)
    }

    fn build(
        &self,
        name: &str,
        path: &Path,
        workspace: Workspace,
        projects: Vec<Project>,
    ) -> Result<Graph, GeneratorError> {
        let mut edges: Vec<(TargetReference, TargetReference)> = Vec::new();
        {
            let index = ProjectIndex::new(&projects);
            for project in index.projects() {
                for target in &project.targets {
                    let from = TargetReference::new(&project.path, &target.name);
                    for to in index.resolve_all(project, target)? {
                        edges.push((from.clone(), to));
                    }
                }
            }
        }

        let mut graph = Graph::new(name, path, workspace, projects);
        for (from, to) in &edges {
            graph.add_dependency(from, to);
        }

        tracing::debug!(
            "Loaded graph with {} target(s) and {} dependencies",
            graph.targets().count(),
            graph.dependency_count()
        );
        Ok(graph)
    }
}
