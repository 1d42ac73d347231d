//! Detection of dependency cycles between targets.
//!
//! Runs on the converted projects before any mapper, so everything after it
//! can assume an acyclic graph.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::core::{Project, TargetReference, Workspace};
use crate::errors::{CircularDependencyError, GeneratorError};
use crate::loader::resolve::ProjectIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    OnPath,
    Explored,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CircularDependencyLinter;

impl CircularDependencyLinter {
    pub fn new() -> Self {
        CircularDependencyLinter
    }

    /// Lint the projects loaded from the root project at `path`.
    pub fn lint_project(&self, path: &Path, projects: &[Project]) -> Result<(), GeneratorError> {
        self.lint(&[path], projects)
    }

    /// Lint the projects loaded for `workspace`.
    pub fn lint_workspace(
        &self,
        workspace: &Workspace,
        projects: &[Project],
    ) -> Result<(), GeneratorError> {
        let roots: Vec<&Path> = workspace.projects.iter().map(|p| p.as_path()).collect();
        self.lint(&roots, projects)
    }

    fn lint(&self, roots: &[&Path], projects: &[Project]) -> Result<(), GeneratorError> {
        let index = ProjectIndex::new(projects);

        // Root projects first, then every other project by path
        let mut ordered: Vec<&Project> = roots.iter().filter_map(|p| index.project(p)).collect();
        let root_paths: HashSet<&Path> = ordered.iter().map(|p| p.path()).collect();
        ordered.extend(index.projects().filter(|p| !root_paths.contains(p.path())));

        let mut graph: DiGraph<TargetReference, ()> = DiGraph::new();
        let mut nodes = HashMap::new();
        for project in &ordered {
            for target in &project.targets {
                let reference = TargetReference::new(&project.path, &target.name);
                nodes.insert(reference.clone(), graph.add_node(reference));
            }
        }

        for project in &ordered {
            for target in &project.targets {
                let from = nodes[&TargetReference::new(&project.path, &target.name)];
                for dependency in index.resolve_all(project, target)? {
                    if let Some(&to) = nodes.get(&dependency) {
                        graph.add_edge(from, to, ());
                    }
                }
            }
        }

        if let Some(cycle) = find_cycle(&graph) {
            tracing::debug!("Found dependency cycle of {} target(s)", cycle.len());
            return Err(CircularDependencyError { cycle }.into());
        }

        Ok(())
    }
}

/// Depth-first search for a cycle, starting from nodes in insertion order.
///
/// Returns the targets on the first cycle found; the last one depends on the
/// first.
fn find_cycle(graph: &DiGraph<TargetReference, ()>) -> Option<Vec<TargetReference>> {
    let mut marks: Vec<Option<Mark>> = vec![None; graph.node_count()];

    for root in graph.node_indices() {
        if marks[root.index()].is_some() {
            continue;
        }

        // The current path, each node with its successors still to visit
        let mut path = vec![(root, successors(graph, root))];
        marks[root.index()] = Some(Mark::OnPath);

        while let Some((_, pending)) = path.last_mut() {
            let Some(next) = pending.next() else {
                if let Some((node, _)) = path.pop() {
                    marks[node.index()] = Some(Mark::Explored);
                }
                continue;
            };

            match marks[next.index()] {
                Some(Mark::OnPath) => {
                    let start = path.iter().position(|(n, _)| *n == next).unwrap_or(0);
                    return Some(path[start..].iter().map(|(n, _)| graph[*n].clone()).collect());
                }
                Some(Mark::Explored) => {}
                None => {
                    marks[next.index()] = Some(Mark::OnPath);
                    path.push((next, successors(graph, next)));
                }
            }
        }
    }

    None
}

/// Successors of `node` in declaration order.
fn successors(
    graph: &DiGraph<TargetReference, ()>,
    node: NodeIndex,
) -> std::vec::IntoIter<NodeIndex> {
    // petgraph yields the most recently added edge first
    let mut neighbors: Vec<_> = graph.neighbors_directed(node, Direction::Outgoing).collect();
    neighbors.reverse();
    neighbors.into_iter()
}
