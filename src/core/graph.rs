//! Graph - the resolved, queryable view over a workspace and its projects.
//!
//! Target dependencies are materialized once as edges of an arena graph
//! keyed by `TargetReference`, so queries never re-resolve names. A Graph
//! is never edited in place: graph mappers return a new one.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::core::{Project, Target, TargetReference, Workspace};

/// A target together with the project that owns it.
#[derive(Debug, Clone, Copy)]
pub struct GraphTarget<'a> {
    pub project: &'a Project,
    pub target: &'a Target,
}

impl<'a> GraphTarget<'a> {
    pub fn path(&self) -> &'a Path {
        &self.project.path
    }

    pub fn reference(&self) -> TargetReference {
        TargetReference::new(&self.project.path, &self.target.name)
    }
}

#[derive(Debug, Clone)]
pub struct Graph {
    /// Workspace or root project name
    name: String,

    /// Path the graph was loaded from
    path: PathBuf,

    workspace: Workspace,

    /// Projects by path
    projects: BTreeMap<PathBuf, Project>,

    /// Dependency edges: `a -> b` means a depends on b
    graph: DiGraph<TargetReference, ()>,

    /// Map from target reference to node index
    target_to_node: HashMap<TargetReference, NodeIndex>,
}

impl Graph {
    /// Create a graph holding every target of `projects` and no edges yet.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        workspace: Workspace,
        projects: impl IntoIterator<Item = Project>,
    ) -> Self {
        let mut graph = DiGraph::new();
        let mut target_to_node = HashMap::new();
        let mut by_path = BTreeMap::new();

        for project in projects {
            for target in &project.targets {
                let reference = TargetReference::new(&project.path, &target.name);
                let node = graph.add_node(reference.clone());
                target_to_node.insert(reference, node);
            }
            by_path.insert(project.path.clone(), project);
        }

        Graph {
            name: name.into(),
            path: path.into(),
            workspace,
            projects: by_path,
            graph,
            target_to_node,
        }
    }

    /// Add a dependency edge. Unknown references and duplicates are ignored.
    pub(crate) fn add_dependency(&mut self, from: &TargetReference, to: &TargetReference) {
        if let (Some(&from_node), Some(&to_node)) =
            (self.target_to_node.get(from), self.target_to_node.get(to))
        {
            if !self.graph.contains_edge(from_node, to_node) {
                self.graph.add_edge(from_node, to_node, ());
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Return a copy of the graph attached to another workspace.
    pub fn with_workspace(&self, workspace: Workspace) -> Self {
        Graph {
            workspace,
            ..self.clone()
        }
    }

    /// Iterate over all projects, ordered by path.
    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    pub fn project(&self, path: &Path) -> Option<&Project> {
        self.projects.get(path)
    }

    /// Iterate over every target of every project.
    pub fn targets(&self) -> impl Iterator<Item = GraphTarget<'_>> {
        self.projects.values().flat_map(|project| {
            project
                .targets
                .iter()
                .map(move |target| GraphTarget { project, target })
        })
    }

    /// Look up a target by reference.
    pub fn target(&self, reference: &TargetReference) -> Option<GraphTarget<'_>> {
        let project = self.projects.get(&reference.project_path)?;
        let target = project.target(&reference.name)?;
        Some(GraphTarget { project, target })
    }

    /// Number of dependency edges.
    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn neighbors(&self, reference: &TargetReference, direction: Direction) -> Vec<GraphTarget<'_>> {
        let Some(&node) = self.target_to_node.get(reference) else {
            return Vec::new();
        };

        // petgraph yields the most recently added edge first
        let mut nodes: Vec<_> = self.graph.neighbors_directed(node, direction).collect();
        nodes.reverse();
        nodes
            .into_iter()
            .filter_map(|n| self.target(&self.graph[n]))
            .collect()
    }

    /// Direct dependencies of a target, in declaration order.
    pub fn direct_dependencies(&self, reference: &TargetReference) -> Vec<GraphTarget<'_>> {
        self.neighbors(reference, Direction::Outgoing)
    }

    /// Targets that declare a dependency on `reference`.
    pub fn direct_dependents(&self, reference: &TargetReference) -> Vec<GraphTarget<'_>> {
        self.neighbors(reference, Direction::Incoming)
    }

    fn walk(&self, reference: &TargetReference, direction: Direction) -> Vec<GraphTarget<'_>> {
        let Some(&start) = self.target_to_node.get(reference) else {
            return Vec::new();
        };

        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        let mut found = Vec::new();

        while let Some(current) = queue.pop_front() {
            let mut next: Vec<_> = self.graph.neighbors_directed(current, direction).collect();
            next.reverse();
            for n in next {
                if visited.insert(n) {
                    found.push(n);
                    queue.push_back(n);
                }
            }
        }

        found
            .into_iter()
            .filter_map(|n| self.target(&self.graph[n]))
            .collect()
    }

    /// Every target that depends on `reference`, nearest first.
    pub fn transitive_dependents(&self, reference: &TargetReference) -> Vec<GraphTarget<'_>> {
        self.walk(reference, Direction::Incoming)
    }

    /// Every target `reference` depends on, nearest first.
    pub fn transitive_dependencies(&self, reference: &TargetReference) -> Vec<GraphTarget<'_>> {
        self.walk(reference, Direction::Outgoing)
    }
}
