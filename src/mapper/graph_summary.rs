//! JSON summary of the final graph.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::{Graph, Product, SideEffectDescriptor, TargetReference};
use crate::errors::MapperError;
use crate::mapper::{GraphMapper, MapFuture};

/// Directory, relative to the graph root, the summary is written to.
pub const SUMMARY_DIRECTORY: &str = ".loom";

/// Summary file name.
pub const SUMMARY_FILE_NAME: &str = "graph.json";

#[derive(Debug, Serialize)]
pub struct GraphSummary {
    pub name: String,
    pub path: PathBuf,
    pub projects: Vec<ProjectSummary>,
}

#[derive(Debug, Serialize)]
pub struct ProjectSummary {
    pub name: String,
    pub path: PathBuf,
    pub targets: Vec<TargetSummary>,
    pub schemes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TargetSummary {
    pub name: String,
    pub product: Product,
    pub dependencies: Vec<TargetReference>,
}

impl GraphSummary {
    pub fn new(graph: &Graph) -> Self {
        let projects = graph
            .projects()
            .map(|project| ProjectSummary {
                name: project.name.clone(),
                path: project.path.clone(),
                targets: project
                    .targets
                    .iter()
                    .map(|target| TargetSummary {
                        name: target.name.clone(),
                        product: target.product,
                        dependencies: graph
                            .direct_dependencies(&TargetReference::new(&project.path, &target.name))
                            .iter()
                            .map(|d| d.reference())
                            .collect(),
                    })
                    .collect(),
                schemes: project.schemes.iter().map(|s| s.name.clone()).collect(),
            })
            .collect();

        GraphSummary {
            name: graph.name().to_string(),
            path: graph.path().to_path_buf(),
            projects,
        }
    }
}

/// Emits a side effect that writes `.loom/graph.json` next to the graph root.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphSummaryGraphMapper;

impl GraphSummaryGraphMapper {
    pub fn new() -> Self {
        GraphSummaryGraphMapper
    }
}

impl GraphMapper for GraphSummaryGraphMapper {
    fn name(&self) -> &'static str {
        "GraphSummaryGraphMapper"
    }

    fn map(&self, graph: Graph) -> MapFuture<'_> {
        Box::pin(async move {
            let summary = GraphSummary::new(&graph);
            let contents = serde_json::to_vec_pretty(&summary)
                .map_err(|e| MapperError::new(self.name(), e.to_string()))?;
            let path = graph.path().join(SUMMARY_DIRECTORY).join(SUMMARY_FILE_NAME);

            Ok((graph, vec![SideEffectDescriptor::write_file(path, contents)]))
        })
    }
}
