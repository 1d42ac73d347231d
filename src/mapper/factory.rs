//! Default mapper pipelines.

use crate::mapper::{
    AutogeneratedSchemesProjectMapper, DeleteDerivedDirectoryProjectMapper, GraphMapper,
    GraphSummaryGraphMapper, ProjectMapper, ProjectWorkspaceMapper, SequentialGraphMapper,
    SequentialProjectMapper, SequentialWorkspaceMapper, WorkspaceMapper,
};
use crate::util::config::GenerationConfig;

/// Builds the pipelines a generation run uses, according to the config.
#[derive(Debug, Clone)]
pub struct MapperFactory {
    config: GenerationConfig,
}

impl MapperFactory {
    pub fn new(config: GenerationConfig) -> Self {
        MapperFactory { config }
    }

    /// Project mappers, in application order.
    pub fn project_mapper(&self) -> SequentialProjectMapper {
        let mut mappers: Vec<Box<dyn ProjectMapper>> =
            vec![Box::new(DeleteDerivedDirectoryProjectMapper::default())];

        if self.config.automatic_schemes {
            mappers.push(Box::new(AutogeneratedSchemesProjectMapper::new(
                self.config.code_coverage.clone(),
            )));
        }

        SequentialProjectMapper::new(mappers)
    }

    /// Workspace mappers. The project mappers run here, once per project.
    pub fn workspace_mapper(&self) -> SequentialWorkspaceMapper {
        let mappers: Vec<Box<dyn WorkspaceMapper>> =
            vec![Box::new(ProjectWorkspaceMapper::new(Box::new(self.project_mapper())))];
        SequentialWorkspaceMapper::new(mappers)
    }

    pub fn graph_mapper(&self) -> SequentialGraphMapper {
        let mut mappers: Vec<Box<dyn GraphMapper>> = Vec::new();
        if self.config.emit_graph_summary {
            mappers.push(Box::new(GraphSummaryGraphMapper::new()));
        }
        SequentialGraphMapper::new(mappers)
    }
}
