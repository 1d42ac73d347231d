//! Mappers - the only way the model changes after loading.
//!
//! Each mapper takes a value and returns a new value plus the side effects
//! it wants executed. Mappers of one role are composed into an ordered
//! pipeline that runs left to right and stops at the first failure.

pub mod autogenerated_schemes;
pub mod delete_derived;
pub mod factory;
pub mod graph_summary;

use std::future::Future;
use std::pin::Pin;

use crate::core::{Graph, Project, SideEffectDescriptor, Workspace};
use crate::errors::MapperError;

pub use autogenerated_schemes::AutogeneratedSchemesProjectMapper;
pub use delete_derived::DeleteDerivedDirectoryProjectMapper;
pub use graph_summary::GraphSummaryGraphMapper;

/// Future returned by [`GraphMapper::map`].
pub type MapFuture<'a> = Pin<Box<dyn Future<Output = MapResult> + Send + 'a>>;

/// Mapped graph plus the side effects the mapper wants executed.
pub type MapResult = Result<(Graph, Vec<SideEffectDescriptor>), MapperError>;

/// Transforms a single project.
pub trait ProjectMapper: Send + Sync {
    fn name(&self) -> &'static str;

    fn map(&self, project: Project) -> Result<(Project, Vec<SideEffectDescriptor>), MapperError>;
}

/// Transforms the whole graph. May suspend while probing the filesystem or
/// waiting on external processes.
pub trait GraphMapper: Send + Sync {
    fn name(&self) -> &'static str;

    fn map(&self, graph: Graph) -> MapFuture<'_>;
}

/// A workspace together with its converted projects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceWithProjects {
    pub workspace: Workspace,
    pub projects: Vec<Project>,
}

/// Transforms a workspace and its projects.
pub trait WorkspaceMapper: Send + Sync {
    fn name(&self) -> &'static str;

    fn map(
        &self,
        input: WorkspaceWithProjects,
    ) -> Result<(WorkspaceWithProjects, Vec<SideEffectDescriptor>), MapperError>;
}

/// Applies project mappers in order.
#[derive(Default)]
pub struct SequentialProjectMapper {
    mappers: Vec<Box<dyn ProjectMapper>>,
}

impl SequentialProjectMapper {
    pub fn new(mappers: Vec<Box<dyn ProjectMapper>>) -> Self {
        SequentialProjectMapper { mappers }
    }

    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}

impl ProjectMapper for SequentialProjectMapper {
    fn name(&self) -> &'static str {
        "SequentialProjectMapper"
    }

    fn map(&self, project: Project) -> Result<(Project, Vec<SideEffectDescriptor>), MapperError> {
        let mut project = project;
        let mut side_effects = Vec::new();
        for mapper in &self.mappers {
            tracing::debug!("Applying {} to {}", mapper.name(), project.name);
            let (mapped, effects) = mapper.map(project)?;
            project = mapped;
            side_effects.extend(effects);
        }
        Ok((project, side_effects))
    }
}

/// Applies graph mappers one after another.
#[derive(Default)]
pub struct SequentialGraphMapper {
    mappers: Vec<Box<dyn GraphMapper>>,
}

impl SequentialGraphMapper {
    pub fn new(mappers: Vec<Box<dyn GraphMapper>>) -> Self {
        SequentialGraphMapper { mappers }
    }

    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}

impl GraphMapper for SequentialGraphMapper {
    fn name(&self) -> &'static str {
        "SequentialGraphMapper"
    }

    fn map(&self, graph: Graph) -> MapFuture<'_> {
        Box::pin(async move {
            let mut graph = graph;
            let mut side_effects = Vec::new();
            for mapper in &self.mappers {
                tracing::debug!("Applying {}", mapper.name());
                let (mapped, effects) = mapper.map(graph).await?;
                graph = mapped;
                side_effects.extend(effects);
            }
            Ok((graph, side_effects))
        })
    }
}

/// Applies workspace mappers in order.
#[derive(Default)]
pub struct SequentialWorkspaceMapper {
    mappers: Vec<Box<dyn WorkspaceMapper>>,
}

impl SequentialWorkspaceMapper {
    pub fn new(mappers: Vec<Box<dyn WorkspaceMapper>>) -> Self {
        SequentialWorkspaceMapper { mappers }
    }

    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}

impl WorkspaceMapper for SequentialWorkspaceMapper {
    fn name(&self) -> &'static str {
        "SequentialWorkspaceMapper"
    }

    fn map(
        &self,
        input: WorkspaceWithProjects,
    ) -> Result<(WorkspaceWithProjects, Vec<SideEffectDescriptor>), MapperError> {
        let mut value = input;
        let mut side_effects = Vec::new();
        for mapper in &self.mappers {
            tracing::debug!("Applying {} to workspace {}", mapper.name(), value.workspace.name);
            let (mapped, effects) = mapper.map(value)?;
            value = mapped;
            side_effects.extend(effects);
        }
        Ok((value, side_effects))
    }
}

/// Runs a project mapper over every project of a workspace.
pub struct ProjectWorkspaceMapper {
    project_mapper: Box<dyn ProjectMapper>,
}

impl ProjectWorkspaceMapper {
    pub fn new(project_mapper: Box<dyn ProjectMapper>) -> Self {
        ProjectWorkspaceMapper { project_mapper }
    }
}

impl WorkspaceMapper for ProjectWorkspaceMapper {
    fn name(&self) -> &'static str {
        "ProjectWorkspaceMapper"
    }

    fn map(
        &self,
        input: WorkspaceWithProjects,
    ) -> Result<(WorkspaceWithProjects, Vec<SideEffectDescriptor>), MapperError> {
        let mut projects = Vec::with_capacity(input.projects.len());
        let mut side_effects = Vec::new();
        for project in input.projects {
            let (mapped, effects) = self.project_mapper.map(project)?;
            projects.push(mapped);
            side_effects.extend(effects);
        }

        Ok((
            WorkspaceWithProjects {
                workspace: input.workspace,
                projects,
            },
            side_effects,
        ))
    }
}
