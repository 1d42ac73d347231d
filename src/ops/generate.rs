//! Implementation of `loom generate`: manifests to a mapped graph.
//!
//! Stages run strictly in order: manifest loading, manifest lint,
//! conversion, dependency inference, cycle lint, workspace and project
//! mappers, graph loading, graph lint, graph mappers. Any failure aborts the
//! run and no side effect is executed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::{Graph, Project, SideEffectDescriptor, Workspace};
use crate::errors::GeneratorError;
use crate::loader::{CircularDependencyLinter, GraphLinter, GraphLoader};
use crate::manifest::lint::print_and_throw_if_needed;
use crate::manifest::{
    DependenciesGraph, LintingIssue, ManifestKind, ManifestLinter, ManifestLoading,
    ManifestModelConverter, Plugins, RawProject, RecursiveManifestLoader,
};
use crate::mapper::factory::MapperFactory;
use crate::mapper::{GraphMapper, WorkspaceMapper, WorkspaceWithProjects};
use crate::ops::auto_dependencies::infer_auto_dependencies;
use crate::ops::side_effects::SideEffectExecutor;
use crate::util::config::{Config, ConfigLoader};

/// Options for a generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Number of parallel conversion workers (default: from config)
    pub jobs: Option<usize>,

    /// Log side effects instead of executing them
    pub dry_run: bool,

    /// Plugins passed to the converter
    pub plugins: Plugins,

    /// Externally resolved dependencies
    pub dependencies: DependenciesGraph,
}

/// The result of a successful run.
#[derive(Debug)]
pub struct Generated {
    pub graph: Graph,
    pub side_effects: Vec<SideEffectDescriptor>,
}

/// Runs the generation pipeline. One generator owns one config cache.
pub struct Generator {
    manifest_loader: Box<dyn ManifestLoading>,
    config_loader: ConfigLoader,
    options: GenerateOptions,
}

impl Generator {
    pub fn new(manifest_loader: Box<dyn ManifestLoading>, options: GenerateOptions) -> Self {
        Generator {
            manifest_loader,
            config_loader: ConfigLoader::new(),
            options,
        }
    }

    pub fn config_loader(&self) -> &ConfigLoader {
        &self.config_loader
    }

    /// Load a workspace if `path` holds one, otherwise a project.
    pub async fn load(
        &self,
        path: &Path,
    ) -> Result<(Graph, Vec<SideEffectDescriptor>), GeneratorError> {
        let manifests = self.manifest_loader.manifests_at(path);
        if manifests.contains(&ManifestKind::Workspace) {
            self.load_workspace(path).await
        } else if manifests.contains(&ManifestKind::Project) {
            let (_, graph, side_effects) = self.load_project(path).await?;
            Ok((graph, side_effects))
        } else {
            Err(GeneratorError::ManifestNotFound {
                path: path.to_path_buf(),
            })
        }
    }

    /// Load the project at `path` and everything it depends on.
    pub async fn load_project(
        &self,
        path: &Path,
    ) -> Result<(Project, Graph, Vec<SideEffectDescriptor>), GeneratorError> {
        let config = self.config_loader.load_config(path)?;
        let factory = MapperFactory::new(config.generation.clone());

        tracing::info!("Loading manifests");
        let loaded = self.recursive_loader().load_project(path)?;
        self.lint_projects(&loaded.projects)?;

        let projects = self.convert(&loaded.projects, &config)?;
        CircularDependencyLinter::new().lint_project(&loaded.path, &projects)?;

        let root_name = projects
            .iter()
            .find(|p| p.path == loaded.path)
            .map(|p| p.name.clone());
        let workspace = Workspace::synthesized(&loaded.path, root_name.as_deref())
            .merging([loaded.path.clone()]);
        let (mapped, mut side_effects) = self.map_workspace(&factory, workspace, projects)?;

        tracing::info!("Loading graph");
        let (project, graph) = GraphLoader::new().load_project(&loaded.path, mapped.projects)?;
        let graph = graph.with_workspace(mapped.workspace);
        self.lint_graph(&graph, &config)?;

        let (graph, graph_side_effects) = self.map_graph(&factory, graph).await?;
        side_effects.extend(graph_side_effects);
        Ok((project, graph, side_effects))
    }

    /// Load the workspace at `path` with its member projects and their
    /// dependencies.
    pub async fn load_workspace(
        &self,
        path: &Path,
    ) -> Result<(Graph, Vec<SideEffectDescriptor>), GeneratorError> {
        let config = self.config_loader.load_config(path)?;
        let factory = MapperFactory::new(config.generation.clone());

        tracing::info!("Loading manifests");
        let loaded = self.recursive_loader().load_workspace(path)?;
        let mut issues = ManifestLinter::new().lint_workspace(&loaded.workspace);
        issues.extend(self.project_issues(&loaded.projects));
        print_and_throw_if_needed(issues)?;

        let workspace = self
            .converter()
            .convert_workspace(&loaded.workspace, &loaded.path)?;
        let projects = self.convert(&loaded.projects, &config)?;
        CircularDependencyLinter::new().lint_workspace(&workspace, &projects)?;

        let (mapped, mut side_effects) = self.map_workspace(&factory, workspace, projects)?;

        tracing::info!("Loading graph");
        let graph = GraphLoader::new().load_workspace(mapped.workspace, mapped.projects)?;
        self.lint_graph(&graph, &config)?;

        let (graph, graph_side_effects) = self.map_graph(&factory, graph).await?;
        side_effects.extend(graph_side_effects);
        Ok((graph, side_effects))
    }

    /// Load the project at `path` as a workspace containing every project
    /// it reaches.
    pub async fn load_project_workspace(
        &self,
        path: &Path,
    ) -> Result<(Graph, Vec<SideEffectDescriptor>), GeneratorError> {
        let config = self.config_loader.load_config(path)?;
        let factory = MapperFactory::new(config.generation.clone());

        tracing::info!("Loading manifests");
        let loaded = self.recursive_loader().load_project(path)?;
        self.lint_projects(&loaded.projects)?;

        let projects = self.convert(&loaded.projects, &config)?;
        CircularDependencyLinter::new().lint_project(&loaded.path, &projects)?;

        let root_name = loaded.projects.get(&loaded.path).map(|p| p.name.clone());
        let members: Vec<PathBuf> = std::iter::once(loaded.path.clone())
            .chain(projects.iter().filter(|p| !p.is_external).map(|p| p.path.clone()))
            .collect();
        let workspace = Workspace::synthesized(&loaded.path, root_name.as_deref()).merging(members);
        let (mapped, mut side_effects) = self.map_workspace(&factory, workspace, projects)?;

        tracing::info!("Loading graph");
        let graph = GraphLoader::new().load_workspace(mapped.workspace, mapped.projects)?;
        self.lint_graph(&graph, &config)?;

        let (graph, graph_side_effects) = self.map_graph(&factory, graph).await?;
        side_effects.extend(graph_side_effects);
        Ok((graph, side_effects))
    }

    /// Load and map the graph at `path`, then execute the side effects.
    pub async fn generate(&self, path: &Path) -> Result<Generated, GeneratorError> {
        let (graph, side_effects) = self.load(path).await?;

        tracing::info!("Executing {} side effect(s)", side_effects.len());
        let executor = if self.options.dry_run {
            SideEffectExecutor::dry_run()
        } else {
            SideEffectExecutor::new()
        };
        executor
            .execute(&side_effects)
            .map_err(|e| GeneratorError::SideEffect {
                message: format!("{:#}", e),
            })?;

        Ok(Generated { graph, side_effects })
    }

    fn recursive_loader(&self) -> RecursiveManifestLoader<'_> {
        RecursiveManifestLoader::new(self.manifest_loader.as_ref())
    }

    fn converter(&self) -> ManifestModelConverter<'_> {
        ManifestModelConverter::new(self.manifest_loader.as_ref(), &self.config_loader)
    }

    fn project_issues(&self, projects: &BTreeMap<PathBuf, RawProject>) -> Vec<LintingIssue> {
        let linter = ManifestLinter::new();
        projects.values().flat_map(|p| linter.lint_project(p)).collect()
    }

    fn lint_projects(
        &self,
        projects: &BTreeMap<PathBuf, RawProject>,
    ) -> Result<(), GeneratorError> {
        print_and_throw_if_needed(self.project_issues(projects))
    }

    /// Convert manifests, add external projects and infer `auto`
    /// dependencies.
    fn convert(
        &self,
        manifests: &BTreeMap<PathBuf, RawProject>,
        config: &Config,
    ) -> Result<Vec<Project>, GeneratorError> {
        tracing::info!("Converting {} project(s)", manifests.len());
        let jobs = self.options.jobs.or(config.generation.jobs);
        let mut projects = self.converter().convert_all(
            manifests,
            &self.options.plugins,
            &self.options.dependencies,
            jobs,
        )?;

        projects.extend(
            self.options
                .dependencies
                .external_projects
                .iter()
                .cloned()
                .map(Project::external),
        );

        infer_auto_dependencies(projects)
    }

    fn lint_graph(&self, graph: &Graph, config: &Config) -> Result<(), GeneratorError> {
        tracing::info!("Linting graph");
        print_and_throw_if_needed(
            GraphLinter::new().lint_code_coverage(graph, &config.generation.code_coverage),
        )
    }

    fn map_workspace(
        &self,
        factory: &MapperFactory,
        workspace: Workspace,
        projects: Vec<Project>,
    ) -> Result<(WorkspaceWithProjects, Vec<SideEffectDescriptor>), GeneratorError> {
        tracing::info!("Applying workspace and project mappers");
        let (mapped, side_effects) = factory
            .workspace_mapper()
            .map(WorkspaceWithProjects { workspace, projects })?;
        Ok((mapped, side_effects))
    }

    async fn map_graph(
        &self,
        factory: &MapperFactory,
        graph: Graph,
    ) -> Result<(Graph, Vec<SideEffectDescriptor>), GeneratorError> {
        tracing::info!("Applying graph mappers");
        let (graph, side_effects) = factory.graph_mapper().map(graph).await?;
        Ok((graph, side_effects))
    }
}
