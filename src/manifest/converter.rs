//! Conversion of raw manifests into the domain model.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::core::project::DEFAULT_DEBUG_CONFIGURATION;
use crate::core::{
    AutomaticSchemesOptions, BuildAction, Project, ProjectOptions, RunAction, Scheme, Target,
    TargetDependency, TargetReference, TestAction, TestableTarget, Workspace,
};
use crate::errors::GeneratorError;
use crate::manifest::{
    workspace_member_paths, ManifestLoading, RawProject, RawScheme, RawTarget, RawTargetDependency,
    RawTargetReference, RawWorkspace, AUTO_DEPENDENCIES,
};
use crate::util::config::ConfigLoader;
use crate::util::fs::{glob_files, normalize_path};

/// Plugins available to manifests. Passed through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plugins {
    pub names: Vec<String>,
}

impl Plugins {
    pub fn new(names: Vec<String>) -> Self {
        Plugins { names }
    }
}

/// Third-party dependencies resolved outside of Loom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependenciesGraph {
    /// External dependency name to the target dependencies it stands for
    pub external_dependencies: BTreeMap<String, Vec<TargetDependency>>,

    /// Projects supplied for those dependencies
    pub external_projects: Vec<Project>,
}

impl DependenciesGraph {
    pub fn none() -> Self {
        DependenciesGraph::default()
    }
}

/// Converts raw manifests into projects and workspaces.
pub struct ManifestModelConverter<'a> {
    manifest_loader: &'a dyn ManifestLoading,
    config_loader: &'a ConfigLoader,
}

impl<'a> ManifestModelConverter<'a> {
    pub fn new(manifest_loader: &'a dyn ManifestLoading, config_loader: &'a ConfigLoader) -> Self {
        ManifestModelConverter {
            manifest_loader,
            config_loader,
        }
    }

    /// Convert a project manifest located at `path`.
    pub fn convert(
        &self,
        manifest: &RawProject,
        path: &Path,
        plugins: &Plugins,
        dependencies: &DependenciesGraph,
    ) -> Result<Project, GeneratorError> {
        tracing::debug!(
            "Converting project {} ({} plugin(s))",
            manifest.name,
            plugins.names.len()
        );

        let config = self.config_loader.load_config(path)?;
        let raw_options = &manifest.options.automatic_schemes;
        let options = ProjectOptions {
            automatic_schemes: AutomaticSchemesOptions {
                grouping: raw_options
                    .grouping
                    .clone()
                    .unwrap_or(config.generation.grouping),
                code_coverage_enabled: raw_options.code_coverage.unwrap_or(false),
                testing_options: raw_options.testing.unwrap_or(config.generation.testing),
            },
        };

        let default_debug_configuration = manifest
            .default_configuration
            .clone()
            .unwrap_or_else(|| DEFAULT_DEBUG_CONFIGURATION.to_string());

        let targets = manifest
            .targets
            .iter()
            .map(|t| self.convert_target(t, path, dependencies))
            .collect::<Result<Vec<_>, _>>()?;

        let schemes = manifest
            .schemes
            .iter()
            .map(|s| convert_scheme(s, path, &default_debug_configuration))
            .collect();

        Ok(Project {
            path: path.to_path_buf(),
            name: manifest.name.clone(),
            targets,
            schemes,
            options,
            default_debug_configuration,
            is_external: false,
        })
    }

    /// Convert every project, in parallel on at most `jobs` workers.
    ///
    /// The result keeps the order of `manifests`.
    pub fn convert_all(
        &self,
        manifests: &BTreeMap<PathBuf, RawProject>,
        plugins: &Plugins,
        dependencies: &DependenciesGraph,
        jobs: Option<usize>,
    ) -> Result<Vec<Project>, GeneratorError> {
        let convert = || {
            manifests
                .par_iter()
                .map(|(path, manifest)| self.convert(manifest, path, plugins, dependencies))
                .collect::<Result<Vec<_>, _>>()
        };

        match jobs.map(|j| rayon::ThreadPoolBuilder::new().num_threads(j).build()) {
            Some(Ok(pool)) => pool.install(convert),
            Some(Err(e)) => {
                tracing::warn!("Falling back to the global thread pool: {}", e);
                convert()
            }
            None => convert(),
        }
    }

    /// Convert a workspace manifest located at `path`.
    pub fn convert_workspace(
        &self,
        manifest: &RawWorkspace,
        path: &Path,
    ) -> Result<Workspace, GeneratorError> {
        let projects = workspace_member_paths(self.manifest_loader, path, &manifest.projects)?;
        Ok(Workspace::new(path, manifest.name.clone(), projects))
    }

    fn convert_target(
        &self,
        target: &RawTarget,
        path: &Path,
        dependencies: &DependenciesGraph,
    ) -> Result<Target, GeneratorError> {
        let sources = glob_files(path, &target.sources).map_err(|e| GeneratorError::Conversion {
            path: path.to_path_buf(),
            message: format!("target `{}`: {:#}", target.name, e),
        })?;

        let mut converted = Vec::with_capacity(target.dependencies.len());
        for dependency in &target.dependencies {
            match dependency {
                RawTargetDependency::Target { target } => {
                    converted.push(TargetDependency::target(target));
                }
                RawTargetDependency::Project { project, target } => {
                    let project_path = normalize_path(&path.join(project));
                    converted.push(TargetDependency::project(target, project_path));
                }
                RawTargetDependency::External { external } => {
                    let expanded = dependencies.external_dependencies.get(external).ok_or_else(|| {
                        GeneratorError::Conversion {
                            path: path.to_path_buf(),
                            message: format!(
                                "target `{}` depends on unknown external dependency `{}`",
                                target.name, external
                            ),
                        }
                    })?;
                    converted.extend(expanded.iter().cloned());
                }
                RawTargetDependency::Keyword(keyword) if keyword == AUTO_DEPENDENCIES => {
                    converted.push(TargetDependency::Auto);
                }
                RawTargetDependency::Keyword(keyword) => {
                    return Err(GeneratorError::Conversion {
                        path: path.to_path_buf(),
                        message: format!(
                            "target `{}` has an unknown dependency `{}`",
                            target.name, keyword
                        ),
                    });
                }
            }
        }

        Ok(Target::new(&target.name, target.product)
            .with_dependencies(converted)
            .with_environment(target.environment.clone())
            .with_launch_arguments(target.launch_arguments.clone())
            .with_sources(sources))
    }
}

fn convert_scheme(scheme: &RawScheme, path: &Path, default_configuration: &str) -> Scheme {
    let configuration = scheme
        .configuration
        .clone()
        .unwrap_or_else(|| default_configuration.to_string());
    let reference = |r: &RawTargetReference| resolve_reference(r, path);

    let mut converted = Scheme::new(&scheme.name);
    converted.shared = scheme.shared;

    if !scheme.build_targets.is_empty() {
        converted = converted.with_build_action(BuildAction::new(
            scheme.build_targets.iter().map(reference).collect(),
        ));
    }

    if !scheme.test_targets.is_empty() {
        converted = converted.with_test_action(TestAction {
            targets: scheme
                .test_targets
                .iter()
                .map(|r| TestableTarget::new(reference(r)))
                .collect(),
            configuration_name: configuration.clone(),
            attach_debugger: true,
            coverage: scheme.coverage,
            code_coverage_targets: Vec::new(),
            arguments: None,
        });
    }

    if let Some(run_target) = &scheme.run_target {
        converted = converted.with_run_action(RunAction {
            configuration_name: configuration,
            attach_debugger: true,
            executable: reference(run_target),
            arguments: None,
        });
    }

    converted
}

fn resolve_reference(reference: &RawTargetReference, path: &Path) -> TargetReference {
    match reference {
        RawTargetReference::Name(name) => TargetReference::new(path, name),
        RawTargetReference::Qualified { target, project } => {
            let project_path = project
                .as_ref()
                .map(|p| normalize_path(&path.join(p)))
                .unwrap_or_else(|| path.to_path_buf());
            TargetReference::new(project_path, target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AutomaticSchemesGrouping, Product};
    use crate::manifest::ManifestLoader;
    use tempfile::TempDir;

    fn raw(toml: &str) -> RawProject {
        toml::from_str(toml).unwrap()
    }

    fn convert(
        manifest: &RawProject,
        path: &Path,
        dependencies: &DependenciesGraph,
    ) -> Result<Project, GeneratorError> {
        let loader = ManifestLoader::new();
        let config = ConfigLoader::new();
        ManifestModelConverter::new(&loader, &config).convert(
            manifest,
            path,
            &Plugins::default(),
            dependencies,
        )
    }

    #[test]
    fn test_convert_targets_and_sources() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("Sources")).unwrap();
        std::fs::write(tmp.path().join("Sources/App.swift"), "").unwrap();

        let manifest = raw(
            r#"
name = "App"
[[targets]]
name = "App"
product = "app"
sources = ["Sources/*.swift"]
dependencies = [{ target = "Core" }, { project = "../Kit", target = "Kit" }, "auto"]
environment = { LOG = "1" }
"#,
        );

        let project = convert(&manifest, tmp.path(), &DependenciesGraph::none()).unwrap();
        let target = project.target("App").unwrap();

        assert_eq!(project.default_debug_configuration, "Debug");
        assert_eq!(target.product, Product::App);
        assert_eq!(target.sources.len(), 1);
        assert_eq!(
            target.dependencies,
            vec![
                TargetDependency::target("Core"),
                TargetDependency::project("Kit", normalize_path(&tmp.path().join("../Kit"))),
                TargetDependency::Auto,
            ]
        );
        assert_eq!(target.environment.get("LOG").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_external_dependencies_expand() {
        let tmp = TempDir::new().unwrap();
        let manifest = raw(
            r#"
name = "App"
[[targets]]
name = "App"
product = "app"
dependencies = [{ external = "Charts" }]
"#,
        );

        let mut dependencies = DependenciesGraph::none();
        dependencies.external_dependencies.insert(
            "Charts".to_string(),
            vec![
                TargetDependency::project("Charts", "/deps/Charts"),
                TargetDependency::project("ChartsCore", "/deps/Charts"),
            ],
        );

        let project = convert(&manifest, tmp.path(), &dependencies).unwrap();
        assert_eq!(project.targets[0].dependencies.len(), 2);
    }

    #[test]
    fn test_unknown_external_dependency() {
        let tmp = TempDir::new().unwrap();
        let manifest = raw(
            r#"
name = "App"
[[targets]]
name = "App"
product = "app"
dependencies = [{ external = "Charts" }]
"#,
        );

        let err = convert(&manifest, tmp.path(), &DependenciesGraph::none()).unwrap_err();
        assert!(matches!(err, GeneratorError::Conversion { .. }));
        assert!(err.to_string().contains("Charts"));
    }

    #[test]
    fn test_unknown_keyword() {
        let tmp = TempDir::new().unwrap();
        let manifest = raw(
            r#"
name = "App"
[[targets]]
name = "App"
product = "app"
dependencies = ["everything"]
"#,
        );

        assert!(convert(&manifest, tmp.path(), &DependenciesGraph::none()).is_err());
    }

    #[test]
    fn test_options_fall_back_to_config() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("Loom")).unwrap();
        std::fs::write(
            tmp.path().join("Loom/Config.toml"),
            concat!(
                "[generation]\ngrouping = \"single_scheme\"\n",
                "[generation.testing]\nparallelizable = true\n",
            ),
        )
        .unwrap();

        let project =
            convert(&raw("name = \"App\"\n"), tmp.path(), &DependenciesGraph::none()).unwrap();
        let options = &project.options.automatic_schemes;
        assert_eq!(options.grouping, AutomaticSchemesGrouping::SingleScheme);
        assert!(options.testing_options.parallelizable);
        assert!(!options.code_coverage_enabled);

        let project = convert(
            &raw(concat!(
                "name = \"App\"\n",
                "[options.automatic_schemes]\ngrouping = \"disabled\"\ncode_coverage = true\n",
            )),
            tmp.path(),
            &DependenciesGraph::none(),
        )
        .unwrap();
        let options = &project.options.automatic_schemes;
        assert_eq!(options.grouping, AutomaticSchemesGrouping::Disabled);
        assert!(options.code_coverage_enabled);
    }

    #[test]
    fn test_user_schemes() {
        let tmp = TempDir::new().unwrap();
        let manifest = raw(
            r#"
name = "App"
default_configuration = "Development"
[[schemes]]
name = "Custom"
build_targets = ["App", { project = "../Kit", target = "Kit" }]
test_targets = ["AppTests"]
run_target = "App"
"#,
        );

        let project = convert(&manifest, tmp.path(), &DependenciesGraph::none()).unwrap();
        let scheme = &project.schemes[0];
        let app = TargetReference::new(tmp.path(), "App");

        assert_eq!(scheme.build_targets()[0], app);
        assert_eq!(
            scheme.build_targets()[1].project_path,
            normalize_path(&tmp.path().join("../Kit"))
        );
        assert_eq!(scheme.test_targets(), vec![&TargetReference::new(tmp.path(), "AppTests")]);
        assert_eq!(scheme.run_target(), Some(&app));
        assert_eq!(
            scheme.run_action.as_ref().unwrap().configuration_name,
            "Development"
        );
    }

    #[test]
    fn test_convert_all_keeps_order() {
        let tmp = TempDir::new().unwrap();
        let mut manifests = BTreeMap::new();
        for name in ["A", "B", "C", "D"] {
            manifests.insert(tmp.path().join(name), raw(&format!("name = \"{}\"\n", name)));
        }

        let loader = ManifestLoader::new();
        let config = ConfigLoader::new();
        let projects = ManifestModelConverter::new(&loader, &config)
            .convert_all(&manifests, &Plugins::default(), &DependenciesGraph::none(), Some(3))
            .unwrap();

        let names: Vec<_> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
    }
}
