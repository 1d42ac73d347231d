//! Manifest parsing and loading.
//!
//! Manifests are decoded from `Project.toml` and `Workspace.toml` into raw
//! structures that mirror the file layout. The converter turns them into
//! the domain model.

pub mod converter;
pub mod lint;
pub mod recursive;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::{AutomaticSchemesGrouping, LaunchArgument, Product, TestingOptions};
use crate::errors::GeneratorError;
use crate::util::fs::{glob_dirs, normalize_path};

pub use converter::{DependenciesGraph, ManifestModelConverter, Plugins};
pub use lint::{LintingIssue, ManifestLinter};
pub use recursive::{LoadedProjects, LoadedWorkspace, RecursiveManifestLoader};

/// Project manifest file name.
pub const PROJECT_MANIFEST: &str = "Project.toml";

/// Workspace manifest file name.
pub const WORKSPACE_MANIFEST: &str = "Workspace.toml";

/// The kinds of manifest a directory can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ManifestKind {
    Project,
    Workspace,
}

impl ManifestKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            ManifestKind::Project => PROJECT_MANIFEST,
            ManifestKind::Workspace => WORKSPACE_MANIFEST,
        }
    }
}

/// A project manifest as written on disk.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawProject {
    pub name: String,

    #[serde(default)]
    pub default_configuration: Option<String>,

    #[serde(default)]
    pub options: RawProjectOptions,

    #[serde(default)]
    pub targets: Vec<RawTarget>,

    #[serde(default)]
    pub schemes: Vec<RawScheme>,
}

impl RawProject {
    /// Paths of the local projects this manifest depends on, resolved
    /// against the manifest directory.
    pub fn local_project_dependencies(&self, manifest_dir: &Path) -> Vec<PathBuf> {
        self.targets
            .iter()
            .flat_map(|t| t.dependencies.iter())
            .filter_map(|d| match d {
                RawTargetDependency::Project { project, .. } => {
                    Some(normalize_path(&manifest_dir.join(project)))
                }
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawProjectOptions {
    #[serde(default)]
    pub automatic_schemes: RawAutomaticSchemes,
}

/// Scheme generation options. Unset keys fall back to the config.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawAutomaticSchemes {
    pub grouping: Option<AutomaticSchemesGrouping>,
    pub code_coverage: Option<bool>,
    pub testing: Option<TestingOptions>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawTarget {
    pub name: String,

    pub product: Product,

    /// Source glob patterns, relative to the manifest directory
    #[serde(default)]
    pub sources: Vec<String>,

    #[serde(default)]
    pub dependencies: Vec<RawTargetDependency>,

    #[serde(default)]
    pub environment: BTreeMap<String, String>,

    #[serde(default)]
    pub launch_arguments: Vec<LaunchArgument>,
}

/// A dependency entry of a target.
///
/// ```toml
/// dependencies = [
///     { target = "Core" },
///     { project = "../Core", target = "Core" },
///     { external = "Charts" },
///     "auto",
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawTargetDependency {
    Project { project: PathBuf, target: String },
    Target { target: String },
    External { external: String },
    Keyword(String),
}

/// Keyword standing for dependencies inferred from imports.
pub const AUTO_DEPENDENCIES: &str = "auto";

/// A user-declared scheme.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawScheme {
    pub name: String,

    #[serde(default = "default_shared")]
    pub shared: bool,

    #[serde(default)]
    pub build_targets: Vec<RawTargetReference>,

    #[serde(default)]
    pub test_targets: Vec<RawTargetReference>,

    #[serde(default)]
    pub run_target: Option<RawTargetReference>,

    /// Gather code coverage when testing
    #[serde(default)]
    pub coverage: bool,

    /// Build configuration for the test and run actions
    #[serde(default)]
    pub configuration: Option<String>,
}

fn default_shared() -> bool {
    true
}

/// A target referenced from a scheme: a bare name in the same project, or a
/// qualified reference into another one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawTargetReference {
    Name(String),
    Qualified {
        target: String,
        #[serde(default)]
        project: Option<PathBuf>,
    },
}

/// A workspace manifest as written on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawWorkspace {
    pub name: String,

    /// Member project paths or glob patterns
    #[serde(default)]
    pub projects: Vec<String>,
}

/// Access to manifests by directory.
pub trait ManifestLoading: Send + Sync {
    /// Kinds of manifest present in `path`.
    fn manifests_at(&self, path: &Path) -> BTreeSet<ManifestKind>;

    /// Load the project manifest in `path`.
    fn load_project(&self, path: &Path) -> Result<RawProject, GeneratorError>;

    /// Load the workspace manifest in `path`.
    fn load_workspace(&self, path: &Path) -> Result<RawWorkspace, GeneratorError>;
}

/// Loads manifests from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestLoader;

impl ManifestLoader {
    pub fn new() -> Self {
        ManifestLoader
    }

    fn read(&self, path: &Path, kind: ManifestKind) -> Result<String, GeneratorError> {
        let manifest_path = path.join(kind.file_name());
        if !manifest_path.is_file() {
            return Err(GeneratorError::ManifestNotFound {
                path: path.to_path_buf(),
            });
        }

        tracing::debug!("Loading manifest {}", manifest_path.display());
        std::fs::read_to_string(&manifest_path).map_err(|e| GeneratorError::ManifestParse {
            path: manifest_path,
            message: e.to_string(),
        })
    }
}

impl ManifestLoading for ManifestLoader {
    fn manifests_at(&self, path: &Path) -> BTreeSet<ManifestKind> {
        [ManifestKind::Project, ManifestKind::Workspace]
            .into_iter()
            .filter(|kind| path.join(kind.file_name()).is_file())
            .collect()
    }

    fn load_project(&self, path: &Path) -> Result<RawProject, GeneratorError> {
        let contents = self.read(path, ManifestKind::Project)?;
        toml::from_str(&contents).map_err(|e| GeneratorError::ManifestParse {
            path: path.join(PROJECT_MANIFEST),
            message: e.to_string(),
        })
    }

    fn load_workspace(&self, path: &Path) -> Result<RawWorkspace, GeneratorError> {
        let contents = self.read(path, ManifestKind::Workspace)?;
        toml::from_str(&contents).map_err(|e| GeneratorError::ManifestParse {
            path: path.join(WORKSPACE_MANIFEST),
            message: e.to_string(),
        })
    }
}

/// Expand the member patterns of the workspace at `path` into project
/// directories, in pattern order.
///
/// Literal paths must hold a project manifest. Glob patterns only keep the
/// directories that do.
pub fn workspace_member_paths(
    loader: &dyn ManifestLoading,
    path: &Path,
    patterns: &[String],
) -> Result<Vec<PathBuf>, GeneratorError> {
    let mut members = Vec::new();

    for pattern in patterns {
        if is_glob(pattern) {
            let dirs = glob_dirs(path, std::slice::from_ref(pattern)).map_err(|e| {
                GeneratorError::Conversion {
                    path: path.to_path_buf(),
                    message: format!("{:#}", e),
                }
            })?;
            members.extend(
                dirs.into_iter()
                    .filter(|dir| loader.manifests_at(dir).contains(&ManifestKind::Project)),
            );
        } else {
            let member = normalize_path(&path.join(pattern));
            if !loader.manifests_at(&member).contains(&ManifestKind::Project) {
                return Err(GeneratorError::ManifestNotFound { path: member });
            }
            members.push(member);
        }
    }

    let mut seen = BTreeSet::new();
    members.retain(|m| seen.insert(m.clone()));
    Ok(members)
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}
