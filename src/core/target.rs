//! Target definitions - what gets built, tested, or run.
//!
//! A Target is a single unit inside a project with a product kind and
//! an ordered list of dependencies on other targets.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The kind of product a target builds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    #[default]
    App,
    AppClip,
    CommandLineTool,
    Framework,
    StaticFramework,
    #[serde(alias = "static")]
    StaticLibrary,
    #[serde(alias = "dynamic")]
    DynamicLibrary,
    Bundle,
    #[serde(alias = "unit_test")]
    UnitTests,
    #[serde(alias = "ui_test")]
    UiTests,
    AppExtension,
    MessagesExtension,
    WatchApp,
    WatchExtension,
}

impl Product {
    /// Products that can be launched directly.
    pub fn is_runnable(&self) -> bool {
        matches!(
            self,
            Product::App | Product::AppClip | Product::CommandLineTool | Product::WatchApp
        )
    }

    /// Test bundles (unit or UI).
    pub fn is_test_bundle(&self) -> bool {
        matches!(self, Product::UnitTests | Product::UiTests)
    }

    /// Check if this produces an artifact other targets can link or embed.
    pub fn is_linkable(&self) -> bool {
        matches!(
            self,
            Product::Framework
                | Product::StaticFramework
                | Product::StaticLibrary
                | Product::DynamicLibrary
                | Product::Bundle
        )
    }

    /// Extensions that are launched through a hosting app.
    pub fn is_app_extension(&self) -> bool {
        matches!(self, Product::AppExtension | Product::MessagesExtension)
    }

    pub fn is_watch_extension(&self) -> bool {
        matches!(self, Product::WatchExtension)
    }

    /// Check if this product may host an app extension.
    pub fn can_host_extensions(&self) -> bool {
        matches!(self, Product::App | Product::AppClip)
    }

    /// Whether targets of other projects may depend on this product.
    ///
    /// Linkable products are exposed, and so are apps because test bundles
    /// in other projects use them as hosts.
    pub fn is_exposed(&self) -> bool {
        self.is_linkable() || matches!(self, Product::App | Product::AppClip)
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Product::App => "app",
            Product::AppClip => "app clip",
            Product::CommandLineTool => "command line tool",
            Product::Framework => "framework",
            Product::StaticFramework => "static framework",
            Product::StaticLibrary => "static library",
            Product::DynamicLibrary => "dynamic library",
            Product::Bundle => "bundle",
            Product::UnitTests => "unit tests",
            Product::UiTests => "ui tests",
            Product::AppExtension => "app extension",
            Product::MessagesExtension => "messages extension",
            Product::WatchApp => "watch app",
            Product::WatchExtension => "watch extension",
        };
        f.write_str(s)
    }
}

/// A dependency declared by a target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetDependency {
    /// A target referenced by name, resolved in the same project first
    Target { name: String },

    /// A target in the project at `path`
    Project { target: String, path: PathBuf },

    /// Placeholder: infer dependencies from the target's sources
    Auto,
}

impl TargetDependency {
    pub fn target(name: impl Into<String>) -> Self {
        TargetDependency::Target { name: name.into() }
    }

    pub fn project(target: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        TargetDependency::Project {
            target: target.into(),
            path: path.into(),
        }
    }

    /// Name of the referenced target, if this points at one.
    pub fn target_name(&self) -> Option<&str> {
        match self {
            TargetDependency::Target { name } => Some(name),
            TargetDependency::Project { target, .. } => Some(target),
            TargetDependency::Auto => None,
        }
    }
}

/// A launch argument passed to a run action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaunchArgument {
    pub name: String,
    #[serde(default = "default_enabled", alias = "is_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl LaunchArgument {
    pub fn new(name: impl Into<String>, enabled: bool) -> Self {
        LaunchArgument {
            name: name.into(),
            enabled,
        }
    }
}

/// A target with its configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Target name, unique within its project
    pub name: String,

    /// What kind of product to build
    #[serde(default)]
    pub product: Product,

    /// Declared dependencies, in declaration order
    #[serde(default)]
    pub dependencies: Vec<TargetDependency>,

    /// Environment variables for run/test actions
    #[serde(default)]
    pub environment: BTreeMap<String, String>,

    /// Launch arguments for run actions
    #[serde(default)]
    pub launch_arguments: Vec<LaunchArgument>,

    /// Resolved source files
    #[serde(default)]
    pub sources: Vec<PathBuf>,
}

impl Target {
    /// Create a new target with the given name and product.
    pub fn new(name: impl Into<String>, product: Product) -> Self {
        Target {
            name: name.into(),
            product,
            dependencies: Vec::new(),
            environment: BTreeMap::new(),
            launch_arguments: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Replace the dependencies.
    pub fn with_dependencies(
        mut self,
        dependencies: impl IntoIterator<Item = TargetDependency>,
    ) -> Self {
        self.dependencies = dependencies.into_iter().collect();
        self
    }

    /// Replace the environment.
    pub fn with_environment<K, V>(mut self, environment: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.environment = environment
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Replace the launch arguments.
    pub fn with_launch_arguments(
        mut self,
        arguments: impl IntoIterator<Item = LaunchArgument>,
    ) -> Self {
        self.launch_arguments = arguments.into_iter().collect();
        self
    }

    /// Replace the sources.
    pub fn with_sources(mut self, sources: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.sources = sources.into_iter().map(|p| p.into()).collect();
        self
    }

    /// Check whether the dependencies contain the `Auto` placeholder.
    pub fn has_auto_dependencies(&self) -> bool {
        self.dependencies.contains(&TargetDependency::Auto)
    }
}

/// A reference to a target: the owning project's path plus the target name.
///
/// This is the identity of a target across the whole graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetReference {
    pub project_path: PathBuf,
    pub name: String,
}

impl TargetReference {
    pub fn new(project_path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        TargetReference {
            project_path: project_path.into(),
            name: name.into(),
        }
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }
}

impl fmt::Display for TargetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.project_path.display())
    }
}
