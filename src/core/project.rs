//! Project - a named collection of targets located at a path.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::scheme::Scheme;
use crate::core::target::Target;

/// Default name of the debug build configuration.
pub const DEFAULT_DEBUG_CONFIGURATION: &str = "Debug";

/// How automatically generated schemes group targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomaticSchemesGrouping {
    /// No schemes are generated
    Disabled,

    /// One scheme named after the project containing every target
    SingleScheme,

    /// Reserved; produces no schemes
    ByName,

    /// Targets sharing a base name (after stripping a suffix) share a scheme
    ByNameSuffix {
        #[serde(default)]
        build: Vec<String>,
        #[serde(default)]
        test: Vec<String>,
        #[serde(default)]
        run: Vec<String>,
    },

    /// One scheme per target
    #[default]
    NotGrouped,
}

/// Flags copied onto every generated testable target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestingOptions {
    pub parallelizable: bool,
    pub random_execution_ordering: bool,
}

/// Options for scheme autogeneration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomaticSchemesOptions {
    pub grouping: AutomaticSchemesGrouping,
    pub code_coverage_enabled: bool,
    pub testing_options: TestingOptions,
}

impl AutomaticSchemesOptions {
    pub fn disabled() -> Self {
        AutomaticSchemesOptions {
            grouping: AutomaticSchemesGrouping::Disabled,
            ..Default::default()
        }
    }

    pub fn enabled(grouping: AutomaticSchemesGrouping) -> Self {
        AutomaticSchemesOptions {
            grouping,
            ..Default::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.grouping != AutomaticSchemesGrouping::Disabled
    }
}

/// Generation options of a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectOptions {
    pub automatic_schemes: AutomaticSchemesOptions,
}

/// A project: its targets, user schemes and generation options.
///
/// Projects are immutable snapshots; mappers produce modified copies
/// through the `with_*` methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Directory containing the project manifest
    pub path: PathBuf,

    pub name: String,

    /// Targets in declaration order
    pub targets: Vec<Target>,

    /// Schemes, user-declared first
    pub schemes: Vec<Scheme>,

    pub options: ProjectOptions,

    pub default_debug_configuration: String,

    /// Supplied by the dependencies boundary rather than a local manifest
    pub is_external: bool,
}

impl Project {
    /// Create a project with no targets or schemes.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Project {
            path: path.into(),
            name: name.into(),
            targets: Vec::new(),
            schemes: Vec::new(),
            options: ProjectOptions::default(),
            default_debug_configuration: DEFAULT_DEBUG_CONFIGURATION.to_string(),
            is_external: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get a target by name.
    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.name == name)
    }

    pub fn target_names(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(|t| t.name.as_str())
    }

    pub fn with_targets(&self, targets: Vec<Target>) -> Self {
        Project {
            targets,
            ..self.clone()
        }
    }

    pub fn with_schemes(&self, schemes: Vec<Scheme>) -> Self {
        Project {
            schemes,
            ..self.clone()
        }
    }

    pub fn with_options(&self, options: ProjectOptions) -> Self {
        Project {
            options,
            ..self.clone()
        }
    }

    /// Mark the project as coming from the dependencies boundary.
    pub fn external(mut self) -> Self {
        self.is_external = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::target::Product;

    #[test]
    fn test_grouping_defaults_to_not_grouped() {
        assert_eq!(AutomaticSchemesGrouping::default(), AutomaticSchemesGrouping::NotGrouped);
        let options = AutomaticSchemesOptions::default();
        assert!(options.is_enabled());
        assert_eq!(options.grouping, AutomaticSchemesGrouping::NotGrouped);
    }

    #[test]
    fn test_with_schemes_is_a_copy() {
        let project =
            Project::new("/p", "P").with_targets(vec![Target::new("A", Product::Framework)]);
        let updated = project.with_schemes(vec![Scheme::new("A")]);

        assert!(project.schemes.is_empty());
        assert_eq!(updated.schemes.len(), 1);
        assert_eq!(updated.targets, project.targets);
    }

    #[test]
    fn test_grouping_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            grouping: AutomaticSchemesGrouping,
        }

        let w: Wrapper = toml::from_str("grouping = \"single_scheme\"").unwrap();
        assert_eq!(w.grouping, AutomaticSchemesGrouping::SingleScheme);

        let w: Wrapper =
            toml::from_str("grouping = { by_name_suffix = { test = [\"Tests\"] } }").unwrap();
        assert_eq!(
            w.grouping,
            AutomaticSchemesGrouping::ByNameSuffix {
                build: vec![],
                test: vec!["Tests".to_string()],
                run: vec![],
            }
        );
    }
}
