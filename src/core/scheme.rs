//! Schemes - named build/test/run specifications.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::target::{LaunchArgument, TargetReference};

/// Environment and launch arguments attached to a run or test action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arguments {
    pub environment: BTreeMap<String, String>,
    pub launch_arguments: Vec<LaunchArgument>,
}

impl Arguments {
    pub fn is_empty(&self) -> bool {
        self.environment.is_empty() && self.launch_arguments.is_empty()
    }
}

/// Targets to build, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildAction {
    pub targets: Vec<TargetReference>,
}

impl BuildAction {
    pub fn new(targets: Vec<TargetReference>) -> Self {
        BuildAction { targets }
    }
}

/// A test bundle inside a test action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestableTarget {
    pub target: TargetReference,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default)]
    pub parallelizable: bool,
    #[serde(default)]
    pub random_execution_ordering: bool,
}

impl TestableTarget {
    pub fn new(target: TargetReference) -> Self {
        TestableTarget {
            target,
            skipped: false,
            parallelizable: false,
            random_execution_ordering: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestAction {
    pub targets: Vec<TestableTarget>,
    pub configuration_name: String,
    pub attach_debugger: bool,
    pub coverage: bool,
    /// Empty means coverage is gathered from every target
    pub code_coverage_targets: Vec<TargetReference>,
    pub arguments: Option<Arguments>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunAction {
    pub configuration_name: String,
    pub attach_debugger: bool,
    pub executable: TargetReference,
    pub arguments: Option<Arguments>,
}

/// A named, shareable build/test/run specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheme {
    pub name: String,
    pub shared: bool,
    pub build_action: Option<BuildAction>,
    pub test_action: Option<TestAction>,
    pub run_action: Option<RunAction>,
}

impl Scheme {
    /// Create a shared scheme without any actions.
    pub fn new(name: impl Into<String>) -> Self {
        Scheme {
            name: name.into(),
            shared: true,
            build_action: None,
            test_action: None,
            run_action: None,
        }
    }

    pub fn with_build_action(mut self, action: BuildAction) -> Self {
        self.build_action = Some(action);
        self
    }

    pub fn with_test_action(mut self, action: TestAction) -> Self {
        self.test_action = Some(action);
        self
    }

    pub fn with_run_action(mut self, action: RunAction) -> Self {
        self.run_action = Some(action);
        self
    }

    /// Targets built by this scheme, empty when there is no build action.
    pub fn build_targets(&self) -> &[TargetReference] {
        self.build_action
            .as_ref()
            .map(|a| a.targets.as_slice())
            .unwrap_or(&[])
    }

    /// Test bundles run by this scheme.
    pub fn test_targets(&self) -> Vec<&TargetReference> {
        self.test_action
            .iter()
            .flat_map(|a| a.targets.iter().map(|t| &t.target))
            .collect()
    }

    pub fn run_target(&self) -> Option<&TargetReference> {
        self.run_action.as_ref().map(|a| &a.executable)
    }
}
