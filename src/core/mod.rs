//! Core data structures for Loom.
//!
//! This module contains the domain model every stage works on:
//! - Targets, projects and workspaces converted from manifests
//! - Schemes produced by project mappers
//! - The resolved dependency graph
//! - Deferred side effects

pub mod graph;
pub mod project;
pub mod scheme;
pub mod side_effect;
pub mod target;
pub mod workspace;

pub use graph::{Graph, GraphTarget};
pub use project::{
    AutomaticSchemesGrouping, AutomaticSchemesOptions, Project, ProjectOptions, TestingOptions,
};
pub use scheme::{Arguments, BuildAction, RunAction, Scheme, TestAction, TestableTarget};
pub use side_effect::{DescriptorState, SideEffectDescriptor};
pub use target::{LaunchArgument, Product, Target, TargetDependency, TargetReference};
pub use workspace::Workspace;
