//! Loom - A generator for multi-project build descriptions
//!
//! This crate provides the core library functionality for Loom: loading
//! project and workspace manifests, inferring and validating target
//! dependencies, running the mapper pipeline and building the final graph.

pub mod core;
pub mod errors;
pub mod loader;
pub mod manifest;
pub mod mapper;
pub mod ops;
pub mod util;

/// Test utilities for Loom unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides an in-memory manifest loader and on-disk fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{Graph, Project, Scheme, Target, Workspace};
pub use errors::GeneratorError;
pub use ops::Generator;
