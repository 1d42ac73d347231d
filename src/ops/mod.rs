//! High-level operations.
//!
//! This module contains the implementation of Loom commands.

pub mod auto_dependencies;
pub mod generate;
pub mod side_effects;

pub use auto_dependencies::infer_auto_dependencies;
pub use generate::{GenerateOptions, Generated, Generator};
pub use side_effects::SideEffectExecutor;
