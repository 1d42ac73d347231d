//! Validation and graph construction over converted projects.
//!
//! Both stages resolve target dependencies the same way: a bare target
//! name prefers the declaring project, then an exposed target of another
//! project; an explicit project reference must point at an exposed target.

pub mod circular;
pub mod graph_lint;
pub mod graph_loader;
pub mod resolve;

pub use circular::CircularDependencyLinter;
pub use graph_lint::GraphLinter;
pub use graph_loader::GraphLoader;
pub use resolve::ProjectIndex;
