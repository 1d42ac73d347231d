//! Generation error types and diagnostics.

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::target::{Product, TargetReference};
use crate::manifest::lint::LintingIssue;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// A dependency cycle between targets.
///
/// `cycle` lists every target on the cycle once; the last target depends on
/// the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircularDependencyError {
    pub cycle: Vec<TargetReference>,
}

impl fmt::Display for CircularDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.cycle.iter().map(|t| t.to_string()).collect();
        if let Some(first) = self.cycle.first() {
            names.push(first.to_string());
        }
        write!(f, "{}", names.join(" -> "))
    }
}

/// Failure inside a mapper. Aborts the rest of the pipeline.
#[derive(Debug, Clone, Error)]
#[error("mapper `{mapper}` failed: {message}")]
pub struct MapperError {
    pub mapper: String,
    pub message: String,
}

impl MapperError {
    pub fn new(mapper: impl Into<String>, message: impl Into<String>) -> Self {
        MapperError {
            mapper: mapper.into(),
            message: message.into(),
        }
    }
}

/// Every fatal error a generation run can produce.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum GeneratorError {
    #[error("manifest not found at {}", .path.display())]
    #[diagnostic(code(loom::manifest::not_found))]
    ManifestNotFound { path: PathBuf },

    #[error("failed to parse manifest {}: {message}", .path.display())]
    #[diagnostic(code(loom::manifest::parse))]
    ManifestParse { path: PathBuf, message: String },

    #[error("failed to convert manifest at {}: {message}", .path.display())]
    #[diagnostic(code(loom::manifest::conversion))]
    Conversion { path: PathBuf, message: String },

    #[error("target `{target}` depends on `{dependency}`, which can't be found")]
    #[diagnostic(code(loom::graph::unresolved_dependency))]
    UnresolvedDependency {
        project: PathBuf,
        target: String,
        dependency: String,
    },

    #[error("target `{target}` depends on {dependency}, a {product} other projects can't use")]
    #[diagnostic(
        code(loom::graph::non_exposed_dependency),
        help("only libraries, frameworks, bundles and apps can be used across projects")
    )]
    NonExposedDependency {
        project: PathBuf,
        target: String,
        dependency: TargetReference,
        product: Product,
    },

    #[error("circular dependency between targets: {0}")]
    #[diagnostic(code(loom::graph::circular_dependency))]
    CircularDependency(CircularDependencyError),

    #[error("manifest linting failed with {} error(s)", .issues.len())]
    #[diagnostic(code(loom::manifest::lint))]
    ManifestLint { issues: Vec<LintingIssue> },

    #[error("{0}")]
    #[diagnostic(code(loom::mapper))]
    Mapper(#[from] MapperError),

    #[error("failed to load config {}: {message}", .path.display())]
    #[diagnostic(code(loom::config))]
    Config { path: PathBuf, message: String },

    #[error("failed to execute side effect: {message}")]
    #[diagnostic(code(loom::side_effect))]
    SideEffect { message: String },
}

impl From<CircularDependencyError> for GeneratorError {
    fn from(e: CircularDependencyError) -> Self {
        GeneratorError::CircularDependency(e)
    }
}

impl GeneratorError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            GeneratorError::ManifestNotFound { path } => {
                Diagnostic::error(format!("no manifest found at {}", path.display()))
                    .with_location(path)
                    .with_suggestion(suggestions::NO_MANIFEST)
            }

            GeneratorError::ManifestParse { path, message } => {
                Diagnostic::error("could not parse manifest")
                    .with_location(path)
                    .with_context(message.clone())
            }

            GeneratorError::Conversion { path, message } => {
                Diagnostic::error("could not convert manifest")
                    .with_location(path)
                    .with_context(message.clone())
            }

            GeneratorError::UnresolvedDependency {
                project,
                target,
                dependency,
            } => Diagnostic::error(format!(
                "target `{}` depends on `{}`, which can't be found",
                target, dependency
            ))
            .with_location(project)
            .with_suggestion(suggestions::TARGET_NOT_FOUND),

            GeneratorError::NonExposedDependency {
                project,
                target,
                dependency,
                product,
            } => Diagnostic::error(format!(
                "target `{}` can't depend on {} from another project",
                target, dependency
            ))
            .with_location(project)
            .with_context(format!("`{}` is a {}", dependency.name, product))
            .with_suggestion("Depend on a library or framework that wraps the shared code"),

            GeneratorError::CircularDependency(cycle) => {
                Diagnostic::error("circular dependency between targets")
                    .with_context(format!("cycle: {}", cycle))
                    .with_suggestion(
                        "Break the cycle by removing or restructuring dependencies".to_string(),
                    )
            }

            GeneratorError::ManifestLint { issues } => {
                let mut diag = Diagnostic::error("manifest linting failed");
                for issue in issues {
                    diag = diag.with_context(issue.to_string());
                }
                diag.with_suggestion(suggestions::FIX_MANIFEST)
            }

            GeneratorError::Mapper(e) => Diagnostic::error(format!("mapper `{}` failed", e.mapper))
                .with_context(e.message.clone()),

            GeneratorError::Config { path, message } => Diagnostic::error("could not load config")
                .with_location(path)
                .with_context(message.clone()),

            GeneratorError::SideEffect { message } => {
                Diagnostic::error("could not execute side effect").with_context(message.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_display_closes_the_loop() {
        let err = CircularDependencyError {
            cycle: vec![
                TargetReference::new("/p", "A"),
                TargetReference::new("/p", "B"),
            ],
        };
        assert_eq!(err.to_string(), "A (/p) -> B (/p) -> A (/p)");
    }

    #[test]
    fn test_circular_dependency_diagnostic() {
        let err = GeneratorError::CircularDependency(CircularDependencyError {
            cycle: vec![TargetReference::new("/p", "A")],
        });

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("circular dependency"));
        assert!(output.contains("A (/p) -> A (/p)"));
        assert!(output.contains("help: consider:"));
    }

    #[test]
    fn test_mapper_error_message() {
        let err: GeneratorError = MapperError::new("Schemes", "boom").into();
        assert_eq!(err.to_string(), "mapper `Schemes` failed: boom");
    }
}
