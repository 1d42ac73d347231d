//! Resolution of declared target dependencies to concrete targets.
//!
//! The circular dependency linter and the graph loader both resolve
//! through [`ProjectIndex`] so they always agree on the edges.

use std::collections::BTreeMap;
use std::path::Path;

use crate::core::{Project, Target, TargetDependency, TargetReference};
use crate::errors::GeneratorError;

/// Projects indexed by path, ascending.
pub struct ProjectIndex<'a> {
    projects: BTreeMap<&'a Path, &'a Project>,
}

impl<'a> ProjectIndex<'a> {
    pub fn new(projects: impl IntoIterator<Item = &'a Project>) -> Self {
        ProjectIndex {
            projects: projects.into_iter().map(|p| (p.path(), p)).collect(),
        }
    }

    pub fn project(&self, path: &Path) -> Option<&'a Project> {
        self.projects.get(path).copied()
    }

    /// Projects in ascending path order.
    pub fn projects(&self) -> impl Iterator<Item = &'a Project> + '_ {
        self.projects.values().copied()
    }

    /// Resolve one dependency of `target` in `project`.
    ///
    /// A bare name prefers the target in the same project, then the first
    /// exposed target with that name in another project. `Auto` resolves to
    /// nothing.
    pub fn resolve(
        &self,
        project: &Project,
        target: &Target,
        dependency: &TargetDependency,
    ) -> Result<Option<TargetReference>, GeneratorError> {
        match dependency {
            TargetDependency::Target { name } => {
                if project.target(name).is_some() {
                    return Ok(Some(TargetReference::new(&project.path, name)));
                }

                let mut candidates = self.projects().filter(|other| {
                    other.path != project.path
                        && other.target(name).is_some_and(|t| t.product.is_exposed())
                });

                let Some(first) = candidates.next() else {
                    return Err(unresolved(project, target, name.clone()));
                };
                if let Some(other) = candidates.next() {
                    tracing::warn!(
                        "`{}` in {} matches targets in {} and {}; using the first",
                        name,
                        project.path.display(),
                        first.path.display(),
                        other.path.display()
                    );
                }
                Ok(Some(TargetReference::new(&first.path, name)))
            }

            TargetDependency::Project { target: name, path } => {
                let reference = TargetReference::new(path, name);
                let dependency_target = self
                    .project(path)
                    .and_then(|p| p.target(name))
                    .ok_or_else(|| unresolved(project, target, reference.to_string()))?;

                if path != &project.path && !dependency_target.product.is_exposed() {
                    return Err(GeneratorError::NonExposedDependency {
                        project: project.path.clone(),
                        target: target.name.clone(),
                        dependency: reference,
                        product: dependency_target.product,
                    });
                }
                Ok(Some(reference))
            }

            TargetDependency::Auto => Ok(None),
        }
    }

    /// Resolve every dependency of `target`, in declaration order.
    pub fn resolve_all(
        &self,
        project: &Project,
        target: &Target,
    ) -> Result<Vec<TargetReference>, GeneratorError> {
        let mut resolved = Vec::with_capacity(target.dependencies.len());
        for dependency in &target.dependencies {
            if let Some(reference) = self.resolve(project, target, dependency)? {
                resolved.push(reference);
            }
        }
        Ok(resolved)
    }
}

fn unresolved(project: &Project, target: &Target, dependency: String) -> GeneratorError {
    GeneratorError::UnresolvedDependency {
        project: project.path.clone(),
        target: target.name.clone(),
        dependency,
    }
}
