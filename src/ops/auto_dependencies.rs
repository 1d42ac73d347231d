//! Inference of `auto` dependencies from source imports.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::{Project, Target, TargetDependency};
use crate::errors::GeneratorError;
use crate::util::fs;

static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"import (?:struct |class |enum |protocol |typealias |func |let |var )?",
        r"([^.\n]+)[\n.]",
    ))
    .expect("import pattern is valid")
});

/// Module names imported by a source file.
pub fn imported_modules(source: &str) -> BTreeSet<String> {
    IMPORT
        .captures_iter(source)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Replace `auto` dependencies of every target with the sibling targets its
/// sources import.
pub fn infer_auto_dependencies(projects: Vec<Project>) -> Result<Vec<Project>, GeneratorError> {
    projects.into_iter().map(infer_project).collect()
}

fn infer_project(project: Project) -> Result<Project, GeneratorError> {
    if !project.targets.iter().any(Target::has_auto_dependencies) {
        return Ok(project);
    }

    let targets = project
        .targets
        .iter()
        .map(|target| {
            if target.has_auto_dependencies() {
                infer_target(&project, target)
            } else {
                Ok(target.clone())
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(project.with_targets(targets))
}

fn infer_target(project: &Project, target: &Target) -> Result<Target, GeneratorError> {
    let mut imports = BTreeSet::new();
    for source in &target.sources {
        let contents = fs::read_to_string(source).map_err(|e| GeneratorError::Conversion {
            path: project.path.clone(),
            message: format!("target `{}`: {:#}", target.name, e),
        })?;
        imports.extend(imported_modules(&contents));
    }

    let mut dependencies: Vec<TargetDependency> = target
        .dependencies
        .iter()
        .filter(|d| **d != TargetDependency::Auto)
        .cloned()
        .collect();

    for sibling in project.target_names() {
        let already_declared = dependencies.iter().any(|d| d.target_name() == Some(sibling));
        if sibling != target.name && imports.contains(sibling) && !already_declared {
            dependencies.push(TargetDependency::target(sibling));
        }
    }

    tracing::debug!(
        "Inferred {} dependencies for {}",
        dependencies.len(),
        target.name
    );
    Ok(target.clone().with_dependencies(dependencies))
}
