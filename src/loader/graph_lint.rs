//! Checks on the loaded graph.

use crate::core::{Graph, TargetReference};
use crate::manifest::LintingIssue;
use crate::util::config::CodeCoverageMode;

#[derive(Debug, Clone, Copy, Default)]
pub struct GraphLinter;

impl GraphLinter {
    pub fn new() -> Self {
        GraphLinter
    }

    /// Every coverage target named in the config must exist in the graph.
    ///
    /// A target without a project may live in any local project.
    pub fn lint_code_coverage(&self, graph: &Graph, mode: &CodeCoverageMode) -> Vec<LintingIssue> {
        let CodeCoverageMode::Targets(targets) = mode else {
            return Vec::new();
        };

        targets
            .iter()
            .filter_map(|coverage| match &coverage.project {
                Some(project) => {
                    let reference = TargetReference::new(project, &coverage.target);
                    graph.target(&reference).is_none().then(|| {
                        LintingIssue::error(format!(
                            "coverage target `{}` doesn't exist in the project at {}",
                            coverage.target,
                            project.display()
                        ))
                    })
                }
                None => {
                    let found = graph
                        .projects()
                        .filter(|p| !p.is_external)
                        .any(|p| p.target(&coverage.target).is_some());
                    (!found).then(|| {
                        LintingIssue::error(format!(
                            "coverage target `{}` doesn't exist in any project",
                            coverage.target
                        ))
                    })
                }
            })
            .collect()
    }
}
