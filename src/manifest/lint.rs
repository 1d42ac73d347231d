//! Structural checks on raw manifests.
//!
//! Warnings are logged and generation continues; any error aborts it.

use std::collections::HashSet;
use std::fmt;

use crate::core::Product;
use crate::errors::GeneratorError;
use crate::manifest::{RawProject, RawWorkspace};
use crate::util::diagnostic::Severity;

/// A single problem found in a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintingIssue {
    pub reason: String,
    pub severity: Severity,
}

impl LintingIssue {
    pub fn error(reason: impl Into<String>) -> Self {
        LintingIssue {
            reason: reason.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(reason: impl Into<String>) -> Self {
        LintingIssue {
            reason: reason.into(),
            severity: Severity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for LintingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.reason)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestLinter;

impl ManifestLinter {
    pub fn new() -> Self {
        ManifestLinter
    }

    pub fn lint_project(&self, manifest: &RawProject) -> Vec<LintingIssue> {
        let mut issues = Vec::new();

        if manifest.name.trim().is_empty() {
            issues.push(LintingIssue::error("the project name is empty"));
        }

        let mut names = HashSet::new();
        for target in &manifest.targets {
            if target.name.trim().is_empty() {
                issues.push(LintingIssue::error(format!(
                    "project `{}` has a target with an empty name",
                    manifest.name
                )));
                continue;
            }
            if !names.insert(target.name.as_str()) {
                issues.push(LintingIssue::error(format!(
                    "target `{}` is declared more than once in project `{}`",
                    target.name, manifest.name
                )));
            }
            if target.sources.is_empty() && target.product != Product::Bundle {
                issues.push(LintingIssue::warning(format!(
                    "target `{}` has no source patterns",
                    target.name
                )));
            }
        }

        let mut scheme_names = HashSet::new();
        for scheme in &manifest.schemes {
            if !scheme_names.insert(scheme.name.as_str()) {
                issues.push(LintingIssue::warning(format!(
                    "scheme `{}` is declared more than once in project `{}`",
                    scheme.name, manifest.name
                )));
            }
        }

        issues
    }

    pub fn lint_workspace(&self, manifest: &RawWorkspace) -> Vec<LintingIssue> {
        let mut issues = Vec::new();

        if manifest.name.trim().is_empty() {
            issues.push(LintingIssue::error("the workspace name is empty"));
        }
        if manifest.projects.is_empty() {
            issues.push(LintingIssue::warning(format!(
                "workspace `{}` has no projects",
                manifest.name
            )));
        }

        issues
    }
}

/// Log warnings and fail when any issue is an error.
pub fn print_and_throw_if_needed(issues: Vec<LintingIssue>) -> Result<(), GeneratorError> {
    for issue in issues.iter().filter(|i| !i.is_error()) {
        tracing::warn!("{}", issue.reason);
    }

    let errors: Vec<_> = issues.into_iter().filter(LintingIssue::is_error).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(GeneratorError::ManifestLint { issues: errors })
    }
}
