//! Removal of stale derived files.

use std::path::PathBuf;

use crate::core::{Project, SideEffectDescriptor};
use crate::errors::MapperError;
use crate::mapper::ProjectMapper;

/// Directory, relative to a project, holding files derived during
/// generation.
pub const DERIVED_DIRECTORY: &str = "Derived";

/// Deletes the derived directory of each project so generation starts from
/// a clean state.
#[derive(Debug, Clone)]
pub struct DeleteDerivedDirectoryProjectMapper {
    directory_name: String,
}

impl Default for DeleteDerivedDirectoryProjectMapper {
    fn default() -> Self {
        DeleteDerivedDirectoryProjectMapper::new(DERIVED_DIRECTORY)
    }
}

impl DeleteDerivedDirectoryProjectMapper {
    pub fn new(directory_name: impl Into<String>) -> Self {
        DeleteDerivedDirectoryProjectMapper {
            directory_name: directory_name.into(),
        }
    }

    fn derived_directory(&self, project: &Project) -> PathBuf {
        project.path.join(&self.directory_name)
    }
}

impl ProjectMapper for DeleteDerivedDirectoryProjectMapper {
    fn name(&self) -> &'static str {
        "DeleteDerivedDirectoryProjectMapper"
    }

    fn map(&self, project: Project) -> Result<(Project, Vec<SideEffectDescriptor>), MapperError> {
        let derived = self.derived_directory(&project);
        if !derived.is_dir() {
            return Ok((project, Vec::new()));
        }

        tracing::debug!("Scheduling removal of {}", derived.display());
        Ok((project, vec![SideEffectDescriptor::delete_directory(derived)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_existing_directory_is_scheduled_for_removal() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join(DERIVED_DIRECTORY)).unwrap();

        let project = Project::new(tmp.path(), "App");
        let (mapped, effects) = DeleteDerivedDirectoryProjectMapper::default()
            .map(project.clone())
            .unwrap();

        assert_eq!(mapped, project);
        assert_eq!(
            effects,
            vec![SideEffectDescriptor::delete_directory(tmp.path().join(DERIVED_DIRECTORY))]
        );
        // Nothing is removed until the side effects run
        assert!(tmp.path().join(DERIVED_DIRECTORY).exists());
    }

    #[test]
    fn test_missing_directory_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let (_, effects) = DeleteDerivedDirectoryProjectMapper::default()
            .map(Project::new(tmp.path(), "App"))
            .unwrap();
        assert!(effects.is_empty());
    }
}
