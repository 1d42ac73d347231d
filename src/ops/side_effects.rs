//! Execution of deferred side effects.

use anyhow::{Context, Result};

use crate::core::{DescriptorState, SideEffectDescriptor};
use crate::util::fs;
use crate::util::process::ProcessBuilder;

/// Applies side effect descriptors in order, stopping at the first failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct SideEffectExecutor {
    dry_run: bool,
}

impl SideEffectExecutor {
    pub fn new() -> Self {
        SideEffectExecutor::default()
    }

    /// Log the side effects instead of applying them.
    pub fn dry_run() -> Self {
        SideEffectExecutor { dry_run: true }
    }

    pub fn execute(&self, side_effects: &[SideEffectDescriptor]) -> Result<()> {
        for side_effect in side_effects {
            if self.dry_run {
                tracing::info!("Would {}", side_effect);
                continue;
            }
            tracing::debug!("Side effect: {}", side_effect);
            self.apply(side_effect)
                .with_context(|| format!("failed to {}", side_effect))?;
        }
        Ok(())
    }

    fn apply(&self, side_effect: &SideEffectDescriptor) -> Result<()> {
        match side_effect {
            SideEffectDescriptor::File {
                path,
                contents,
                state: DescriptorState::Present,
            } => fs::write_bytes(path, contents.as_deref().unwrap_or_default()),

            SideEffectDescriptor::File {
                path,
                state: DescriptorState::Absent,
                ..
            } => fs::remove_file_if_exists(path),

            SideEffectDescriptor::Directory {
                path,
                state: DescriptorState::Present,
            } => fs::ensure_dir(path),

            SideEffectDescriptor::Directory {
                path,
                state: DescriptorState::Absent,
            } => fs::remove_dir_all_if_exists(path),

            SideEffectDescriptor::Command { command } => {
                ProcessBuilder::from_command(command)?.exec_and_check()?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_files_and_directories() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("out/summary.json");
        let stale = tmp.path().join("Derived");
        std::fs::create_dir_all(stale.join("Nested")).unwrap();

        SideEffectExecutor::new()
            .execute(&[
                SideEffectDescriptor::write_file(&file, "{}"),
                SideEffectDescriptor::delete_directory(&stale),
                SideEffectDescriptor::create_directory(tmp.path().join("Created")),
            ])
            .unwrap();

        assert_eq!(std::fs::read_to_string(&file).unwrap(), "{}");
        assert!(!stale.exists());
        assert!(tmp.path().join("Created").is_dir());

        SideEffectExecutor::new()
            .execute(&[SideEffectDescriptor::delete_file(&file)])
            .unwrap();
        assert!(!file.exists());
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.txt");

        SideEffectExecutor::dry_run()
            .execute(&[SideEffectDescriptor::write_file(&file, "x")])
            .unwrap();
        assert!(!file.exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_failing_command_stops_execution() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("after.txt");

        let err = SideEffectExecutor::new()
            .execute(&[
                SideEffectDescriptor::command(["false"]),
                SideEffectDescriptor::write_file(&file, "x"),
            ])
            .unwrap_err();

        assert!(err.to_string().contains("failed to run `false`"));
        assert!(!file.exists());
    }
}
