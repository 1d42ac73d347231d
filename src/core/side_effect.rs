//! Deferred side effects produced by mappers.
//!
//! Mappers never touch the filesystem or spawn processes themselves. They
//! describe what should happen, and the orchestrator executes the collected
//! descriptors once every stage has succeeded.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Whether a file or directory should exist after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorState {
    Present,
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SideEffectDescriptor {
    /// Write (or delete) a file
    File {
        path: PathBuf,
        contents: Option<Vec<u8>>,
        state: DescriptorState,
    },

    /// Create (or delete) a directory
    Directory { path: PathBuf, state: DescriptorState },

    /// Run a command, program first
    Command { command: Vec<String> },
}

impl SideEffectDescriptor {
    /// A file that should exist with the given contents.
    pub fn write_file(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        SideEffectDescriptor::File {
            path: path.into(),
            contents: Some(contents.into()),
            state: DescriptorState::Present,
        }
    }

    pub fn delete_file(path: impl Into<PathBuf>) -> Self {
        SideEffectDescriptor::File {
            path: path.into(),
            contents: None,
            state: DescriptorState::Absent,
        }
    }

    pub fn create_directory(path: impl Into<PathBuf>) -> Self {
        SideEffectDescriptor::Directory {
            path: path.into(),
            state: DescriptorState::Present,
        }
    }

    pub fn delete_directory(path: impl Into<PathBuf>) -> Self {
        SideEffectDescriptor::Directory {
            path: path.into(),
            state: DescriptorState::Absent,
        }
    }

    pub fn command<I, S>(command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SideEffectDescriptor::Command {
            command: command.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for SideEffectDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SideEffectDescriptor::File { path, state, .. } => match state {
                DescriptorState::Present => write!(f, "write {}", path.display()),
                DescriptorState::Absent => write!(f, "delete {}", path.display()),
            },
            SideEffectDescriptor::Directory { path, state } => match state {
                DescriptorState::Present => write!(f, "create directory {}", path.display()),
                DescriptorState::Absent => write!(f, "delete directory {}", path.display()),
            },
            SideEffectDescriptor::Command { command } => write!(f, "run `{}`", command.join(" ")),
        }
    }
}
