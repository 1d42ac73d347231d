//! Command implementations

use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use loom::manifest::ManifestLoader;
use loom::ops::{GenerateOptions, Generator};
use loom::util::fs::normalize_path;

pub mod completions;
pub mod generate;
pub mod graph;
pub mod schemes;

/// Absolute, normalized form of the path argument.
fn manifest_dir(path: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("failed to read the current directory")?;
    Ok(match path {
        Some(path) => normalize_path(&cwd.join(path)),
        None => cwd,
    })
}

/// Run a generator future to completion on a fresh runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let rt = tokio::runtime::Runtime::new().context("failed to create async runtime")?;
    Ok(rt.block_on(future))
}

/// Generator reading manifests from disk.
fn generator(options: GenerateOptions) -> Generator {
    Generator::new(Box::new(ManifestLoader::new()), options)
}
