//! Configuration file support for Loom.
//!
//! The configuration lives in `Loom/Config.toml`, found by walking up from
//! the directory being generated. Without a config file the defaults apply.
//!
//! Configs are memoized per lookup path by a [`ConfigLoader`] that is owned
//! by a single generation run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::{AutomaticSchemesGrouping, TestingOptions};
use crate::errors::GeneratorError;

/// Directory holding the configuration file.
pub const CONFIG_DIRECTORY: &str = "Loom";

/// Configuration file name inside [`CONFIG_DIRECTORY`].
pub const CONFIG_FILE_NAME: &str = "Config.toml";

/// Loom configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generation settings
    pub generation: GenerationConfig,
}

/// Settings consumed by the generation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Whether schemes are generated automatically (default: true)
    pub automatic_schemes: bool,

    /// Default grouping for projects that don't choose one
    pub grouping: AutomaticSchemesGrouping,

    /// Code coverage for generated test actions
    pub code_coverage: CodeCoverageMode,

    /// Default testing options for generated test actions
    pub testing: TestingOptions,

    /// Write a JSON summary of the graph after generation
    pub emit_graph_summary: bool,

    /// Number of parallel manifest conversion workers
    pub jobs: Option<usize>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            automatic_schemes: true,
            grouping: AutomaticSchemesGrouping::default(),
            code_coverage: CodeCoverageMode::default(),
            testing: TestingOptions::default(),
            emit_graph_summary: false,
            jobs: None,
        }
    }
}

/// Which targets generated test actions gather coverage for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeCoverageMode {
    #[default]
    Disabled,

    /// Coverage for every target
    All,

    /// Coverage for the targets built by each scheme
    Relevant,

    /// Coverage for an explicit list of targets
    Targets(Vec<CoverageTarget>),
}

impl CodeCoverageMode {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, CodeCoverageMode::Disabled)
    }
}

/// A coverage target. Without a project, it refers to the project a scheme
/// is generated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageTarget {
    pub target: String,
    #[serde(default)]
    pub project: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Relative coverage project paths are resolved against `root`.
    pub fn load(path: &Path, root: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;

        if let CodeCoverageMode::Targets(targets) = &mut config.generation.code_coverage {
            for target in targets.iter_mut() {
                if let Some(project) = target.project.take() {
                    target.project = Some(crate::util::fs::normalize_path(&root.join(project)));
                }
            }
        }

        Ok(config)
    }
}

/// Find `Loom/Config.toml` in `path` or any parent directory.
pub fn locate_config(path: &Path) -> Option<PathBuf> {
    path.ancestors()
        .map(|dir| dir.join(CONFIG_DIRECTORY).join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Loads configs and memoizes them per lookup path.
///
/// The cache may be populated from several conversion workers at once; the
/// first config stored for a path wins and is never invalidated.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    cache: Mutex<HashMap<PathBuf, Config>>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        ConfigLoader::default()
    }

    /// Load the config that applies to `path`.
    pub fn load_config(&self, path: &Path) -> Result<Config, GeneratorError> {
        if let Some(cached) = self.lock().get(path) {
            return Ok(cached.clone());
        }

        let config = match locate_config(path) {
            Some(config_path) => {
                // <root>/Loom/Config.toml
                let root = config_path
                    .parent()
                    .and_then(Path::parent)
                    .unwrap_or(path)
                    .to_path_buf();
                tracing::debug!("Loading config from {}", config_path.display());
                Config::load(&config_path, &root).map_err(|e| GeneratorError::Config {
                    path: config_path.clone(),
                    message: format!("{:#}", e),
                })?
            }
            None => Config::default(),
        };

        Ok(self
            .lock()
            .entry(path.to_path_buf())
            .or_insert(config)
            .clone())
    }

    /// Number of memoized lookups.
    pub fn cached_len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Config>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
