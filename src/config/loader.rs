//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading run settings
//! from a YAML file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{EngineError, EngineResult};
use crate::sources::SourceName;

use super::types::PipelineConfig;

/// File name of the settings file inside a configuration directory.
pub const SETTINGS_FILE: &str = "settings.yaml";

/// File name of the custom assistant prompt inside the input directory.
pub const PROMPT_FILE: &str = "prompt.md";

/// Loads and provides access to run configuration.
///
/// # Directory Structure
///
/// ```text
/// config/vr/
/// └── settings.yaml   # Paths, fallbacks, assistant settings
/// ```
///
/// # Example
///
/// ```no_run
/// use vr_engine::config::ConfigLoader;
/// use vr_engine::sources::SourceName;
///
/// let loader = ConfigLoader::load("./config/vr")?;
/// println!("Roster: {}", loader.source_path(SourceName::Ativos).display());
/// # Ok::<(), vr_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PipelineConfig,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl ConfigLoader {
    /// Wraps an already-built configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Loads configuration from `settings.yaml` in the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - The settings file is missing
    /// - The file contains invalid YAML
    /// - A source override names an unknown source
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        Self::load_file(path.as_ref().join(SETTINGS_FILE))
    }

    /// Loads configuration from an explicit settings file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        let config: PipelineConfig =
            serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
                path: path_str.clone(),
                message: e.to_string(),
            })?;

        Self::validate(&config, &path_str)?;
        Ok(Self { config })
    }

    fn validate(config: &PipelineConfig, path: &str) -> EngineResult<()> {
        for key in config.sources.keys() {
            key.parse::<SourceName>()
                .map_err(|message| EngineError::ConfigParseError {
                    path: path.to_string(),
                    message,
                })?;
        }
        if config.assistant.chunk_overlap >= config.assistant.chunk_size {
            return Err(EngineError::ConfigParseError {
                path: path.to_string(),
                message: format!(
                    "chunk_overlap ({}) must be smaller than chunk_size ({})",
                    config.assistant.chunk_overlap, config.assistant.chunk_size
                ),
            });
        }
        Ok(())
    }

    /// Applies assistant overrides from the process environment.
    pub fn with_env_overrides(mut self) -> Self {
        self.config
            .assistant
            .apply_env(|key| std::env::var(key).ok());
        self
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the configuration for in-place adjustment (CLI overrides).
    pub fn config_mut(&mut self) -> &mut PipelineConfig {
        &mut self.config
    }

    /// Resolves the path a source is read from.
    pub fn source_path(&self, source: SourceName) -> PathBuf {
        let file_name = self
            .config
            .sources
            .get(source.key())
            .map(String::as_str)
            .unwrap_or_else(|| source.default_file_name());
        self.config.input_dir.join(file_name)
    }

    /// Path of the custom assistant prompt.
    pub fn prompt_path(&self) -> PathBuf {
        self.config.input_dir.join(PROMPT_FILE)
    }
}
