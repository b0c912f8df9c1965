//! Configuration loading and management for the VR/VA benefit engine.
//!
//! This module loads run settings from a YAML file: input and output
//! locations, source file-name overrides, fallback rate and working-day maps,
//! and the document assistant settings.
//!
//! # Example
//!
//! ```no_run
//! use vr_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/vr").unwrap();
//! println!("Reading from: {}", config.config().input_dir.display());
//! ```

mod loader;
mod types;

pub use loader::{ConfigLoader, PROMPT_FILE, SETTINGS_FILE};
pub use types::{
    AssistantSettings, DEFAULT_UNION, DefaultValues, PipelineConfig, RIO_GRANDE_DO_SUL, SAO_PAULO,
};
