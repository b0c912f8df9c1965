//! Application state for the VR/VA benefit engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::assistant::DocumentAssistant;
use crate::config::ConfigLoader;

/// Shared application state.
///
/// Holds the immutable run configuration and, when one could be set up, the
/// document assistant.
#[derive(Clone)]
pub struct AppState {
    /// The loaded run configuration.
    config: Arc<ConfigLoader>,
    /// The document assistant, if available.
    assistant: Option<Arc<dyn DocumentAssistant>>,
}

impl AppState {
    /// Creates a new application state with the given configuration loader
    /// and no assistant.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            config: Arc::new(config),
            assistant: None,
        }
    }

    /// Attaches a document assistant.
    pub fn with_assistant(mut self, assistant: impl DocumentAssistant + 'static) -> Self {
        self.assistant = Some(Arc::new(assistant));
        self
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns a shared handle to the configuration loader.
    pub fn config_handle(&self) -> Arc<ConfigLoader> {
        Arc::clone(&self.config)
    }

    /// Returns the document assistant, if one is attached.
    pub fn assistant(&self) -> Option<&dyn DocumentAssistant> {
        self.assistant.as_deref()
    }
}
