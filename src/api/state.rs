//! Application state for the ledger engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::EngineConfig;

/// Shared application state.
///
/// Holds the engine configuration loaded once at startup.
#[derive(Clone)]
pub struct AppState {
    config: Arc<EngineConfig>,
}

impl AppState {
    /// Creates a new application state with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns a shared handle to the configuration.
    pub fn shared_config(&self) -> Arc<EngineConfig> {
        Arc::clone(&self.config)
    }
}
