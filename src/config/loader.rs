//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{EngineError, EngineResult};

use super::types::{EngineConfig, EngineSettings, TaxBracketsConfig};

/// Loads the engine configuration from a directory.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml        # Currency, rounding, insurance, batch and invoice settings
/// └── tax_brackets.yaml  # Progressive tax schedule
/// ```
///
/// # Example
///
/// ```no_run
/// use ledger_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default")?;
/// println!("Insurance rate: {}", loader.config().insurance_rate());
/// # Ok::<(), ledger_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - Either file is missing (`ConfigNotFound`)
    /// - Either file contains invalid YAML or a malformed bracket table
    ///   (`ConfigParseError`)
    /// - The settings are inconsistent with the table (`Configuration`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;
        let brackets = Self::load_yaml::<TaxBracketsConfig>(&path.join("tax_brackets.yaml"))?;
        let config = EngineConfig::new(settings, brackets.brackets)?;

        info!(
            path = %path.display(),
            currency = %config.currency(),
            brackets = config.tax_table().brackets().len(),
            rounding_scale = config.rounding().scale,
            "Loaded engine configuration"
        );

        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> EngineConfig {
        self.config
    }
}
