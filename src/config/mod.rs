//! Configuration loading and management for the ledger engine.
//!
//! This module loads the engine configuration (currency, rounding, insurance
//! rate, batch limits, invoice settlement order and the progressive tax
//! schedule) from YAML files into a validated, immutable [`EngineConfig`].
//!
//! # Example
//!
//! ```no_run
//! use ledger_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap().into_config();
//! println!("Tax brackets: {}", config.tax_table().brackets().len());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    BatchSettings, DEFAULT_MAX_CONCURRENCY, DEFAULT_RESOLVER_TIMEOUT_MS, EngineConfig,
    EngineSettings, InvoiceSettings, TaxBracketsConfig,
};
