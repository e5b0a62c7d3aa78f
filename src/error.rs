//! Error types for the ledger engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the engine can report, plus the per-employee
//! [`SettlementError`] that the payroll batch runner emits instead of
//! aborting a run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type for the ledger engine.
///
/// # Example
///
/// ```
/// use ledger_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration was readable but semantically invalid, e.g. a tax
    /// bracket table with a gap or a rate above 100%.
    #[error("Configuration error: {message}")]
    Configuration {
        /// A description of what is wrong with the configuration.
        message: String,
    },

    /// A calculation input was outside its permitted range.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The offending field.
        field: String,
        /// A description of what made the value invalid.
        message: String,
    },

    /// The overtime/bonus resolver failed for an employee.
    #[error("Resolver failed for employee '{employee_id}': {message}")]
    Resolver {
        /// The employee being resolved.
        employee_id: String,
        /// A description of the failure.
        message: String,
    },

    /// The overtime/bonus resolver did not answer in time.
    #[error("Resolver timed out for employee '{employee_id}' after {timeout_ms}ms")]
    ResolverTimeout {
        /// The employee being resolved.
        employee_id: String,
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// A general calculation error, such as decimal overflow.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for an [`EngineError::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        EngineError::Configuration {
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

/// Why a single employee's settlement failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementErrorKind {
    /// The resolver returned an error.
    Resolver,
    /// The resolver did not answer within the configured timeout.
    Timeout,
    /// The employee's inputs were invalid.
    InvalidInput,
    /// The tax table could not cover the employee's gross salary.
    Configuration,
    /// Arithmetic failed (overflow).
    Calculation,
    /// The batch was cancelled before this employee was scheduled.
    Cancelled,
    /// The settlement task ended without producing a result.
    Aborted,
}

/// A failed settlement for one employee in a payroll batch.
///
/// Never fatal to the batch: the runner records it in place of the
/// employee's settlement record and carries on with the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("Settlement failed for employee '{employee_id}': {message}")]
pub struct SettlementError {
    /// The employee whose settlement failed.
    pub employee_id: String,
    /// The failure category.
    pub kind: SettlementErrorKind,
    /// A human-readable description.
    pub message: String,
}

impl SettlementError {
    /// Wraps an engine error raised while settling `employee_id`.
    pub fn from_engine(employee_id: impl Into<String>, error: EngineError) -> Self {
        let kind = match &error {
            EngineError::Resolver { .. } => SettlementErrorKind::Resolver,
            EngineError::ResolverTimeout { .. } => SettlementErrorKind::Timeout,
            EngineError::InvalidInput { .. } => SettlementErrorKind::InvalidInput,
            EngineError::Configuration { .. }
            | EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. } => SettlementErrorKind::Configuration,
            EngineError::CalculationError { .. } => SettlementErrorKind::Calculation,
        };
        SettlementError {
            employee_id: employee_id.into(),
            kind,
            message: error.to_string(),
        }
    }

    /// An employee that was never scheduled because the batch was cancelled.
    pub fn cancelled(employee_id: impl Into<String>) -> Self {
        SettlementError {
            employee_id: employee_id.into(),
            kind: SettlementErrorKind::Cancelled,
            message: "batch cancelled before settlement started".to_string(),
        }
    }

    /// An employee whose settlement task ended without reporting back.
    pub fn aborted(employee_id: impl Into<String>) -> Self {
        SettlementError {
            employee_id: employee_id.into(),
            kind: SettlementErrorKind::Aborted,
            message: "settlement task ended without a result".to_string(),
        }
    }
}
