//! Configuration types for the ledger engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files, and the validated
//! [`EngineConfig`] the calculations read from.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};
use crate::models::{MAX_SCALE, Rounding, SettlementOrder, TaxBracket, TaxBracketTable};

/// Default number of employees settled concurrently.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Default resolver timeout in milliseconds.
pub const DEFAULT_RESOLVER_TIMEOUT_MS: u64 = 2_000;

fn default_currency() -> String {
    "IRR".to_string()
}

fn default_insurance_rate() -> Decimal {
    Decimal::new(7, 2)
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

fn default_resolver_timeout_ms() -> u64 {
    DEFAULT_RESOLVER_TIMEOUT_MS
}

/// Payroll batch settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BatchSettings {
    /// Maximum number of employees settled at the same time.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Per-employee timeout for the overtime/bonus resolver.
    #[serde(default = "default_resolver_timeout_ms")]
    pub resolver_timeout_ms: u64,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            resolver_timeout_ms: DEFAULT_RESOLVER_TIMEOUT_MS,
        }
    }
}

/// Invoice settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct InvoiceSettings {
    /// Whether tax or discount is applied first.
    #[serde(default)]
    pub settlement_order: SettlementOrder,
}

/// Contents of `engine.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineSettings {
    /// ISO currency code amounts are expressed in.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Fractional digits kept on every derived amount.
    #[serde(default)]
    pub rounding_scale: u32,
    /// Employee insurance share as a fraction of gross salary.
    #[serde(default = "default_insurance_rate")]
    pub insurance_rate: Decimal,
    /// Payroll batch settings.
    #[serde(default)]
    pub batch: BatchSettings,
    /// Invoice settings.
    #[serde(default)]
    pub invoice: InvoiceSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            rounding_scale: 0,
            insurance_rate: default_insurance_rate(),
            batch: BatchSettings::default(),
            invoice: InvoiceSettings::default(),
        }
    }
}

/// Contents of `tax_brackets.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxBracketsConfig {
    /// The progressive schedule, lowest bracket first.
    pub brackets: TaxBracketTable,
}

/// The validated, immutable configuration the engine runs with.
///
/// Built once, then shared (typically behind an `Arc`) by every calculation.
/// Nothing reads configuration from global state, so several engines with
/// different configurations can run side by side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    settings: EngineSettings,
    tax_table: TaxBracketTable,
}

impl EngineConfig {
    /// Validates settings against a tax table.
    ///
    /// Fails with [`EngineError::Configuration`] if the table has no
    /// open-ended top bracket, the insurance rate is outside `[0, 1]`, the
    /// rounding scale is too large, or the batch settings are zero.
    pub fn new(settings: EngineSettings, tax_table: TaxBracketTable) -> EngineResult<Self> {
        if !tax_table.is_open_ended() {
            return Err(EngineError::configuration(
                "tax bracket table must end with an open-ended bracket",
            ));
        }
        if settings.insurance_rate < Decimal::ZERO || settings.insurance_rate > Decimal::ONE {
            return Err(EngineError::configuration(format!(
                "insurance_rate {} is outside [0, 1]",
                settings.insurance_rate
            )));
        }
        if settings.rounding_scale > MAX_SCALE {
            return Err(EngineError::configuration(format!(
                "rounding_scale {} exceeds {}",
                settings.rounding_scale, MAX_SCALE
            )));
        }
        if settings.batch.max_concurrency == 0 {
            return Err(EngineError::configuration("batch.max_concurrency must be at least 1"));
        }
        if settings.batch.resolver_timeout_ms == 0 {
            return Err(EngineError::configuration(
                "batch.resolver_timeout_ms must be at least 1",
            ));
        }
        Ok(Self {
            settings,
            tax_table,
        })
    }

    /// The default configuration: the standard four-bracket schedule, 7%
    /// insurance and whole-unit rounding.
    pub fn standard() -> EngineResult<Self> {
        Self::new(EngineSettings::default(), Self::standard_tax_table()?)
    }

    /// 0% to 5,000,000; 10% to 10,000,000; 15% to 20,000,000; 20% above.
    pub fn standard_tax_table() -> EngineResult<TaxBracketTable> {
        let million = |m: i64| Decimal::from(m * 1_000_000);
        TaxBracketTable::new(vec![
            TaxBracket::new(Decimal::ZERO, Some(million(5)), Decimal::ZERO),
            TaxBracket::new(million(5), Some(million(10)), Decimal::new(10, 2)),
            TaxBracket::new(million(10), Some(million(20)), Decimal::new(15, 2)),
            TaxBracket::new(million(20), None, Decimal::new(20, 2)),
        ])
    }

    /// Returns a copy using a different invoice settlement order.
    pub fn with_settlement_order(mut self, order: SettlementOrder) -> Self {
        self.settings.invoice.settlement_order = order;
        self
    }

    /// The raw settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// The currency code.
    pub fn currency(&self) -> &str {
        &self.settings.currency
    }

    /// The rounding applied to every derived amount.
    pub fn rounding(&self) -> Rounding {
        Rounding::new(self.settings.rounding_scale)
    }

    /// The progressive tax schedule.
    pub fn tax_table(&self) -> &TaxBracketTable {
        &self.tax_table
    }

    /// The employee insurance rate.
    pub fn insurance_rate(&self) -> Decimal {
        self.settings.insurance_rate
    }

    /// Maximum employees settled concurrently.
    pub fn max_concurrency(&self) -> usize {
        self.settings.batch.max_concurrency
    }

    /// Timeout for each resolver call.
    pub fn resolver_timeout(&self) -> Duration {
        Duration::from_millis(self.settings.batch.resolver_timeout_ms)
    }

    /// The invoice line settlement order.
    pub fn settlement_order(&self) -> SettlementOrder {
        self.settings.invoice.settlement_order
    }
}
