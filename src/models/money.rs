//! Monetary amounts and the rounding rule applied to every derived value.
//!
//! Amounts are plain [`Decimal`] values. What makes them "monetary" is the
//! [`Rounding`] policy: each derived amount is rounded exactly once, to the
//! configured number of fractional digits, half away from zero.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Default number of fractional digits (whole currency units).
pub const DEFAULT_SCALE: u32 = 0;

/// Largest scale a [`Decimal`] can carry.
pub const MAX_SCALE: u32 = 28;

/// Round-half-up rounding to a fixed number of fractional digits.
///
/// # Example
///
/// ```
/// use ledger_engine::models::Rounding;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let rounding = Rounding::new(0);
/// assert_eq!(rounding.round(Decimal::from_str("2.5").unwrap()), Decimal::from(3));
/// assert_eq!(rounding.round(Decimal::from_str("-2.5").unwrap()), Decimal::from(-3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rounding {
    /// Number of fractional digits kept.
    pub scale: u32,
}

impl Rounding {
    /// Creates a rounding policy with the given scale.
    pub fn new(scale: u32) -> Self {
        Self { scale }
    }

    /// Rounds `amount` half away from zero to this policy's scale.
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.scale, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl Default for Rounding {
    fn default() -> Self {
        Self::new(DEFAULT_SCALE)
    }
}

/// Converts a percentage such as `9` into the fraction `0.09`.
pub fn percent_to_fraction(percent: Decimal) -> Decimal {
    percent / Decimal::ONE_HUNDRED
}

pub(crate) fn checked_add(a: Decimal, b: Decimal, what: &str) -> EngineResult<Decimal> {
    a.checked_add(b).ok_or_else(|| overflow(what))
}

pub(crate) fn checked_sub(a: Decimal, b: Decimal, what: &str) -> EngineResult<Decimal> {
    a.checked_sub(b).ok_or_else(|| overflow(what))
}

pub(crate) fn checked_mul(a: Decimal, b: Decimal, what: &str) -> EngineResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| overflow(what))
}

fn overflow(what: &str) -> EngineError {
    EngineError::CalculationError {
        message: format!("decimal overflow while computing {}", what),
    }
}

/// Rejects negative amounts for the named field.
pub(crate) fn ensure_non_negative(value: Decimal, field: &str) -> EngineResult<()> {
    if value < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            field,
            format!("must not be negative, got {}", value),
        ));
    }
    Ok(())
}

/// Rejects values outside `[0, max]` for the named field.
pub(crate) fn ensure_within(value: Decimal, max: Decimal, field: &str) -> EngineResult<()> {
    if value < Decimal::ZERO || value > max {
        return Err(EngineError::invalid_input(
            field,
            format!("must be between 0 and {}, got {}", max, value),
        ));
    }
    Ok(())
}
