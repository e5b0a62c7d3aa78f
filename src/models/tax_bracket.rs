//! Progressive tax bracket tables.
//!
//! A [`TaxBracketTable`] is validated once when it is built and is immutable
//! afterwards, so the calculator can walk it without re-checking bounds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// One marginal bracket: amounts in `[lower_bound, upper_bound)` are taxed
/// at `marginal_rate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Inclusive lower bound of the bracket.
    pub lower_bound: Decimal,
    /// Exclusive upper bound, or `None` for the open-ended top bracket.
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
    /// Rate applied to the slice of income inside this bracket (0.10 = 10%).
    pub marginal_rate: Decimal,
}

impl TaxBracket {
    /// Creates a bracket.
    pub fn new(lower_bound: Decimal, upper_bound: Option<Decimal>, marginal_rate: Decimal) -> Self {
        Self {
            lower_bound,
            upper_bound,
            marginal_rate,
        }
    }
}

/// An ordered, contiguous sequence of tax brackets starting at zero.
///
/// # Example
///
/// ```
/// use ledger_engine::models::{TaxBracket, TaxBracketTable};
/// use rust_decimal::Decimal;
///
/// let table = TaxBracketTable::new(vec![
///     TaxBracket::new(Decimal::ZERO, Some(Decimal::from(5_000_000)), Decimal::ZERO),
///     TaxBracket::new(Decimal::from(5_000_000), None, Decimal::new(10, 2)),
/// ])
/// .unwrap();
/// assert!(table.is_open_ended());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct TaxBracketTable {
    brackets: Vec<TaxBracket>,
}

impl TaxBracketTable {
    /// Validates and builds a table.
    ///
    /// Fails with [`EngineError::Configuration`] when the table is empty, does
    /// not start at zero, has a gap or overlap, has a bracket whose upper
    /// bound is not above its lower bound, has an open-ended bracket
    /// anywhere but last, or has a rate outside `[0, 1]`.
    pub fn new(brackets: Vec<TaxBracket>) -> EngineResult<Self> {
        let Some(first) = brackets.first() else {
            return Err(EngineError::configuration("tax bracket table is empty"));
        };
        if first.lower_bound != Decimal::ZERO {
            return Err(EngineError::configuration(format!(
                "first tax bracket must start at 0, starts at {}",
                first.lower_bound
            )));
        }

        let last_index = brackets.len() - 1;
        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.marginal_rate < Decimal::ZERO || bracket.marginal_rate > Decimal::ONE {
                return Err(EngineError::configuration(format!(
                    "bracket {} has rate {} outside [0, 1]",
                    index, bracket.marginal_rate
                )));
            }

            match bracket.upper_bound {
                Some(upper) if upper <= bracket.lower_bound => {
                    return Err(EngineError::configuration(format!(
                        "bracket {} upper bound {} is not above lower bound {}",
                        index, upper, bracket.lower_bound
                    )));
                }
                None if index != last_index => {
                    return Err(EngineError::configuration(format!(
                        "bracket {} is open-ended but is not the last bracket",
                        index
                    )));
                }
                _ => {}
            }

            if let Some(next) = brackets.get(index + 1) {
                if bracket.upper_bound != Some(next.lower_bound) {
                    return Err(EngineError::configuration(format!(
                        "bracket {} does not meet bracket {}: {:?} vs {}",
                        index,
                        index + 1,
                        bracket.upper_bound,
                        next.lower_bound
                    )));
                }
            }
        }

        Ok(Self { brackets })
    }

    /// Returns the brackets in ascending order.
    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Returns true if the last bracket has no upper bound.
    pub fn is_open_ended(&self) -> bool {
        self.brackets
            .last()
            .is_some_and(|bracket| bracket.upper_bound.is_none())
    }

    /// The highest finite upper bound, or `None` for an open-ended table.
    pub fn ceiling(&self) -> Option<Decimal> {
        self.brackets.last().and_then(|bracket| bracket.upper_bound)
    }
}

impl TryFrom<Vec<TaxBracket>> for TaxBracketTable {
    type Error = EngineError;

    fn try_from(brackets: Vec<TaxBracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<TaxBracketTable> for Vec<TaxBracket> {
    fn from(table: TaxBracketTable) -> Self {
        table.brackets
    }
}
