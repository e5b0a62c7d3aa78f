//! Progressive tax calculation.
//!
//! This module walks a [`TaxBracketTable`] and taxes each slice of the gross
//! amount at the marginal rate of the bracket it falls in.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, Rounding, TaxBracketTable, checked_add, checked_mul};

/// The portion of a gross amount that fell inside one bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketSlice {
    /// Lower bound of the bracket.
    pub lower_bound: Decimal,
    /// Upper bound of the bracket, `None` for the top bracket.
    pub upper_bound: Option<Decimal>,
    /// The bracket's marginal rate.
    pub marginal_rate: Decimal,
    /// How much of the gross amount was inside the bracket.
    pub taxable: Decimal,
    /// `taxable * marginal_rate`, unrounded.
    pub tax: Decimal,
}

/// The result of a tax calculation, including the per-bracket breakdown.
#[derive(Debug, Clone)]
pub struct TaxCalculationResult {
    /// The rounded tax amount.
    pub tax_amount: Decimal,
    /// Slices with a non-zero taxable amount, lowest bracket first.
    pub slices: Vec<BracketSlice>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes progressive tax on `gross`.
///
/// Each bracket overlapping `[0, gross]` contributes
/// `(min(gross, upper) - lower) * rate`. The sum is rounded once.
/// A non-positive gross is taxed at zero.
///
/// # Errors
///
/// Returns [`EngineError::Configuration`] if `gross` is above the ceiling of a
/// table without an open-ended top bracket, and
/// [`EngineError::CalculationError`] on decimal overflow.
///
/// # Examples
///
/// ```
/// use ledger_engine::calculation::compute_tax;
/// use ledger_engine::models::{Rounding, TaxBracket, TaxBracketTable};
/// use rust_decimal::Decimal;
///
/// let table = TaxBracketTable::new(vec![
///     TaxBracket::new(Decimal::ZERO, Some(Decimal::from(5_000_000)), Decimal::ZERO),
///     TaxBracket::new(Decimal::from(5_000_000), Some(Decimal::from(10_000_000)), Decimal::new(10, 2)),
/// ])
/// .unwrap();
///
/// let tax = compute_tax(Decimal::from(7_000_000), &table, Rounding::default()).unwrap();
/// assert_eq!(tax, Decimal::from(200_000));
/// ```
pub fn compute_tax(gross: Decimal, table: &TaxBracketTable, rounding: Rounding) -> EngineResult<Decimal> {
    let slices = bracket_slices(gross, table)?;
    sum_slices(&slices).map(|total| rounding.round(total))
}

/// Computes progressive tax and records an audit step describing each slice.
pub fn calculate_tax(
    gross: Decimal,
    table: &TaxBracketTable,
    rounding: Rounding,
    step_number: u32,
) -> EngineResult<TaxCalculationResult> {
    let slices = bracket_slices(gross, table)?;
    let tax_amount = rounding.round(sum_slices(&slices)?);

    let reasoning = if slices.is_empty() {
        format!("Gross {} is not taxable", gross.normalize())
    } else {
        slices
            .iter()
            .map(|s| format!("{} x {}", s.taxable.normalize(), s.marginal_rate.normalize()))
            .collect::<Vec<_>>()
            .join(" + ")
            + &format!(" = {}", tax_amount)
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "progressive_tax".to_string(),
        rule_name: "Progressive Income Tax".to_string(),
        input: serde_json::json!({
            "gross": gross.normalize().to_string(),
            "brackets": table.brackets().len(),
        }),
        output: serde_json::json!({
            "tax_amount": tax_amount.to_string(),
            "slices": slices,
        }),
        reasoning,
    };

    Ok(TaxCalculationResult {
        tax_amount,
        slices,
        audit_step,
    })
}

fn bracket_slices(gross: Decimal, table: &TaxBracketTable) -> EngineResult<Vec<BracketSlice>> {
    if gross <= Decimal::ZERO {
        return Ok(Vec::new());
    }

    if let Some(ceiling) = table.ceiling() {
        if gross > ceiling {
            return Err(EngineError::configuration(format!(
                "gross {} exceeds the highest tax bracket bound {} and the table has no open-ended bracket",
                gross, ceiling
            )));
        }
    }

    let mut slices = Vec::new();
    for bracket in table.brackets() {
        if gross <= bracket.lower_bound {
            break;
        }
        let top = match bracket.upper_bound {
            Some(upper) if upper < gross => upper,
            _ => gross,
        };
        let taxable = top - bracket.lower_bound;
        let tax = checked_mul(taxable, bracket.marginal_rate, "bracket tax")?;
        slices.push(BracketSlice {
            lower_bound: bracket.lower_bound,
            upper_bound: bracket.upper_bound,
            marginal_rate: bracket.marginal_rate,
            taxable,
            tax,
        });
    }
    Ok(slices)
}

fn sum_slices(slices: &[BracketSlice]) -> EngineResult<Decimal> {
    slices
        .iter()
        .try_fold(Decimal::ZERO, |total, slice| checked_add(total, slice.tax, "total tax"))
}
