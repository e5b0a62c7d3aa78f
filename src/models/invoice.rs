//! Invoice line and invoice totals models.
//!
//! Line results are produced by [`crate::calculation::settle_line`]. The
//! [`Invoice`] document owns its settled lines and derives its totals from
//! them on every read.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::{aggregate, settle_line};
use crate::error::{EngineError, EngineResult};

use super::Rounding;

/// The order in which tax and discount are applied to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementOrder {
    /// Tax on the base amount, then discount on the tax-inclusive amount.
    #[default]
    TaxThenDiscount,
    /// Discount on the base amount, then tax on the discounted amount.
    DiscountThenTax,
}

/// The raw inputs of one invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLineInput {
    /// Optional free-text description, carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Quantity sold (>= 0).
    pub quantity: Decimal,
    /// Price per unit (>= 0).
    pub unit_price: Decimal,
    /// Tax rate in percent (0-100).
    pub tax_rate_percent: Decimal,
    /// Discount rate in percent (0-100).
    #[serde(default)]
    pub discount_rate_percent: Decimal,
}

impl InvoiceLineInput {
    /// Creates a line without a description.
    pub fn new(
        quantity: Decimal,
        unit_price: Decimal,
        tax_rate_percent: Decimal,
        discount_rate_percent: Decimal,
    ) -> Self {
        Self {
            description: None,
            quantity,
            unit_price,
            tax_rate_percent,
            discount_rate_percent,
        }
    }
}

/// A settled invoice line.
///
/// `tax_amount == taxed - base` and `discount_amount == taxed - line_total`
/// hold exactly for lines settled tax-then-discount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLineResult {
    /// The inputs this line was settled from.
    pub input: InvoiceLineInput,
    /// `quantity * unit_price`.
    pub base: Decimal,
    /// Base plus tax.
    pub taxed: Decimal,
    /// Tax added to the line.
    pub tax_amount: Decimal,
    /// Discount taken off the line.
    pub discount_amount: Decimal,
    /// The amount charged for the line.
    pub line_total: Decimal,
}

/// Invoice-level totals, each the sum of the matching per-line value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of line bases.
    pub subtotal: Decimal,
    /// Sum of line tax amounts.
    pub tax_total: Decimal,
    /// Sum of line discount amounts.
    pub discount_total: Decimal,
    /// Sum of line totals.
    pub grand_total: Decimal,
}

/// An invoice whose totals are always derived from its current lines.
///
/// # Example
///
/// ```
/// use ledger_engine::models::{Invoice, InvoiceLineInput, Rounding, SettlementOrder};
/// use rust_decimal::Decimal;
///
/// let mut invoice = Invoice::new("inv_001", SettlementOrder::TaxThenDiscount, Rounding::default());
/// invoice
///     .add_line(InvoiceLineInput::new(
///         Decimal::from(2),
///         Decimal::from(1_000_000),
///         Decimal::from(9),
///         Decimal::from(10),
///     ))
///     .unwrap();
/// assert_eq!(invoice.totals().unwrap().grand_total, Decimal::from(1_962_000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invoice {
    id: String,
    order: SettlementOrder,
    rounding: Rounding,
    lines: Vec<InvoiceLineResult>,
}

impl Invoice {
    /// Creates an empty invoice.
    pub fn new(id: impl Into<String>, order: SettlementOrder, rounding: Rounding) -> Self {
        Self {
            id: id.into(),
            order,
            rounding,
            lines: Vec::new(),
        }
    }

    /// The invoice identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The settled lines in insertion order.
    pub fn lines(&self) -> &[InvoiceLineResult] {
        &self.lines
    }

    /// Settles and appends a line. A line that fails validation is not added.
    pub fn add_line(&mut self, input: InvoiceLineInput) -> EngineResult<&InvoiceLineResult> {
        let line = settle_line(&input, self.order, self.rounding)?;
        self.lines.push(line);
        Ok(&self.lines[self.lines.len() - 1])
    }

    /// Re-settles the line at `index` from new inputs.
    pub fn update_line(&mut self, index: usize, input: InvoiceLineInput) -> EngineResult<()> {
        let line = settle_line(&input, self.order, self.rounding)?;
        let slot = self.lines.get_mut(index).ok_or_else(|| line_not_found(index))?;
        *slot = line;
        Ok(())
    }

    /// Removes and returns the line at `index`.
    pub fn remove_line(&mut self, index: usize) -> EngineResult<InvoiceLineResult> {
        if index >= self.lines.len() {
            return Err(line_not_found(index));
        }
        Ok(self.lines.remove(index))
    }

    /// Totals recomputed from the current lines.
    pub fn totals(&self) -> EngineResult<InvoiceTotals> {
        aggregate(&self.lines)
    }
}

fn line_not_found(index: usize) -> EngineError {
    EngineError::invalid_input("line", format!("no invoice line at index {}", index))
}
