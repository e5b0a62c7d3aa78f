//! Invoice line settlement and invoice aggregation.
//!
//! With the default [`SettlementOrder::TaxThenDiscount`] a line is settled as:
//!
//! 1. `base = quantity * unit_price`
//! 2. `taxed = base * (1 + tax_rate_percent / 100)`
//! 3. `line_total = taxed * (1 - discount_rate_percent / 100)`
//!
//! Each value is derived from the unrounded previous value and rounded once.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{
    InvoiceLineInput, InvoiceLineResult, InvoiceTotals, Rounding, SettlementOrder, checked_add,
    checked_mul, ensure_non_negative, ensure_within, percent_to_fraction,
};

/// Settles one invoice line.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::InvalidInput`] for a negative
/// quantity or unit price, or a tax or discount rate outside `[0, 100]`,
/// and [`crate::error::EngineError::CalculationError`] on decimal overflow.
///
/// # Examples
///
/// ```
/// use ledger_engine::calculation::settle_line;
/// use ledger_engine::models::{InvoiceLineInput, Rounding, SettlementOrder};
/// use rust_decimal::Decimal;
///
/// let input = InvoiceLineInput::new(
///     Decimal::from(2),
///     Decimal::from(1_000_000),
///     Decimal::from(9),
///     Decimal::from(10),
/// );
/// let line = settle_line(&input, SettlementOrder::TaxThenDiscount, Rounding::default()).unwrap();
/// assert_eq!(line.base, Decimal::from(2_000_000));
/// assert_eq!(line.taxed, Decimal::from(2_180_000));
/// assert_eq!(line.line_total, Decimal::from(1_962_000));
/// ```
pub fn settle_line(
    input: &InvoiceLineInput,
    order: SettlementOrder,
    rounding: Rounding,
) -> EngineResult<InvoiceLineResult> {
    ensure_non_negative(input.quantity, "quantity")?;
    ensure_non_negative(input.unit_price, "unit_price")?;
    ensure_within(input.tax_rate_percent, Decimal::ONE_HUNDRED, "tax_rate_percent")?;
    ensure_within(
        input.discount_rate_percent,
        Decimal::ONE_HUNDRED,
        "discount_rate_percent",
    )?;

    let tax_factor = Decimal::ONE + percent_to_fraction(input.tax_rate_percent);
    let discount_factor = Decimal::ONE - percent_to_fraction(input.discount_rate_percent);
    let exact_base = checked_mul(input.quantity, input.unit_price, "line base")?;
    let base = rounding.round(exact_base);

    let (taxed, tax_amount, discount_amount, line_total) = match order {
        SettlementOrder::TaxThenDiscount => {
            let exact_taxed = checked_mul(exact_base, tax_factor, "line taxed amount")?;
            let exact_total = checked_mul(exact_taxed, discount_factor, "line total")?;
            let taxed = rounding.round(exact_taxed);
            let line_total = rounding.round(exact_total);
            (taxed, taxed - base, taxed - line_total, line_total)
        }
        SettlementOrder::DiscountThenTax => {
            let exact_discounted = checked_mul(exact_base, discount_factor, "line discounted amount")?;
            let exact_total = checked_mul(exact_discounted, tax_factor, "line total")?;
            let discounted = rounding.round(exact_discounted);
            let line_total = rounding.round(exact_total);
            let tax_amount = line_total - discounted;
            let taxed = checked_add(base, tax_amount, "line taxed amount")?;
            (taxed, tax_amount, base - discounted, line_total)
        }
    };

    Ok(InvoiceLineResult {
        input: input.clone(),
        base,
        taxed,
        tax_amount,
        discount_amount,
        line_total,
    })
}

/// Sums settled lines into invoice totals.
///
/// The totals are plain sums of already-rounded line values, so
/// `grand_total == subtotal + tax_total - discount_total` holds exactly.
/// Fails with [`EngineError::CalculationError`](crate::error::EngineError::CalculationError)
/// if a column sum leaves the `Decimal` range.
pub fn aggregate(lines: &[InvoiceLineResult]) -> EngineResult<InvoiceTotals> {
    lines
        .iter()
        .try_fold(InvoiceTotals::default(), |totals, line| {
            Ok(InvoiceTotals {
                subtotal: checked_add(totals.subtotal, line.base, "invoice subtotal")?,
                tax_total: checked_add(totals.tax_total, line.tax_amount, "invoice tax total")?,
                discount_total: checked_add(
                    totals.discount_total,
                    line.discount_amount,
                    "invoice discount total",
                )?,
                grand_total: checked_add(totals.grand_total, line.line_total, "invoice grand total")?,
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(quantity: &str, price: &str, tax: &str, discount: &str) -> InvoiceLineInput {
        InvoiceLineInput::new(dec(quantity), dec(price), dec(tax), dec(discount))
    }

    fn settle_default(input: &InvoiceLineInput) -> InvoiceLineResult {
        settle_line(input, SettlementOrder::TaxThenDiscount, Rounding::default()).unwrap()
    }

    /// Tax is applied before the discount
    #[test]
    fn test_tax_then_discount_pins_taxed_amount() {
        let result = settle_default(&line("2", "1000000", "9", "10"));

        assert_eq!(result.base, dec("2000000"));
        assert_eq!(result.taxed, dec("2180000"));
        assert_eq!(result.line_total, dec("1962000"));
        assert_eq!(result.tax_amount, dec("180000"));
        assert_eq!(result.discount_amount, dec("218000"));
    }

    #[test]
    fn test_discount_then_tax_reports_different_split() {
        let input = line("2", "1000000", "9", "10");
        let result = settle_line(&input, SettlementOrder::DiscountThenTax, Rounding::default()).unwrap();

        assert_eq!(result.base, dec("2000000"));
        assert_eq!(result.discount_amount, dec("200000"));
        assert_eq!(result.tax_amount, dec("162000"));
        assert_eq!(result.taxed, dec("2162000"));
        assert_eq!(result.line_total, dec("1962000"));
    }

    #[test]
    fn test_line_without_tax_or_discount() {
        let result = settle_default(&line("3", "250", "0", "0"));
        assert_eq!(result.base, dec("750"));
        assert_eq!(result.taxed, dec("750"));
        assert_eq!(result.line_total, dec("750"));
        assert_eq!(result.tax_amount, Decimal::ZERO);
        assert_eq!(result.discount_amount, Decimal::ZERO);
    }

    #[test]
    fn test_full_discount_zeroes_line() {
        let result = settle_default(&line("1", "1000", "9", "100"));
        assert_eq!(result.taxed, dec("1090"));
        assert_eq!(result.line_total, Decimal::ZERO);
        assert_eq!(result.discount_amount, dec("1090"));
    }

    #[test]
    fn test_each_value_rounded_once_from_exact_amounts() {
        // base 3 x 3.35 = 10.05; taxed 10.9545; total 9.85905
        let result = settle_line(
            &line("3", "3.35", "9", "10"),
            SettlementOrder::TaxThenDiscount,
            Rounding::new(2),
        )
        .unwrap();
        assert_eq!(result.base, dec("10.05"));
        assert_eq!(result.taxed, dec("10.95"));
        assert_eq!(result.line_total, dec("9.86"));
        assert_eq!(result.tax_amount, dec("0.90"));
        assert_eq!(result.discount_amount, dec("1.09"));
    }

    #[test]
    fn test_fractional_quantity() {
        let result = settle_default(&line("1.5", "1001", "0", "0"));
        // 1501.5 rounds half up
        assert_eq!(result.base, dec("1502"));
    }

    #[test]
    fn test_negative_quantity_is_rejected() {
        let result = settle_line(
            &line("-1", "100", "9", "0"),
            SettlementOrder::TaxThenDiscount,
            Rounding::default(),
        );
        match result {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "quantity"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_unit_price_is_rejected() {
        let result = settle_line(
            &line("1", "-100", "9", "0"),
            SettlementOrder::TaxThenDiscount,
            Rounding::default(),
        );
        assert!(matches!(result, Err(EngineError::InvalidInput { .. })));
    }

    #[test]
    fn test_rates_outside_percent_range_are_rejected() {
        for input in [line("1", "100", "101", "0"), line("1", "100", "9", "-5"), line("1", "100", "9", "100.5")] {
            let result = settle_line(&input, SettlementOrder::TaxThenDiscount, Rounding::default());
            assert!(matches!(result, Err(EngineError::InvalidInput { .. })));
        }
    }

    #[test]
    fn test_aggregate_empty_is_zero() {
        assert_eq!(aggregate(&[]).unwrap(), InvoiceTotals::default());
    }

    #[test]
    fn test_aggregate_sums_each_column() {
        let lines = vec![
            settle_default(&line("2", "1000000", "9", "10")),
            settle_default(&line("1", "500000", "9", "0")),
            settle_default(&line("4", "25000", "0", "5")),
        ];
        let totals = aggregate(&lines).unwrap();

        assert_eq!(totals.subtotal, dec("2600000"));
        assert_eq!(totals.tax_total, dec("225000"));
        assert_eq!(totals.discount_total, dec("223000"));
        assert_eq!(totals.grand_total, dec("2602000"));
        assert_eq!(
            totals.grand_total,
            totals.subtotal + totals.tax_total - totals.discount_total
        );
    }

    #[test]
    fn test_aggregate_overflow_is_an_error() {
        // Each line fits on its own; together they exceed Decimal::MAX.
        let half = line("1", "50000000000000000000000000000", "0", "0");
        let lines = vec![settle_default(&half), settle_default(&half)];

        let result = aggregate(&lines);
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }

    #[test]
    fn test_discount_then_tax_taxed_overflow_is_an_error() {
        // base 0.9 MAX, discounted 0.81 MAX, total 0.972 MAX, taxed above MAX
        let input = line("1", "71305346262837903834189555301", "20", "10");
        let result = settle_line(&input, SettlementOrder::DiscountThenTax, Rounding::default());
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }
}
