//! Payroll deduction aggregation.
//!
//! Turns one employee's [`PayrollSubjectInput`] into a
//! [`PayrollSettlementRecord`]: gross salary, progressive tax, flat
//! insurance and net salary, each with an audit step.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::warn;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, NEGATIVE_NET_SALARY_WARNING, PayrollSettlementRecord,
    PayrollStatus, PayrollSubjectInput, Rounding, TaxBracketTable, checked_add, checked_mul,
    checked_sub, ensure_non_negative, ensure_within,
};

use super::tax_bracket::calculate_tax;

/// Settles one employee for one period.
///
/// Gross is `base_salary + overtime_amount + bonus_amount`, rounded once.
/// Tax comes from the bracket table, insurance is `gross * insurance_rate`
/// rounded once, and net is the exact difference of the three rounded
/// amounts. A negative net salary is kept as computed and flagged with a
/// [`NEGATIVE_NET_SALARY_WARNING`].
///
/// # Errors
///
/// Returns [`crate::error::EngineError::InvalidInput`] for negative amounts
/// or an insurance rate outside `[0, 1]`, and propagates tax calculation
/// errors.
///
/// # Examples
///
/// ```
/// use ledger_engine::calculation::settle;
/// use ledger_engine::models::{PayPeriod, PayrollSubjectInput, Rounding, TaxBracket, TaxBracketTable};
/// use rust_decimal::Decimal;
///
/// let table = TaxBracketTable::new(vec![
///     TaxBracket::new(Decimal::ZERO, Some(Decimal::from(5_000_000)), Decimal::ZERO),
///     TaxBracket::new(Decimal::from(5_000_000), None, Decimal::new(10, 2)),
/// ])
/// .unwrap();
/// let input = PayrollSubjectInput {
///     employee_id: "emp_001".to_string(),
///     period: PayPeriod::new(2025, 7).unwrap(),
///     base_salary: Decimal::from(7_000_000),
///     overtime_amount: Decimal::ZERO,
///     bonus_amount: Decimal::ZERO,
///     insurance_rate: Decimal::new(7, 2),
/// };
///
/// let record = settle(&input, &table, Rounding::default()).unwrap();
/// assert_eq!(record.tax_amount, Decimal::from(200_000));
/// assert_eq!(record.insurance_amount, Decimal::from(490_000));
/// assert_eq!(record.net_salary, Decimal::from(6_310_000));
/// ```
pub fn settle(
    input: &PayrollSubjectInput,
    table: &TaxBracketTable,
    rounding: Rounding,
) -> EngineResult<PayrollSettlementRecord> {
    ensure_non_negative(input.base_salary, "base_salary")?;
    ensure_non_negative(input.overtime_amount, "overtime_amount")?;
    ensure_non_negative(input.bonus_amount, "bonus_amount")?;
    ensure_within(input.insurance_rate, Decimal::ONE, "insurance_rate")?;

    let mut steps = Vec::with_capacity(4);
    let mut warnings = Vec::new();

    let unrounded_gross = checked_add(
        checked_add(input.base_salary, input.overtime_amount, "gross salary")?,
        input.bonus_amount,
        "gross salary",
    )?;
    let gross_salary = rounding.round(unrounded_gross);
    steps.push(AuditStep {
        step_number: 1,
        rule_id: "gross_salary".to_string(),
        rule_name: "Gross Salary".to_string(),
        input: serde_json::json!({
            "base_salary": input.base_salary.to_string(),
            "overtime_amount": input.overtime_amount.to_string(),
            "bonus_amount": input.bonus_amount.to_string(),
        }),
        output: serde_json::json!({ "gross_salary": gross_salary.to_string() }),
        reasoning: format!(
            "{} + {} + {} = {}",
            input.base_salary, input.overtime_amount, input.bonus_amount, gross_salary
        ),
    });

    let tax = calculate_tax(gross_salary, table, rounding, 2)?;
    let tax_amount = tax.tax_amount;
    steps.push(tax.audit_step);

    let insurance_amount = rounding.round(checked_mul(
        gross_salary,
        input.insurance_rate,
        "insurance",
    )?);
    steps.push(AuditStep {
        step_number: 3,
        rule_id: "insurance".to_string(),
        rule_name: "Employee Insurance".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.to_string(),
            "insurance_rate": input.insurance_rate.normalize().to_string(),
        }),
        output: serde_json::json!({ "insurance_amount": insurance_amount.to_string() }),
        reasoning: format!(
            "{} x {} = {}",
            gross_salary,
            input.insurance_rate.normalize(),
            insurance_amount
        ),
    });

    let net_salary = checked_sub(
        checked_sub(gross_salary, tax_amount, "net salary")?,
        insurance_amount,
        "net salary",
    )?;
    steps.push(AuditStep {
        step_number: 4,
        rule_id: "net_salary".to_string(),
        rule_name: "Net Salary".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.to_string(),
            "tax_amount": tax_amount.to_string(),
            "insurance_amount": insurance_amount.to_string(),
        }),
        output: serde_json::json!({ "net_salary": net_salary.to_string() }),
        reasoning: format!(
            "{} - {} - {} = {}",
            gross_salary, tax_amount, insurance_amount, net_salary
        ),
    });

    if net_salary < Decimal::ZERO {
        warn!(
            employee_id = %input.employee_id,
            period = %input.period,
            net_salary = %net_salary,
            "Deductions exceed gross salary"
        );
        warnings.push(AuditWarning {
            code: NEGATIVE_NET_SALARY_WARNING.to_string(),
            message: format!(
                "Net salary {} is negative: tax {} and insurance {} exceed gross {}",
                net_salary, tax_amount, insurance_amount, gross_salary
            ),
            severity: "high".to_string(),
        });
    }

    Ok(PayrollSettlementRecord {
        settlement_id: Uuid::new_v4(),
        settled_at: Utc::now(),
        employee_id: input.employee_id.clone(),
        period: input.period,
        base_salary: input.base_salary,
        overtime_amount: input.overtime_amount,
        bonus_amount: input.bonus_amount,
        gross_salary,
        tax_amount,
        insurance_amount,
        net_salary,
        status: PayrollStatus::Pending,
        audit_trace: AuditTrace { steps, warnings },
    })
}
