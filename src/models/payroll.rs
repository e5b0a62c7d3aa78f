//! Payroll settlement models.
//!
//! This module contains the per-employee [`PayrollSubjectInput`] and
//! [`PayrollSettlementRecord`], the audit structures attached to each record,
//! and the [`PayrollBatchReport`] that wraps a whole run.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineResult, SettlementError};

use super::{PayPeriod, checked_add};

/// Warning code attached to records whose deductions exceed gross salary.
pub const NEGATIVE_NET_SALARY_WARNING: &str = "NEGATIVE_NET_SALARY";

/// One employee's inputs for one period.
///
/// `overtime_amount` and `bonus_amount` come from the overtime/bonus
/// resolver; `insurance_rate` from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollSubjectInput {
    /// The employee being settled.
    pub employee_id: String,
    /// The period being settled.
    pub period: PayPeriod,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Overtime pay for the period.
    pub overtime_amount: Decimal,
    /// Bonus pay for the period.
    pub bonus_amount: Decimal,
    /// Employee insurance share as a fraction of gross (0.07 = 7%).
    pub insurance_rate: Decimal,
}

/// Lifecycle status of a settlement record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    /// Settled by the engine, awaiting approval and payment.
    Pending,
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the step.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings flag records for human review without failing them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for one settlement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

/// The settled pay of one employee for one period.
///
/// `net_salary` always equals `gross_salary - tax_amount - insurance_amount`
/// exactly; it may be negative, in which case the trace carries a
/// [`NEGATIVE_NET_SALARY_WARNING`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollSettlementRecord {
    /// Unique identifier for this settlement.
    pub settlement_id: Uuid,
    /// When the settlement was produced.
    pub settled_at: DateTime<Utc>,
    /// The employee this record is for.
    pub employee_id: String,
    /// The settled period.
    pub period: PayPeriod,
    /// Base salary used.
    pub base_salary: Decimal,
    /// Overtime used.
    pub overtime_amount: Decimal,
    /// Bonus used.
    pub bonus_amount: Decimal,
    /// Base + overtime + bonus.
    pub gross_salary: Decimal,
    /// Progressive income tax on the gross salary.
    pub tax_amount: Decimal,
    /// Employee insurance share.
    pub insurance_amount: Decimal,
    /// Gross minus tax and insurance.
    pub net_salary: Decimal,
    /// Record status.
    pub status: PayrollStatus,
    /// How each amount was derived.
    pub audit_trace: AuditTrace,
}

impl PayrollSettlementRecord {
    /// Total deductions (tax + insurance).
    pub fn total_deductions(&self) -> EngineResult<Decimal> {
        checked_add(self.tax_amount, self.insurance_amount, "total deductions")
    }

    /// Returns true if the record carries the negative net salary warning.
    pub fn has_negative_net_warning(&self) -> bool {
        self.audit_trace
            .warnings
            .iter()
            .any(|w| w.code == NEGATIVE_NET_SALARY_WARNING)
    }

    /// Returns true if any warning was raised for this record.
    pub fn is_flagged(&self) -> bool {
        !self.audit_trace.warnings.is_empty()
    }
}

/// One line of a batch report: a settled record or the reason it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PayrollEntry {
    /// The employee was settled.
    Settled(PayrollSettlementRecord),
    /// The employee's settlement failed.
    Failed(SettlementError),
}

impl From<Result<PayrollSettlementRecord, SettlementError>> for PayrollEntry {
    fn from(result: Result<PayrollSettlementRecord, SettlementError>) -> Self {
        match result {
            Ok(record) => PayrollEntry::Settled(record),
            Err(error) => PayrollEntry::Failed(error),
        }
    }
}

impl PayrollEntry {
    /// The employee this entry is about.
    pub fn employee_id(&self) -> &str {
        match self {
            PayrollEntry::Settled(record) => &record.employee_id,
            PayrollEntry::Failed(error) => &error.employee_id,
        }
    }
}

/// Aggregates over the successful records of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PayrollBatchSummary {
    /// Number of entries in the batch.
    pub employee_count: usize,
    /// Entries that settled.
    pub settled_count: usize,
    /// Entries that failed.
    pub failed_count: usize,
    /// Settled entries carrying a warning.
    pub flagged_count: usize,
    /// Sum of gross salaries.
    pub total_gross: Decimal,
    /// Sum of tax.
    pub total_tax: Decimal,
    /// Sum of insurance.
    pub total_insurance: Decimal,
    /// Sum of net salaries.
    pub total_net: Decimal,
}

impl PayrollBatchSummary {
    /// Recomputes the summary from a batch's entries.
    ///
    /// Fails with a calculation error if a total leaves the `Decimal` range.
    pub fn from_entries(entries: &[PayrollEntry]) -> EngineResult<Self> {
        let mut summary = PayrollBatchSummary {
            employee_count: entries.len(),
            ..Default::default()
        };
        for entry in entries {
            match entry {
                PayrollEntry::Settled(record) => {
                    summary.settled_count += 1;
                    if record.is_flagged() {
                        summary.flagged_count += 1;
                    }
                    summary.total_gross =
                        checked_add(summary.total_gross, record.gross_salary, "batch gross total")?;
                    summary.total_tax =
                        checked_add(summary.total_tax, record.tax_amount, "batch tax total")?;
                    summary.total_insurance = checked_add(
                        summary.total_insurance,
                        record.insurance_amount,
                        "batch insurance total",
                    )?;
                    summary.total_net =
                        checked_add(summary.total_net, record.net_salary, "batch net total")?;
                }
                PayrollEntry::Failed(_) => summary.failed_count += 1,
            }
        }
        Ok(summary)
    }
}

/// The full per-employee outcome of one payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollBatchReport {
    /// Unique identifier for this run.
    pub batch_id: Uuid,
    /// The company that was settled.
    pub company_id: String,
    /// The settled period.
    pub period: PayPeriod,
    /// One entry per active employee, in input order.
    pub entries: Vec<PayrollEntry>,
    /// Totals over the entries.
    pub summary: PayrollBatchSummary,
}

impl PayrollBatchReport {
    /// Builds a report, deriving its summary from the results.
    pub fn new(
        batch_id: Uuid,
        company_id: impl Into<String>,
        period: PayPeriod,
        results: Vec<Result<PayrollSettlementRecord, SettlementError>>,
    ) -> EngineResult<Self> {
        let entries: Vec<PayrollEntry> = results.into_iter().map(Into::into).collect();
        let summary = PayrollBatchSummary::from_entries(&entries)?;
        Ok(Self {
            batch_id,
            company_id: company_id.into(),
            period,
            entries,
            summary,
        })
    }
}
