//! Core data models for the ledger engine.
//!
//! This module contains all the domain models used throughout the engine.

mod employee;
mod invoice;
mod money;
mod pay_period;
mod payroll;
mod tax_bracket;

pub use employee::Employee;
pub use invoice::{Invoice, InvoiceLineInput, InvoiceLineResult, InvoiceTotals, SettlementOrder};
pub use money::{DEFAULT_SCALE, MAX_SCALE, Rounding, percent_to_fraction};
pub(crate) use money::{checked_add, checked_mul, checked_sub, ensure_non_negative, ensure_within};
pub use pay_period::PayPeriod;
pub use payroll::{
    AuditStep, AuditTrace, AuditWarning, NEGATIVE_NET_SALARY_WARNING, PayrollBatchReport,
    PayrollBatchSummary, PayrollEntry, PayrollSettlementRecord, PayrollStatus, PayrollSubjectInput,
};
pub use tax_bracket::{TaxBracket, TaxBracketTable};
