//! Calculation logic for the ledger engine.
//!
//! This module contains the progressive tax calculator, the payroll
//! deduction aggregator, the overtime/bonus resolver interface, the payroll
//! batch runner, and invoice line settlement and aggregation.

mod deduction;
mod invoice;
mod payroll_batch;
mod resolver;
mod tax_bracket;

pub use deduction::settle;
pub use invoice::{aggregate, settle_line};
pub use payroll_batch::{CancellationFlag, PayrollBatchRunner, SettlementOutcome, run_payroll};
pub use resolver::{NoSupplements, StaticSupplements, SupplementResolver, Supplements};
pub use tax_bracket::{BracketSlice, TaxCalculationResult, calculate_tax, compute_tax};
