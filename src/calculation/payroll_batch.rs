//! Payroll batch orchestration.
//!
//! Settles every active employee of a company for one period on a bounded
//! pool of tokio tasks. Each employee succeeds or fails on its own; the
//! returned results are in input order regardless of completion order.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult, SettlementError};
use crate::models::{
    Employee, PayPeriod, PayrollBatchReport, PayrollSettlementRecord, PayrollSubjectInput,
};

use super::deduction::settle;
use super::resolver::SupplementResolver;

/// The outcome of settling one employee.
pub type SettlementOutcome = Result<PayrollSettlementRecord, SettlementError>;

/// Caller-side cancellation for a running batch.
///
/// Cancelling stops the runner from scheduling further employees. Employees
/// already being settled finish and are reported normally; the rest are
/// reported as cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    /// Creates a flag that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Runs payroll batches against one configuration and one resolver.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use ledger_engine::calculation::{CancellationFlag, NoSupplements, PayrollBatchRunner};
/// use ledger_engine::config::EngineConfig;
/// use ledger_engine::models::{Employee, PayPeriod};
/// use rust_decimal::Decimal;
///
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// let config = Arc::new(EngineConfig::standard().unwrap());
/// let runner = PayrollBatchRunner::new(config, NoSupplements);
/// let employees = vec![Employee::new("emp_001", "acme", Decimal::from(7_000_000))];
///
/// let results = runtime.block_on(runner.run(
///     "acme",
///     PayPeriod::new(2025, 7).unwrap(),
///     &employees,
///     &CancellationFlag::new(),
/// ));
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0].as_ref().unwrap().tax_amount, Decimal::from(200_000));
/// ```
#[derive(Debug)]
pub struct PayrollBatchRunner<R> {
    config: Arc<EngineConfig>,
    resolver: Arc<R>,
}

impl<R> Clone for PayrollBatchRunner<R> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<R: SupplementResolver + 'static> PayrollBatchRunner<R> {
    /// Creates a runner owning `resolver`.
    pub fn new(config: Arc<EngineConfig>, resolver: R) -> Self {
        Self::with_shared_resolver(config, Arc::new(resolver))
    }

    /// Creates a runner sharing an existing resolver.
    pub fn with_shared_resolver(config: Arc<EngineConfig>, resolver: Arc<R>) -> Self {
        Self { config, resolver }
    }

    /// The configuration this runner settles with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Settles every active employee of `company_id` for `period`.
    ///
    /// Inactive employees are skipped. Every other employee gets exactly one
    /// entry, in input order: the settlement record, or a
    /// [`SettlementError`] if resolving or settling that employee failed,
    /// timed out, or was never started because of cancellation. An empty
    /// input yields an empty result.
    pub async fn run(
        &self,
        company_id: &str,
        period: PayPeriod,
        employees: &[Employee],
        cancel: &CancellationFlag,
    ) -> Vec<SettlementOutcome> {
        self.run_batch(Uuid::new_v4(), company_id, period, employees, cancel)
            .await
    }

    /// Like [`run`](Self::run), wrapped in a [`PayrollBatchReport`] with summary totals.
    ///
    /// Per-employee failures stay inside the report. The only error is a
    /// calculation error when a summary total leaves the `Decimal` range.
    pub async fn run_report(
        &self,
        company_id: &str,
        period: PayPeriod,
        employees: &[Employee],
        cancel: &CancellationFlag,
    ) -> EngineResult<PayrollBatchReport> {
        let batch_id = Uuid::new_v4();
        let results = self
            .run_batch(batch_id, company_id, period, employees, cancel)
            .await;
        PayrollBatchReport::new(batch_id, company_id, period, results)
    }

    async fn run_batch(
        &self,
        batch_id: Uuid,
        company_id: &str,
        period: PayPeriod,
        employees: &[Employee],
        cancel: &CancellationFlag,
    ) -> Vec<SettlementOutcome> {
        let start_time = Instant::now();
        let active: Vec<&Employee> = employees.iter().filter(|e| e.is_active).collect();
        let max_concurrency = self.config.max_concurrency().max(1);
        let timeout = self.config.resolver_timeout();

        info!(
            batch_id = %batch_id,
            company_id = %company_id,
            period = %period,
            employee_count = active.len(),
            skipped_inactive = employees.len() - active.len(),
            max_concurrency,
            "Starting payroll batch"
        );

        let mut slots: Vec<Option<SettlementOutcome>> = (0..active.len()).map(|_| None).collect();
        let mut tasks = JoinSet::new();
        let mut scheduled = 0;

        while scheduled < active.len() {
            if cancel.is_cancelled() {
                info!(
                    batch_id = %batch_id,
                    scheduled,
                    remaining = active.len() - scheduled,
                    "Payroll batch cancelled, no further employees will be scheduled"
                );
                break;
            }
            if tasks.len() >= max_concurrency {
                if let Some(joined) = tasks.join_next().await {
                    store_outcome(batch_id, joined, &mut slots);
                }
                continue;
            }

            let index = scheduled;
            let employee = active[index].clone();
            let company_id = company_id.to_string();
            let resolver = Arc::clone(&self.resolver);
            let config = Arc::clone(&self.config);
            debug!(batch_id = %batch_id, employee_id = %employee.id, index, "Scheduling settlement");
            tasks.spawn(async move {
                let outcome = settle_employee(
                    resolver.as_ref(),
                    &config,
                    &company_id,
                    &employee,
                    period,
                    timeout,
                )
                .await
                .map_err(|err| SettlementError::from_engine(employee.id.clone(), err));
                (index, outcome)
            });
            scheduled += 1;
        }

        while let Some(joined) = tasks.join_next().await {
            store_outcome(batch_id, joined, &mut slots);
        }

        let results: Vec<SettlementOutcome> = slots
            .into_iter()
            .zip(active)
            .enumerate()
            .map(|(index, (slot, employee))| match slot {
                Some(outcome) => outcome,
                None if index >= scheduled => Err(SettlementError::cancelled(employee.id.clone())),
                None => Err(SettlementError::aborted(employee.id.clone())),
            })
            .collect();

        for error in results.iter().filter_map(|r| r.as_ref().err()) {
            warn!(
                batch_id = %batch_id,
                employee_id = %error.employee_id,
                kind = ?error.kind,
                error = %error.message,
                "Employee settlement failed"
            );
        }

        let settled = results.iter().filter(|r| r.is_ok()).count();
        info!(
            batch_id = %batch_id,
            company_id = %company_id,
            period = %period,
            settled,
            failed = results.len() - settled,
            duration_us = start_time.elapsed().as_micros() as u64,
            "Payroll batch completed"
        );

        results
    }
}

/// Settles `employees` with a fresh runner and no cancellation.
pub async fn run_payroll<R: SupplementResolver + 'static>(
    company_id: &str,
    period: PayPeriod,
    employees: &[Employee],
    config: Arc<EngineConfig>,
    resolver: R,
) -> Vec<SettlementOutcome> {
    PayrollBatchRunner::new(config, resolver)
        .run(company_id, period, employees, &CancellationFlag::new())
        .await
}

fn store_outcome(
    batch_id: Uuid,
    joined: Result<(usize, SettlementOutcome), JoinError>,
    slots: &mut [Option<SettlementOutcome>],
) {
    match joined {
        Ok((index, outcome)) => slots[index] = Some(outcome),
        Err(err) => warn!(batch_id = %batch_id, error = %err, "Settlement task did not complete"),
    }
}

async fn settle_employee<R: SupplementResolver>(
    resolver: &R,
    config: &EngineConfig,
    company_id: &str,
    employee: &Employee,
    period: PayPeriod,
    timeout: Duration,
) -> EngineResult<PayrollSettlementRecord> {
    if employee.company_id != company_id {
        return Err(EngineError::invalid_input(
            "company_id",
            format!(
                "employee belongs to company '{}', not '{}'",
                employee.company_id, company_id
            ),
        ));
    }

    let supplements = tokio::time::timeout(timeout, resolver.resolve(&employee.id, period))
        .await
        .map_err(|_| EngineError::ResolverTimeout {
            employee_id: employee.id.clone(),
            timeout_ms: timeout.as_millis() as u64,
        })??;

    let input = PayrollSubjectInput {
        employee_id: employee.id.clone(),
        period,
        base_salary: employee.base_salary,
        overtime_amount: supplements.overtime_amount,
        bonus_amount: supplements.bonus_amount,
        insurance_rate: config.insurance_rate(),
    };
    settle(&input, config.tax_table(), config.rounding())
}
