//! Overtime and bonus resolution.
//!
//! Overtime and bonus figures come from attendance and performance data the
//! engine does not own. The payroll runner receives them through a
//! [`SupplementResolver`] supplied by the caller.

use std::collections::HashMap;
use std::future::Future;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::PayPeriod;

/// Overtime and bonus pay for one employee-period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Supplements {
    /// Overtime pay.
    #[serde(default)]
    pub overtime_amount: Decimal,
    /// Bonus pay.
    #[serde(default)]
    pub bonus_amount: Decimal,
}

impl Supplements {
    /// Creates supplements from the two amounts.
    pub fn new(overtime_amount: Decimal, bonus_amount: Decimal) -> Self {
        Self {
            overtime_amount,
            bonus_amount,
        }
    }
}

/// Supplies overtime and bonus amounts for an employee and period.
///
/// Implementations may consult external data and may be slow; the payroll
/// runner bounds each call with a timeout. Employees without data should
/// resolve to [`Supplements::default`].
pub trait SupplementResolver: Send + Sync {
    /// Resolves the supplements for `employee_id` in `period`.
    fn resolve(
        &self,
        employee_id: &str,
        period: PayPeriod,
    ) -> impl Future<Output = EngineResult<Supplements>> + Send;
}

/// A resolver with no attendance or performance data: every employee
/// resolves to zero overtime and zero bonus.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSupplements;

impl SupplementResolver for NoSupplements {
    async fn resolve(&self, _employee_id: &str, _period: PayPeriod) -> EngineResult<Supplements> {
        Ok(Supplements::default())
    }
}

/// A resolver backed by a fixed map of employee id to supplements.
/// Employees missing from the map resolve to zero.
///
/// # Example
///
/// ```
/// use ledger_engine::calculation::{StaticSupplements, Supplements};
/// use rust_decimal::Decimal;
///
/// let resolver = StaticSupplements::default()
///     .with("emp_001", Supplements::new(Decimal::from(250_000), Decimal::ZERO));
/// assert_eq!(resolver.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticSupplements {
    by_employee: HashMap<String, Supplements>,
}

impl StaticSupplements {
    /// Creates a resolver from a prepared map.
    pub fn new(by_employee: HashMap<String, Supplements>) -> Self {
        Self { by_employee }
    }

    /// Adds or replaces one employee's supplements.
    pub fn with(mut self, employee_id: impl Into<String>, supplements: Supplements) -> Self {
        self.by_employee.insert(employee_id.into(), supplements);
        self
    }

    /// Number of employees with explicit supplements.
    pub fn len(&self) -> usize {
        self.by_employee.len()
    }

    /// Returns true if no employee has explicit supplements.
    pub fn is_empty(&self) -> bool {
        self.by_employee.is_empty()
    }
}

impl SupplementResolver for StaticSupplements {
    async fn resolve(&self, employee_id: &str, _period: PayPeriod) -> EngineResult<Supplements> {
        Ok(self
            .by_employee
            .get(employee_id)
            .copied()
            .unwrap_or_default())
    }
}
