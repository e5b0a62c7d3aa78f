//! Employee model.
//!
//! Only the fields payroll settlement needs: identity, owning company,
//! monthly base salary and whether the employee is active.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_active() -> bool {
    true
}

/// An employee on a company's payroll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// The company the employee belongs to.
    pub company_id: String,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Inactive employees are skipped by payroll runs.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Employee {
    /// Creates an active employee.
    ///
    /// # Examples
    ///
    /// ```
    /// use ledger_engine::models::Employee;
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee::new("emp_001", "acme", Decimal::from(8_000_000));
    /// assert!(employee.is_active);
    /// ```
    pub fn new(id: impl Into<String>, company_id: impl Into<String>, base_salary: Decimal) -> Self {
        Self {
            id: id.into(),
            company_id: company_id.into(),
            base_salary,
            is_active: true,
        }
    }
}
