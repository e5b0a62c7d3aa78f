//! Request types for the ledger engine API.
//!
//! This module defines the JSON request structures for the `/payroll/run`
//! and `/invoices/settle` endpoints.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::{StaticSupplements, Supplements};
use crate::models::{Employee, InvoiceLineInput, PayPeriod};

fn default_active() -> bool {
    true
}

/// Request body for the `/payroll/run` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRunRequest {
    /// The company being settled.
    pub company_id: String,
    /// The month being settled.
    pub period: PayPeriod,
    /// The company's employees. Inactive ones are skipped.
    pub employees: Vec<EmployeeRequest>,
    /// Overtime and bonus per employee id; missing employees get zero.
    #[serde(default)]
    pub supplements: HashMap<String, SupplementsRequest>,
}

/// Employee information in a payroll request.
///
/// The owning company is taken from the enclosing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeRequest {
    /// Unique identifier for the employee.
    pub id: String,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Whether the employee is active.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Overtime and bonus for one employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplementsRequest {
    /// Overtime pay.
    #[serde(default)]
    pub overtime_amount: Decimal,
    /// Bonus pay.
    #[serde(default)]
    pub bonus_amount: Decimal,
}

/// Request body for the `/invoices/settle` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceSettleRequest {
    /// Optional invoice identifier; one is generated when absent.
    #[serde(default)]
    pub invoice_id: Option<String>,
    /// The invoice lines.
    pub lines: Vec<InvoiceLineInput>,
}

impl PayrollRunRequest {
    /// Converts the employee list into domain employees of `company_id`.
    pub fn employees(&self) -> Vec<Employee> {
        self.employees
            .iter()
            .map(|e| Employee {
                id: e.id.clone(),
                company_id: self.company_id.clone(),
                base_salary: e.base_salary,
                is_active: e.is_active,
            })
            .collect()
    }

    /// Builds a resolver serving the request's supplements.
    pub fn resolver(&self) -> StaticSupplements {
        StaticSupplements::new(
            self.supplements
                .iter()
                .map(|(id, s)| (id.clone(), s.clone().into()))
                .collect(),
        )
    }
}

impl From<SupplementsRequest> for Supplements {
    fn from(req: SupplementsRequest) -> Self {
        Supplements::new(req.overtime_amount, req.bonus_amount)
    }
}
