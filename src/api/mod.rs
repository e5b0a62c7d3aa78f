//! HTTP API module for the ledger engine.
//!
//! This module exposes payroll batch settlement and invoice settlement as
//! REST endpoints.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{EmployeeRequest, InvoiceSettleRequest, PayrollRunRequest, SupplementsRequest};
pub use response::{ApiError, ApiErrorResponse, InvoiceSettlementResponse};
pub use state::AppState;
