//! HTTP request handlers for the ledger engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{CancellationFlag, PayrollBatchRunner};
use crate::error::EngineError;
use crate::models::Invoice;

use super::request::{InvoiceSettleRequest, PayrollRunRequest};
use super::response::{ApiError, ApiErrorResponse, InvoiceSettlementResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/payroll/run", post(payroll_run_handler))
        .route("/invoices/settle", post(invoice_settle_handler))
        .with_state(state)
}

/// Handler for POST /payroll/run.
///
/// Answers 200 with a full per-employee report once the request is
/// well-formed; individual settlement failures are entries in the report.
/// Batch totals outside the `Decimal` range answer 422.
async fn payroll_run_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayrollRunRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll run request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let employees = request.employees();
    let runner = PayrollBatchRunner::new(state.shared_config(), request.resolver());

    let start_time = Instant::now();
    let report = match runner
        .run_report(
            &request.company_id,
            request.period,
            &employees,
            &CancellationFlag::new(),
        )
        .await
    {
        Ok(report) => report,
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                company_id = %request.company_id,
                error = %err,
                "Payroll summary could not be computed"
            );
            return ApiErrorResponse::from(err).into_response();
        }
    };

    info!(
        correlation_id = %correlation_id,
        batch_id = %report.batch_id,
        company_id = %report.company_id,
        period = %report.period,
        settled = report.summary.settled_count,
        failed = report.summary.failed_count,
        flagged = report.summary.flagged_count,
        duration_us = start_time.elapsed().as_micros() as u64,
        "Payroll run completed"
    );

    json_response(StatusCode::OK, &report)
}

/// Handler for POST /invoices/settle.
///
/// Settles every line and returns the lines with derived totals. The first
/// invalid line rejects the whole request.
async fn invoice_settle_handler(
    State(state): State<AppState>,
    payload: Result<Json<InvoiceSettleRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing invoice settlement request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let config = state.config();
    let invoice_id = request
        .invoice_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let mut invoice = Invoice::new(invoice_id, config.settlement_order(), config.rounding());

    for (index, line) in request.lines.into_iter().enumerate() {
        let added = invoice.add_line(line).map(|_| ());
        if let Err(err) = added {
            warn!(
                correlation_id = %correlation_id,
                invoice_id = %invoice.id(),
                line = index,
                error = %err,
                "Invoice line rejected"
            );
            let err = match err {
                EngineError::InvalidInput { field, message } => EngineError::InvalidInput {
                    field: format!("lines[{}].{}", index, field),
                    message,
                },
                other => other,
            };
            return ApiErrorResponse::from(err).into_response();
        }
    }

    let totals = match invoice.totals() {
        Ok(totals) => totals,
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                invoice_id = %invoice.id(),
                error = %err,
                "Invoice totals could not be computed"
            );
            return ApiErrorResponse::from(err).into_response();
        }
    };
    info!(
        correlation_id = %correlation_id,
        invoice_id = %invoice.id(),
        lines = invoice.lines().len(),
        grand_total = %totals.grand_total,
        "Invoice settled"
    );

    let response = InvoiceSettlementResponse {
        invoice_id: invoice.id().to_string(),
        settlement_order: config.settlement_order(),
        currency: config.currency().to_string(),
        lines: invoice.lines().to_vec(),
        totals,
    };
    json_response(StatusCode::OK, &response)
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: &T) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], Json(body)).into_response()
}

/// Maps a JSON extraction failure to a 400 response.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, &error)
}
