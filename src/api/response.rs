//! Response types for the ledger engine API.
//!
//! This module defines the invoice settlement response body, the error
//! response structures, and the mapping from engine errors to HTTP status
//! codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{InvoiceLineResult, InvoiceTotals, SettlementOrder};

/// Response body for the `/invoices/settle` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceSettlementResponse {
    /// The invoice identifier.
    pub invoice_id: String,
    /// The order tax and discount were applied in.
    pub settlement_order: SettlementOrder,
    /// Currency of every amount.
    pub currency: String,
    /// Settled lines in request order.
    pub lines: Vec<InvoiceLineResult>,
    /// Totals over the lines.
    pub totals: InvoiceTotals,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::Configuration { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            },
            EngineError::InvalidInput { field, .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_INPUT",
                    message,
                    format!("The field '{}' contains an invalid value", field),
                ),
            },
            EngineError::Resolver { .. } | EngineError::ResolverTimeout { .. } => {
                ApiErrorResponse {
                    status: StatusCode::BAD_GATEWAY,
                    error: ApiError::with_details(
                        "RESOLVER_ERROR",
                        "Overtime/bonus resolution failed",
                        message,
                    ),
                }
            }
            EngineError::CalculationError { .. } => ApiErrorResponse {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            },
        }
    }
}
