//! End-to-end tests for the ledger engine HTTP API.
//!
//! This test suite covers:
//! - Payroll runs (progressive tax, insurance, net salary)
//! - Failure isolation and input ordering in payroll batches
//! - Negative net salary flagging
//! - Invoice settlement and totals
//! - Error cases

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use ledger_engine::api::{AppState, create_router};
use ledger_engine::config::{ConfigLoader, EngineConfig, EngineSettings};
use ledger_engine::models::SettlementOrder;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    let loader = ConfigLoader::load("./config/default").expect("Failed to load config");
    AppState::new(loader.into_config())
}

fn create_router_for_test() -> Router {
    create_router(create_test_state())
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn amount(value: &Value) -> Decimal {
    decimal(value.as_str().expect("amount should serialize as a string"))
}

async fn post(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

fn payroll_request(employees: Vec<Value>, supplements: Value) -> Value {
    json!({
        "company_id": "acme",
        "period": {"year": 2025, "month": 7},
        "employees": employees,
        "supplements": supplements
    })
}

fn employee(id: &str, base_salary: &str) -> Value {
    json!({"id": id, "base_salary": base_salary})
}

fn line(quantity: &str, unit_price: &str, tax: &str, discount: &str) -> Value {
    json!({
        "quantity": quantity,
        "unit_price": unit_price,
        "tax_rate_percent": tax,
        "discount_rate_percent": discount
    })
}

fn assert_net_identity(entry: &Value) {
    let gross = amount(&entry["gross_salary"]);
    let tax = amount(&entry["tax_amount"]);
    let insurance = amount(&entry["insurance_amount"]);
    let net = amount(&entry["net_salary"]);
    assert_eq!(net, gross - tax - insurance, "net identity broken for {}", entry);
}

// =============================================================================
// Payroll
// =============================================================================

#[tokio::test]
async fn test_payroll_single_employee_in_second_bracket() {
    let request = payroll_request(vec![employee("emp_001", "7000000")], json!({}));

    let (status, json) = post(create_router_for_test(), "/payroll/run", request).await;

    assert_eq!(status, StatusCode::OK);
    let entry = &json["entries"][0];
    assert_eq!(entry["outcome"], "settled");
    assert_eq!(entry["status"], "pending");
    assert_eq!(amount(&entry["gross_salary"]), decimal("7000000"));
    assert_eq!(amount(&entry["tax_amount"]), decimal("200000"));
    assert_eq!(amount(&entry["insurance_amount"]), decimal("490000"));
    assert_eq!(amount(&entry["net_salary"]), decimal("6310000"));
    assert_net_identity(entry);
}

#[tokio::test]
async fn test_payroll_supplements_are_added_to_gross() {
    let request = payroll_request(
        vec![employee("emp_001", "9000000")],
        json!({"emp_001": {"overtime_amount": "500000", "bonus_amount": "1500000"}}),
    );

    let (status, json) = post(create_router_for_test(), "/payroll/run", request).await;

    assert_eq!(status, StatusCode::OK);
    let entry = &json["entries"][0];
    assert_eq!(amount(&entry["gross_salary"]), decimal("11000000"));
    // 5M at 10% plus 1M at 15%
    assert_eq!(amount(&entry["tax_amount"]), decimal("650000"));
    assert_eq!(amount(&entry["insurance_amount"]), decimal("770000"));
    assert_net_identity(entry);
}

#[tokio::test]
async fn test_payroll_below_first_threshold_pays_no_tax() {
    let request = payroll_request(vec![employee("emp_001", "4000000")], json!({}));

    let (_, json) = post(create_router_for_test(), "/payroll/run", request).await;

    let entry = &json["entries"][0];
    assert_eq!(amount(&entry["tax_amount"]), Decimal::ZERO);
    assert_eq!(amount(&entry["insurance_amount"]), decimal("280000"));
}

#[tokio::test]
async fn test_payroll_audit_trace_records_every_step() {
    let request = payroll_request(vec![employee("emp_001", "25000000")], json!({}));

    let (_, json) = post(create_router_for_test(), "/payroll/run", request).await;

    let steps = json["entries"][0]["audit_trace"]["steps"].as_array().unwrap();
    let rule_ids: Vec<&str> = steps.iter().map(|s| s["rule_id"].as_str().unwrap()).collect();
    assert_eq!(
        rule_ids,
        vec!["gross_salary", "progressive_tax", "insurance", "net_salary"]
    );
    // 500k + 1.5M + 1M
    assert_eq!(amount(&json["entries"][0]["tax_amount"]), decimal("3000000"));
}

#[tokio::test]
async fn test_payroll_failure_is_isolated_and_order_preserved() {
    let request = payroll_request(
        vec![
            employee("emp_001", "7000000"),
            employee("emp_002", "-1"),
            employee("emp_003", "12000000"),
        ],
        json!({}),
    );

    let (status, json) = post(create_router_for_test(), "/payroll/run", request).await;

    assert_eq!(status, StatusCode::OK);
    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    let ids: Vec<&str> = entries
        .iter()
        .map(|e| e["employee_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["emp_001", "emp_002", "emp_003"]);

    assert_eq!(entries[0]["outcome"], "settled");
    assert_eq!(entries[1]["outcome"], "failed");
    assert_eq!(entries[1]["kind"], "invalid_input");
    assert_eq!(entries[2]["outcome"], "settled");

    assert_eq!(json["summary"]["settled_count"], 2);
    assert_eq!(json["summary"]["failed_count"], 1);
    assert_eq!(amount(&json["summary"]["total_gross"]), decimal("19000000"));
}

#[tokio::test]
async fn test_payroll_skips_inactive_employees() {
    let request = payroll_request(
        vec![
            employee("emp_001", "7000000"),
            json!({"id": "emp_002", "base_salary": "9000000", "is_active": false}),
        ],
        json!({}),
    );

    let (_, json) = post(create_router_for_test(), "/payroll/run", request).await;

    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["employee_id"], "emp_001");
}

#[tokio::test]
async fn test_payroll_empty_batch() {
    let request = payroll_request(vec![], json!({}));

    let (status, json) = post(create_router_for_test(), "/payroll/run", request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["entries"].as_array().unwrap().is_empty());
    assert_eq!(json["summary"]["employee_count"], 0);
    assert_eq!(amount(&json["summary"]["total_net"]), Decimal::ZERO);
}

#[tokio::test]
async fn test_payroll_negative_net_salary_is_flagged() {
    let settings = EngineSettings {
        insurance_rate: decimal("1"),
        ..EngineSettings::default()
    };
    let config = EngineConfig::new(settings, EngineConfig::standard_tax_table().unwrap()).unwrap();
    let router = create_router(AppState::new(config));
    let request = payroll_request(vec![employee("emp_001", "7000000")], json!({}));

    let (status, json) = post(router, "/payroll/run", request).await;

    assert_eq!(status, StatusCode::OK);
    let entry = &json["entries"][0];
    assert_eq!(entry["outcome"], "settled");
    assert_eq!(amount(&entry["net_salary"]), decimal("-200000"));
    assert_eq!(entry["audit_trace"]["warnings"][0]["code"], "NEGATIVE_NET_SALARY");
    assert_eq!(json["summary"]["flagged_count"], 1);
    assert_net_identity(entry);
}

#[tokio::test]
async fn test_payroll_totals_beyond_decimal_range_are_unprocessable() {
    let huge = "40000000000000000000000000000";
    let request = payroll_request(
        vec![employee("emp_001", huge), employee("emp_002", huge)],
        json!({}),
    );

    let (status, json) = post(create_router_for_test(), "/payroll/run", request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "CALCULATION_ERROR");
}

#[tokio::test]
async fn test_payroll_invalid_period_is_rejected() {
    let request = json!({
        "company_id": "acme",
        "period": {"year": 2025, "month": 13},
        "employees": []
    });

    let (status, json) = post(create_router_for_test(), "/payroll/run", request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_payroll_missing_company_is_validation_error() {
    let request = json!({"period": {"year": 2025, "month": 7}, "employees": []});

    let (status, json) = post(create_router_for_test(), "/payroll/run", request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// =============================================================================
// Invoices
// =============================================================================

#[tokio::test]
async fn test_invoice_tax_then_discount() {
    let request = json!({"lines": [line("2", "1000000", "9", "10")]});

    let (status, json) = post(create_router_for_test(), "/invoices/settle", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["currency"], "IRR");
    let settled = &json["lines"][0];
    assert_eq!(amount(&settled["base"]), decimal("2000000"));
    assert_eq!(amount(&settled["taxed"]), decimal("2180000"));
    assert_eq!(amount(&settled["tax_amount"]), decimal("180000"));
    assert_eq!(amount(&settled["discount_amount"]), decimal("218000"));
    assert_eq!(amount(&settled["line_total"]), decimal("1962000"));
    assert!(!json["invoice_id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_invoice_discount_then_tax() {
    let config = EngineConfig::standard()
        .unwrap()
        .with_settlement_order(SettlementOrder::DiscountThenTax);
    let router = create_router(AppState::new(config));
    let request = json!({"invoice_id": "inv_042", "lines": [line("2", "1000000", "9", "10")]});

    let (status, json) = post(router, "/invoices/settle", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["invoice_id"], "inv_042");
    assert_eq!(json["settlement_order"], "discount_then_tax");
    let settled = &json["lines"][0];
    assert_eq!(amount(&settled["discount_amount"]), decimal("200000"));
    assert_eq!(amount(&settled["tax_amount"]), decimal("162000"));
    assert_eq!(amount(&settled["line_total"]), decimal("1962000"));
}

#[tokio::test]
async fn test_invoice_totals_identity() {
    let request = json!({
        "lines": [
            line("3", "333333", "9", "5"),
            line("1", "1250000", "0", "0"),
            line("7", "41999", "9", "12.5")
        ]
    });

    let (status, json) = post(create_router_for_test(), "/invoices/settle", request).await;

    assert_eq!(status, StatusCode::OK);
    let totals = &json["totals"];
    let subtotal = amount(&totals["subtotal"]);
    let tax_total = amount(&totals["tax_total"]);
    let discount_total = amount(&totals["discount_total"]);
    let grand_total = amount(&totals["grand_total"]);
    assert_eq!(grand_total, subtotal + tax_total - discount_total);

    let line_sum: Decimal = json["lines"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| amount(&l["line_total"]))
        .sum();
    assert_eq!(grand_total, line_sum);
}

#[tokio::test]
async fn test_invoice_without_lines_has_zero_totals() {
    let request = json!({"lines": []});

    let (status, json) = post(create_router_for_test(), "/invoices/settle", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(amount(&json["totals"]["grand_total"]), Decimal::ZERO);
}

#[tokio::test]
async fn test_invoice_discount_above_hundred_is_rejected() {
    let request = json!({"lines": [line("1", "1000", "9", "150")]});

    let (status, json) = post(create_router_for_test(), "/invoices/settle", request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_INPUT");
    assert!(json["details"].as_str().unwrap().contains("discount_rate_percent"));
}

#[tokio::test]
async fn test_invoice_malformed_json() {
    let response = create_router_for_test()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/invoices/settle")
                .header("Content-Type", "application/json")
                .body(Body::from("{\"lines\": [}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_content_type() {
    let response = create_router_for_test()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/invoices/settle")
                .body(Body::from("{\"lines\": []}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(json["code"], "MISSING_CONTENT_TYPE");
}
