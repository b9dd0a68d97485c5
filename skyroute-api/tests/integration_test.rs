use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use skyroute_api::{app, AppState};
use skyroute_store::app_config::BusinessRules;
use skyroute_store::MemoryStorage;
use std::sync::Arc;
use tower::ServiceExt;

async fn test_app(opening_balance: i64) -> Router {
    let rules = BusinessRules {
        opening_balance: Decimal::from(opening_balance),
        ..BusinessRules::default()
    }
    .without_delays();
    let state = AppState::build(Arc::new(MemoryStorage::new()), rules)
        .await
        .unwrap();
    app(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send_raw(app, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

fn passengers(count: usize) -> Value {
    let rows: Vec<Value> = (0..count)
        .map(|i| json!({ "firstName": format!("Guest{}", i + 1), "lastName": "Sharma", "age": "34" }))
        .collect();
    json!({ "passengers": rows })
}

/// Drive the wizard for FL-101 up to the payment step.
async fn reach_payment(app: &Router, count: usize) {
    let (status, _) = send(app, "POST", "/v1/wizard/open", Some(json!({ "flightId": "FL-101" }))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(app, "POST", "/v1/wizard/passengers", Some(passengers(count))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "SUMMARY");
    let (status, body) = send(app, "POST", "/v1/wizard/summary/confirm", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "PAYMENT");
}

#[tokio::test]
async fn test_flight_search_filters_by_city() {
    let app = test_app(0).await;

    let (status, body) = send(&app, "GET", "/v1/flights?from=delhi&to=Mumbai", None).await;
    assert_eq!(status, StatusCode::OK);
    let flights = body.as_array().unwrap();
    assert!(!flights.is_empty());
    for flight in flights {
        assert_eq!(flight["departure"]["city"], "Delhi");
        assert_eq!(flight["arrival"]["city"], "Mumbai");
    }

    let (status, body) = send(&app, "GET", "/v1/flights", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 8);

    let (status, body) = send(&app, "GET", "/v1/flights/FL-101", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["flightNumber"], "6E 2134");
    assert_eq!(body["price"], 5890.0);
}

#[tokio::test]
async fn test_unknown_flight_is_not_found() {
    let app = test_app(0).await;

    let (status, _) = send(&app, "GET", "/v1/flights/FL-999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "POST", "/v1/wizard/open", Some(json!({ "flightId": "FL-999" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("FL-999"));
}

#[tokio::test]
async fn test_wallet_booking_flow() {
    let app = test_app(20000).await;
    reach_payment(&app, 2).await;

    let (_, snapshot) = send(&app, "GET", "/v1/wizard", None).await;
    assert_eq!(snapshot["fare"]["total"], 13900.4);

    let (status, body) = send(&app, "POST", "/v1/wizard/pay", Some(json!({ "method": "wallet" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["receipt"]["method"], "wallet");
    assert_eq!(body["booking"]["totalAmount"], 13900.4);
    let booking_id = body["booking"]["id"].as_str().unwrap().to_string();
    assert!(booking_id.starts_with("SRA"));

    let (_, snapshot) = send(&app, "GET", "/v1/wizard", None).await;
    assert_eq!(snapshot["stage"], "COMPLETED");
    assert_eq!(snapshot["confirmation"]["id"], booking_id.as_str());

    let (_, wallet) = send(&app, "GET", "/v1/wallet", None).await;
    assert_eq!(wallet["balance"], 6099.6);

    let (_, bookings) = send(&app, "GET", "/v1/bookings", None).await;
    assert_eq!(bookings.as_array().unwrap().len(), 1);

    let (status, booking) = send(&app, "GET", &format!("/v1/bookings/{}", booking_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booking["passengers"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_insufficient_funds_keeps_payment_step() {
    let app = test_app(10000).await;
    reach_payment(&app, 2).await;

    let (status, body) = send(&app, "POST", "/v1/wizard/pay", Some(json!({ "method": "wallet" }))).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert!(body["error"].as_str().unwrap().contains("Insufficient"));

    let (_, snapshot) = send(&app, "GET", "/v1/wizard", None).await;
    assert_eq!(snapshot["stage"], "PAYMENT");

    let (_, wallet) = send(&app, "GET", "/v1/wallet", None).await;
    assert_eq!(wallet["balance"], 10000.0);

    let (_, bookings) = send(&app, "GET", "/v1/bookings", None).await;
    assert!(bookings.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_card_then_upi_succeeds() {
    let app = test_app(0).await;
    reach_payment(&app, 1).await;

    let card = json!({
        "method": "card",
        "number": "4111 1111",
        "name": "Guest One",
        "expiry": "12/27",
        "cvv": "123"
    });
    let (status, _) = send(&app, "POST", "/v1/wizard/pay", Some(card)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let upi = json!({ "method": "upi", "upiId": "guest@okbank" });
    let (status, body) = send(&app, "POST", "/v1/wizard/pay", Some(upi)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking"]["totalAmount"], 6950.2);
    assert_eq!(body["receipt"]["method"], "upi");
}

#[tokio::test]
async fn test_passenger_validation_reports_fields() {
    let app = test_app(0).await;
    send(&app, "POST", "/v1/wizard/open", Some(json!({ "flightId": "FL-101" }))).await;

    let body = json!({
        "passengers": [
            { "firstName": "Asha", "lastName": "Rao", "age": "29" },
            { "firstName": "  ", "lastName": "Rao", "age": "abc" }
        ]
    });
    let (status, body) = send(&app, "POST", "/v1/wizard/passengers", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields = body["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 2);
    assert!(fields.iter().all(|f| f["passenger"] == 1));

    let (status, _) = send(&app, "POST", "/v1/wizard/passengers", Some(passengers(5))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, snapshot) = send(&app, "GET", "/v1/wizard", None).await;
    assert_eq!(snapshot["stage"], "PASSENGERS");
}

#[tokio::test]
async fn test_out_of_order_steps_conflict() {
    let app = test_app(20000).await;

    let (status, _) = send(&app, "POST", "/v1/wizard/summary/confirm", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    send(&app, "POST", "/v1/wizard/open", Some(json!({ "flightId": "FL-102" }))).await;
    let (status, _) = send(&app, "POST", "/v1/wizard/pay", Some(json!({ "method": "wallet" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, "POST", "/v1/wizard/back", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, "GET", "/v1/wizard/ticket", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_back_keeps_entered_passengers() {
    let app = test_app(0).await;
    reach_payment(&app, 3).await;

    let (status, body) = send(&app, "POST", "/v1/wizard/back", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "SUMMARY");

    let (_, body) = send(&app, "POST", "/v1/wizard/back", None).await;
    assert_eq!(body["stage"], "PASSENGERS");
    assert_eq!(body["passengers"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_ticket_download() {
    let app = test_app(20000).await;
    reach_payment(&app, 2).await;
    let (_, body) = send(&app, "POST", "/v1/wizard/pay", Some(json!({ "method": "wallet" }))).await;
    let booking_id = body["booking"]["id"].as_str().unwrap().to_string();

    let request = Request::builder()
        .uri("/v1/wizard/ticket")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(disposition, format!("attachment; filename=\"ticket-{}.txt\"", booking_id));
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains(&booking_id));
    assert!(text.contains("Guest1 Sharma"));
    assert!(text.contains("Guest2 Sharma"));

    let (status, ticket) = send(&app, "GET", "/v1/wizard/ticket?format=json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ticket["rows"].as_array().unwrap().len(), 2);
    assert!(ticket["rows"][0]["seat"].as_str().unwrap().starts_with('A'));
}

#[tokio::test]
async fn test_close_keeps_stored_bookings() {
    let app = test_app(20000).await;
    reach_payment(&app, 1).await;
    send(&app, "POST", "/v1/wizard/pay", Some(json!({ "method": "wallet" }))).await;

    let (status, body) = send(&app, "POST", "/v1/wizard/close", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "PASSENGERS");
    assert!(body["flight"].is_null());
    assert!(body["confirmation"].is_null());

    let (_, bookings) = send(&app, "GET", "/v1/bookings", None).await;
    assert_eq!(bookings.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_top_up_records_credit() {
    let app = test_app(100).await;

    let request = json!({
        "amount": 500,
        "payment": { "method": "upi", "upiId": "me@upi" }
    });
    let (status, body) = send(&app, "POST", "/v1/wallet/top-up", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], 600.0);
    assert_eq!(body["transaction"]["type"], "credit");
    assert!(body["transaction"]["id"].as_str().unwrap().starts_with("TXN"));

    let wallet_top_up = json!({ "amount": 500, "payment": { "method": "wallet" } });
    let (status, _) = send(&app, "POST", "/v1/wallet/top-up", Some(wallet_top_up)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let zero = json!({ "amount": 0, "payment": { "method": "upi", "upiId": "me@upi" } });
    let (status, _) = send(&app, "POST", "/v1/wallet/top-up", Some(zero)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, transactions) = send(&app, "GET", "/v1/wallet/transactions", None).await;
    assert_eq!(transactions.as_array().unwrap().len(), 1);
    assert_eq!(transactions[0]["method"], "upi");
}

#[tokio::test]
async fn test_audit_reports_unrecorded_debits() {
    let app = test_app(20000).await;
    reach_payment(&app, 1).await;
    send(&app, "POST", "/v1/wizard/pay", Some(json!({ "method": "wallet" }))).await;

    let (status, audit) = send(&app, "GET", "/v1/wallet/audit", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(audit["balance"], 13049.8);
    assert_eq!(audit["transactionCount"], 0);
}
