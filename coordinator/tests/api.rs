use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tokio::sync::watch;
use tower::ServiceExt;

use fxbook_common::CurrencyRegistry;
use fxbook_coordinator::api::{create_router, ApiContext};
use fxbook_coordinator::{State, StateConfig};

fn test_app() -> (Router, Arc<State>, watch::Receiver<bool>) {
    let state = Arc::new(State::new(&CurrencyRegistry::standard(), &StateConfig::default()).unwrap());
    let (tx, rx) = watch::channel(false);
    let app = create_router(ApiContext {
        state: state.clone(),
        shutdown: Arc::new(tx),
    });
    (app, state, rx)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn get_single_balance() {
    let (app, state, _rx) = test_app();
    state.set_balance("USD", dec!(12)).unwrap();

    let (status, body) = send(&app, get("/usd/get")).await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({ "name": "USD", "value": "12" }));
}

#[tokio::test]
async fn unknown_currency_is_not_found() {
    let (app, _state, _rx) = test_app();

    let (status, body) = send(&app, get("/gbp/get")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["code"], "UNKNOWN_CURRENCY");
}

#[tokio::test]
async fn set_then_list_balances() {
    let (app, _state, _rx) = test_app();

    let (status, _) = send(&app, post_json("/amount/set", json!({ "usd": 10, "rub": 100 }))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, get("/amount/all")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        String::from_utf8(body).unwrap(),
        r#"{"RUB":"100","USD":"10","EUR":"0"}"#
    );
}

#[tokio::test]
async fn rejected_modify_changes_nothing() {
    let (app, state, _rx) = test_app();
    state.set_balance("USD", dec!(10)).unwrap();
    state.set_balance("EUR", dec!(5)).unwrap();

    let (status, body) = send(&app, post_json("/modify", json!({ "eur": 1, "usd": -20 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["code"], "INSUFFICIENT_AMOUNT");

    assert_eq!(state.get_balance("USD").unwrap(), dec!(10));
    assert_eq!(state.get_balance("EUR").unwrap(), dec!(5));

    let (status, _) = send(&app, post_json("/modify", json!({ "eur": 1, "usd": -4 }))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(state.get_balance("USD").unwrap(), dec!(6));
    assert_eq!(state.get_balance("EUR").unwrap(), dec!(6));
}

#[tokio::test]
async fn case_duplicate_codes_are_rejected() {
    let (app, state, _rx) = test_app();
    state.set_balance("USD", dec!(5)).unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/amount/set")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"usd": 1, "USD": 2}"#))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["code"], "INVALID_AMOUNT");
    assert_eq!(state.get_balance("USD").unwrap(), dec!(5));

    let request = Request::builder()
        .method("POST")
        .uri("/rates/set")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"eur": 99, "EUR": 98}"#))
        .unwrap();
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(state.get_exchange_rate("EUR"), None);
}

#[tokio::test]
async fn malformed_body_is_client_error() {
    let (app, _state, _rx) = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/amount/set")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&app, request).await;

    assert!(status.is_client_error());
}

#[tokio::test]
async fn rates_report_and_convert() {
    let (app, _state, _rx) = test_app();

    let (status, body) = send(&app, post_json("/rates/set", json!({ "usd": 90, "eur": -1 }))).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["applied"], 1);
    assert_eq!(body["skipped"][0]["code"], "INVALID_EXCHANGE_RATE");

    let (status, _) = send(&app, post_json("/amount/set", json!({ "usd": 10, "rub": 100 }))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, get("/amount/get")).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.starts_with("rub: 100\nusd: 10\neur: 0\n\n"));
    assert!(text.contains("usd-rub: 90\n"));
    assert!(text.contains("sum: 1000 rub / "));

    let (status, body) = send(&app, get("/convert?from=usd&to=rub&amount=2")).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["result"], "180");

    let (status, _) = send(&app, get("/convert?from=eur&to=rub&amount=2")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quit_signals_shutdown() {
    let (app, _state, rx) = test_app();
    assert!(!*rx.borrow());

    let request = Request::builder()
        .method("POST")
        .uri("/quit")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(*rx.borrow());
}
