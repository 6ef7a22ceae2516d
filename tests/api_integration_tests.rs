//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use coherent_cache::{api::create_router, AppState, ManualClock, SharedStore};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    create_router(AppState::new(SharedStore::new(100, 300)))
}

fn create_app_with_clock() -> (Router, ManualClock) {
    let clock = ManualClock::starting_now();
    let store = SharedStore::with_clock(100, 300, Arc::new(clock.clone()));
    (create_router(AppState::new(store)), clock)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn put_json(app: &Router, uri: &str, body: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn send(app: &Router, method: &str, uri: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let app = create_test_app();

    let response = put_json(&app, "/set", r#"{"key":"test_key","value":"test_value"}"#).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("test_key"));
}

#[tokio::test]
async fn test_set_endpoint_with_ttl() {
    let app = create_test_app();

    let response = put_json(&app, "/set", r#"{"key":"ttl_key","value":"ttl_value","ttl":60}"#).await;

    assert_eq!(response.status(), StatusCode::OK);
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_success() {
    let app = create_test_app();
    let set_response = put_json(&app, "/set", r#"{"key":"get_key","value":"get_value"}"#).await;
    assert_eq!(set_response.status(), StatusCode::OK);

    let get_response = send(&app, "GET", "/get/get_key").await;

    assert_eq!(get_response.status(), StatusCode::OK);
    let json = body_to_json(get_response.into_body()).await;
    assert_eq!(json["key"].as_str().unwrap(), "get_key");
    assert_eq!(json["value"].as_str().unwrap(), "get_value");
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app();

    let response = send(&app, "GET", "/get/nonexistent_key").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("nonexistent_key"));
}

#[tokio::test]
async fn test_get_on_hash_is_conflict() {
    let app = create_test_app();
    put_json(&app, "/hset", r#"{"key":"h","fields":{"a":"1"}}"#).await;

    let response = send(&app, "GET", "/get/h").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// == HSET / HGETALL Endpoint Tests ==

#[tokio::test]
async fn test_hset_then_hgetall() {
    let app = create_test_app();

    let response = put_json(
        &app,
        "/hset",
        r#"{"key":"emp","fields":{"syncId":"t1","data":"{\"name\":\"Davide\"}"},"ttl":60}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "GET", "/hgetall/emp").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["fields"]["syncId"], "t1");
    assert_eq!(json["fields"]["data"], r#"{"name":"Davide"}"#);
}

#[tokio::test]
async fn test_hset_merges_fields() {
    let app = create_test_app();
    put_json(&app, "/hset", r#"{"key":"h","fields":{"a":"1","b":"2"}}"#).await;
    put_json(&app, "/hset", r#"{"key":"h","fields":{"b":"3"}}"#).await;

    let json = body_to_json(send(&app, "GET", "/hgetall/h").await.into_body()).await;

    assert_eq!(json["fields"], serde_json::json!({"a": "1", "b": "3"}));
}

#[tokio::test]
async fn test_hgetall_missing_key_is_empty() {
    let app = create_test_app();

    let response = send(&app, "GET", "/hgetall/missing").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["fields"], serde_json::json!({}));
}

#[tokio::test]
async fn test_hset_on_string_is_conflict() {
    let app = create_test_app();
    put_json(&app, "/set", r#"{"key":"s","value":"v"}"#).await;

    let response = put_json(&app, "/hset", r#"{"key":"s","fields":{"a":"1"}}"#).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_hset_without_fields_is_bad_request() {
    let app = create_test_app();

    let response = put_json(&app, "/hset", r#"{"key":"h","fields":{}}"#).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint_success() {
    let app = create_test_app();
    put_json(&app, "/set", r#"{"key":"delete_key","value":"delete_value"}"#).await;

    let del_response = send(&app, "DELETE", "/del/delete_key").await;
    assert_eq!(del_response.status(), StatusCode::OK);

    let get_response = send(&app, "GET", "/get/delete_key").await;
    assert_eq!(get_response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_removes_hash() {
    let app = create_test_app();
    put_json(&app, "/hset", r#"{"key":"h","fields":{"a":"1"}}"#).await;

    let del_response = send(&app, "DELETE", "/del/h").await;
    assert_eq!(del_response.status(), StatusCode::OK);

    let json = body_to_json(send(&app, "GET", "/hgetall/h").await.into_body()).await;
    assert_eq!(json["fields"], serde_json::json!({}));
}

#[tokio::test]
async fn test_delete_endpoint_not_found() {
    let app = create_test_app();

    let response = send(&app, "DELETE", "/del/nonexistent_key").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app();
    put_json(&app, "/set", r#"{"key":"stats_key","value":"stats_value"}"#).await;
    send(&app, "GET", "/get/stats_key").await;
    send(&app, "GET", "/get/nonexistent").await;

    let response = send(&app, "GET", "/stats").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"].as_u64().unwrap(), 1);
    assert_eq!(json["misses"].as_u64().unwrap(), 1);
    assert_eq!(json["total_entries"].as_u64().unwrap(), 1);
    assert_eq!(json["expirations"].as_u64().unwrap(), 0);
    assert!(json.get("hit_rate").is_some());
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = send(&app, "GET", "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"].as_str().unwrap(), "healthy");
    assert!(json.get("timestamp").is_some());
}

// == Error Response Tests ==

#[tokio::test]
async fn test_invalid_json_request() {
    let app = create_test_app();

    let response = put_json(&app, "/set", r#"{"invalid json"#).await;

    // Axum rejects malformed JSON before the handler runs
    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_empty_key_request() {
    let app = create_test_app();

    let response = put_json(&app, "/set", r#"{"key":"","value":"test"}"#).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

// == TTL Expiration via API Tests ==

#[tokio::test]
async fn test_ttl_expiration_via_api() {
    let (app, clock) = create_app_with_clock();
    let set_response =
        put_json(&app, "/set", r#"{"key":"ttl_test","value":"expires_soon","ttl":1}"#).await;
    assert_eq!(set_response.status(), StatusCode::OK);

    assert_eq!(send(&app, "GET", "/get/ttl_test").await.status(), StatusCode::OK);

    clock.advance(Duration::from_millis(1100));

    assert_eq!(
        send(&app, "GET", "/get/ttl_test").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_hash_ttl_expiration_via_api() {
    let (app, clock) = create_app_with_clock();
    put_json(&app, "/hset", r#"{"key":"h","fields":{"a":"1"},"ttl":5}"#).await;

    clock.advance(Duration::from_secs(5));

    let json = body_to_json(send(&app, "GET", "/hgetall/h").await.into_body()).await;
    assert_eq!(json["fields"], serde_json::json!({}));
}
