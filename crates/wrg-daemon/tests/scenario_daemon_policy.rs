//! Scenario: the daemon wired with the ForwardOnly transition policy. A
//! refused transition surfaces as 409 and leaves the stored record intact.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wrg_daemon::{routes, state};
use wrg_orders::ForwardOnly;

fn forward_only_state() -> Arc<state::AppState> {
    Arc::new(state::AppState::with_policy(Arc::new(ForwardOnly)))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn call(st: &Arc<state::AppState>, req: Request<Body>) -> (StatusCode, Value) {
    let resp = routes::build_router(Arc::clone(st))
        .oneshot(req)
        .await
        .expect("oneshot failed");
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn create_order(st: &Arc<state::AppState>) -> String {
    let body = json!({
        "tableNumber": "5",
        "items": [{"name": "Nasi Goreng", "quantity": 1, "price": 25000}],
        "total": 25000,
        "waiterName": "Andi"
    });
    let (status, resp) = call(st, json_request("POST", "/v1/orders", body)).await;
    assert_eq!(status, StatusCode::OK);
    resp["order"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn forward_step_is_accepted() {
    let st = forward_only_state();
    let id = create_order(&st).await;

    let (status, body) = call(
        &st,
        json_request(
            "PUT",
            &format!("/v1/orders/{id}/status"),
            json!({"status": "cooking"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "cooking");
}

#[tokio::test]
async fn backward_move_is_409_and_record_is_unchanged() {
    let st = forward_only_state();
    let id = create_order(&st).await;

    let (_, _) = call(
        &st,
        json_request(
            "PUT",
            &format!("/v1/orders/{id}/status"),
            json!({"status": "cooking"}),
        ),
    )
    .await;

    let (status, body) = call(
        &st,
        json_request(
            "PUT",
            &format!("/v1/orders/{id}/status"),
            json!({"status": "pending"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("transition refused"));

    let (_, listing) = call(
        &st,
        Request::builder()
            .method("GET")
            .uri("/v1/orders")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(listing["orders"][0]["status"], "cooking");
}

#[tokio::test]
async fn skipping_a_step_is_409() {
    let st = forward_only_state();
    let id = create_order(&st).await;

    let (status, _) = call(
        &st,
        json_request(
            "PUT",
            &format!("/v1/orders/{id}/status"),
            json!({"status": "completed"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
