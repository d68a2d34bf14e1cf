//! ステータスチェック API の統合テスト

use aveniq_contact_service::test_utils::{TestApp, test_now};
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

fn create_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/status")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_ステータスチェックを作成すると一覧で取得できる() {
    // Given
    let app = TestApp::new();

    // When
    let created = app
        .router
        .clone()
        .oneshot(create_request(json!({ "client_name": "frontend" })))
        .await
        .unwrap();
    let listed = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // Then
    assert_eq!(created.status(), StatusCode::OK);
    let created = body_json(created).await;
    assert_eq!(created["client_name"], "frontend");
    assert_eq!(
        created["timestamp"],
        serde_json::to_value(test_now()).unwrap()
    );
    assert!(created["id"].is_string());

    assert_eq!(listed.status(), StatusCode::OK);
    assert_eq!(body_json(listed).await, json!([created]));
}

#[tokio::test]
async fn test_空のクライアント名はproblem_detailsの400を返す() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(create_request(json!({ "client_name": " " })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["type"],
        "https://aveniq-solutions.com/errors/validation-error"
    );
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_client_nameがないリクエストは400を返す() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(create_request(json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["type"], "https://aveniq-solutions.com/errors/bad-request");
}
