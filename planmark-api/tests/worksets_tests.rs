//! Unit and integration tests for planmark-api

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use planmark_api::app;
use serde_json::{json, Value};
use tower::util::ServiceExt;

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .uri(uri)
            .method(method)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => Request::builder()
            .uri(uri)
            .method(method)
            .body(Body::empty())
            .unwrap(),
    };
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let (status, json) = send(app(), "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "planmark API");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_list_empty_model() {
    let (status, json) = send(app(), "GET", "/api/models/m1/worksets", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn test_create_assigns_id_and_timestamps() {
    let store = std::sync::Arc::new(planmark_api::WorksetStore::new());
    let payload = json!({
        "name": "Slabs L2",
        "color": "#FB8C00",
        "opacity": 0.5,
        "elementIds": {"expressIds": [101, 205], "globalIds": ["0aXy$Z"]}
    });

    let (status, created) = send(
        planmark_api::app_with_store(store.clone()),
        "POST",
        "/api/models/m1/worksets",
        Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["id"].is_string());
    assert_eq!(created["modelId"], "m1");
    assert_eq!(created["name"], "Slabs L2");
    assert_eq!(created["color"], "#FB8C00");
    assert_eq!(created["elementIds"]["expressIds"], json!([101, 205]));
    assert!(created["createdAt"].is_string());
    assert!(created["updatedAt"].is_string());

    // And it shows up in the listing.
    let (status, listed) = send(
        planmark_api::app_with_store(store),
        "GET",
        "/api/models/m1/worksets",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], created["id"]);
}

#[tokio::test]
async fn test_create_applies_defaults() {
    let (status, created) = send(
        app(),
        "POST",
        "/api/models/m1/worksets",
        Some(json!({"name": "Walls"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["color"], "#1E88E5");
    assert_eq!(created["opacity"], 0.35);
    assert_eq!(created["elementIds"]["expressIds"], json!([]));
}

#[tokio::test]
async fn test_create_rejects_invalid_payloads() {
    for payload in [
        json!({"name": "  "}),
        json!({"name": "ok", "color": "blue"}),
        json!({"name": "ok", "opacity": 1.5}),
        json!({"name": "ok", "opacity": -0.1}),
    ] {
        let (status, body) = send(app(), "POST", "/api/models/m1/worksets", Some(payload)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_update_is_partial_merge() {
    let store = std::sync::Arc::new(planmark_api::WorksetStore::new());
    let (_, created) = send(
        planmark_api::app_with_store(store.clone()),
        "POST",
        "/api/models/m1/worksets",
        Some(json!({"name": "Walls", "color": "#FF0000", "opacity": 0.4})),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send(
        planmark_api::app_with_store(store),
        "PUT",
        &format!("/api/models/m1/worksets/{id}"),
        Some(json!({"opacity": 0.9})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // Omitted fields retained.
    assert_eq!(updated["name"], "Walls");
    assert_eq!(updated["color"], "#FF0000");
    assert_eq!(updated["opacity"], 0.9);
}

#[tokio::test]
async fn test_update_unknown_id_is_404() {
    let (status, body) = send(
        app(),
        "PUT",
        "/api/models/m1/worksets/nope",
        Some(json!({"name": "X"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn test_delete_then_delete_again_is_404() {
    let store = std::sync::Arc::new(planmark_api::WorksetStore::new());
    let (_, created) = send(
        planmark_api::app_with_store(store.clone()),
        "POST",
        "/api/models/m1/worksets",
        Some(json!({"name": "Walls"})),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let uri = format!("/api/models/m1/worksets/{id}");
    let (status, _) = send(planmark_api::app_with_store(store.clone()), "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Idempotent-404: the second delete reports not-found, not success.
    let (status, _) = send(planmark_api::app_with_store(store), "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
