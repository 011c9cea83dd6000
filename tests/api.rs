//! End-to-end tests driving the router in-process

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header::CONTENT_TYPE, Method, Request, StatusCode};
use axum::Router;
use num_bigint::BigUint;
use serde_json::{json, Value};
use tower::ServiceExt;

use todo_service::api::create_app;
use todo_service::core::{AppState, Config};
use todo_service::storage::{MemStore, Store};
use todo_service::todo::demo_todos;
use todo_service::{TodoDraft, TodoId};

fn ready_state() -> AppState {
    let store = Arc::new(Store::with_backend(Arc::new(MemStore::new())));
    AppState::new(store, Config::default())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_todo_lifecycle() {
    let app = create_app(ready_state());

    let (status, created) = send(&app, Method::POST, "/todos", Some(json!({"title": "Buy milk"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "Buy milk");
    assert_eq!(created["description"], "");
    assert_eq!(created["duetime"], Value::Null);
    assert_eq!(created["isDone"], false);

    let id = created["_id"].as_str().unwrap().to_string();
    assert!(id.ends_with('n'));
    assert!(id[..id.len() - 1].chars().all(|c| c.is_ascii_digit()));

    let uri = format!("/todos/{}", id);
    let (status, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, listed) = send(&app, Method::GET, "/todos", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([created]));

    let (status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"_id": id, "title": "Buy oat milk", "isDone": true, "duetime": 1673654400000i64})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["isDone"], true);
    assert_eq!(updated["duetime"], 1673654400000i64);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_is_ordered_by_id() {
    let state = ready_state();
    state.todos.seed(&demo_todos()).await.unwrap();
    let app = create_app(state);

    let (status, listed) = send(&app, Method::GET, "/todos", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|todo| todo["_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["1671056616571n", "1671087245763n", "1671087245764n"]);
    assert_eq!(listed[1]["title"], "Für die Klausur Webentwicklung lernen");
    assert_eq!(listed[1]["isDone"], true);
}

#[tokio::test]
async fn test_ids_beyond_double_precision_survive() {
    let state = ready_state();
    let big = TodoId::new(BigUint::from(1u32) << 80); // 1208925819614629174706176
    state
        .todos
        .seed(&[TodoDraft::titled("big").into_todo(big.clone())])
        .await
        .unwrap();
    let app = create_app(state);

    let (status, fetched) = send(&app, Method::GET, "/todos/1208925819614629174706176n", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["_id"], "1208925819614629174706176n");

    // 2^96 does not fit a storage id
    let (status, body) = send(&app, Method::GET, "/todos/79228162514264337593543950336n", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_path_id_must_use_wire_form() {
    let app = create_app(ready_state());
    for uri in ["/todos/42", "/todos/abc", "/todos/-1n"] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn test_create_rejects_bad_bodies() {
    let app = create_app(ready_state());

    let (status, body) = send(&app, Method::POST, "/todos", Some(json!({"title": 5, "isDone": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"].as_array().unwrap().len(), 2);

    let (status, _) = send(&app, Method::POST, "/todos", Some(json!({"_id": "1n", "title": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/todos")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Malformed JSON");

    let (status, listed) = send(&app, Method::GET, "/todos", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn test_update_requires_matching_existing_id() {
    let state = ready_state();
    state.todos.seed(&demo_todos()).await.unwrap();
    let app = create_app(state);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/todos/1671056616571n",
        Some(json!({"_id": "1671087245763n", "title": "hijack"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], json!(["ID mismatch between URI and JSON"]));

    let (status, _) = send(
        &app,
        Method::PUT,
        "/todos/5n",
        Some(json!({"_id": "5n", "title": "nobody here"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listed) = send(&app, Method::GET, "/todos", None).await;
    assert_eq!(listed.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_unavailable_until_storage_opens() {
    let state = AppState::new(Arc::new(Store::new()), Config::default());
    let app = create_app(state.clone());

    let (status, body) = send(&app, Method::GET, "/todos", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);

    let (status, health) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health["status"], "starting");

    state.store.open(Arc::new(MemStore::new()));

    let (status, body) = send(&app, Method::GET, "/todos", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, health) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["storage"], "memory");
}
