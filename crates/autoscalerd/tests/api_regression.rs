//! API regression tests.
//!
//! Drives the full router the daemon serves: policy upsert, reads, and
//! request rejection before the upsert runs.

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use autoscaler_api::build_router;
use autoscaler_state::*;

fn test_store() -> StateStore {
    StateStore::open_in_memory().unwrap()
}

fn put_policy(app_id: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(format!("/v1/apps/{app_id}/policy"))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn api_upsert_scenario() {
    let store = test_store();
    let router = build_router(store.clone());

    let resp = router
        .clone()
        .oneshot(put_policy("app-42", &json!({"min": 1, "max": 5})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(resp).await["data"],
        json!({"app_id": "app-42", "policy_json": {"min": 1, "max": 5}})
    );

    let resp = router
        .oneshot(put_policy("app-42", &json!({"min": 2, "max": 8})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await["data"],
        json!({"app_id": "app-42", "policy_json": {"min": 2, "max": 8}})
    );

    let all = store.list_policies().unwrap();
    assert_eq!(all, vec![PolicyRecord::new("app-42", json!({"min": 2, "max": 8}))]);
}

#[tokio::test]
async fn api_get_policy_after_upsert() {
    let store = test_store();
    let router = build_router(store);

    let resp = router
        .clone()
        .oneshot(put_policy("app-1", &json!({"instance_min_count": 2})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = router.oneshot(get("/v1/apps/app-1/policy")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await["data"]["policy_json"],
        json!({"instance_min_count": 2})
    );
}

#[tokio::test]
async fn api_get_missing_policy() {
    let router = build_router(test_store());

    let resp = router.oneshot(get("/v1/apps/nope/policy")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["success"], json!(false));
}

#[tokio::test]
async fn api_list_policies_and_apps() {
    let store = test_store();
    store
        .find_or_create_policy("app-b", &PolicyRecord::new("app-b", json!({})))
        .unwrap();
    store
        .find_or_create_policy("app-a", &PolicyRecord::new("app-a", json!({})))
        .unwrap();
    let router = build_router(store);

    let resp = router.clone().oneshot(get("/v1/policies")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["data"].as_array().unwrap().len(), 2);

    let resp = router.oneshot(get("/v1/apps")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["data"], json!(["app-a", "app-b"]));
}

#[tokio::test]
async fn api_rejects_blank_app_id() {
    let store = test_store();
    let router = build_router(store.clone());

    let resp = router
        .oneshot(put_policy("%20", &json!({"min": 1})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(store.list_policies().unwrap().is_empty());
}

#[tokio::test]
async fn api_rejects_malformed_body() {
    let store = test_store();
    let router = build_router(store.clone());

    let req = Request::builder()
        .method("PUT")
        .uri("/v1/apps/app-1/policy")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let resp = router.oneshot(req).await.unwrap();
    assert!(resp.status().is_client_error());
    assert!(store.list_policies().unwrap().is_empty());
}

#[tokio::test]
async fn api_policy_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("policies.redb");

    {
        let router = build_router(StateStore::open(&db_path).unwrap());
        let resp = router
            .oneshot(put_policy("app-9", &json!({"max": 4})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let router = build_router(StateStore::open(&db_path).unwrap());
    let resp = router
        .oneshot(put_policy("app-9", &json!({"max": 6})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
