//! Registration and login flow tests.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::*;

#[tokio::test]
async fn register_then_login_round_trip() {
    let router = router(state_without_analyzer());

    let response = post_json(
        &router,
        "/api/auth/register",
        json!({ "email": "a@example.com", "password": "secret123", "name": "小王" }),
    )
    .await;
    assert_status(&response, StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["token"].as_str().unwrap().len() > 10);
    assert_eq!(body["user"]["email"], "a@example.com");

    let response = post_json(
        &router,
        "/api/auth/login",
        json!({ "email": "a@example.com", "password": "secret123" }),
    )
    .await;
    assert_status(&response, StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["notion_connected"], false);
}

#[tokio::test]
async fn register_rejects_missing_fields() {
    let router = router(state_without_analyzer());
    let response = post_json(
        &router,
        "/api/auth/register",
        json!({ "email": "", "password": "secret123", "name": "小王" }),
    )
    .await;
    assert_status(&response, StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "所有字段都是必填的");
}

#[tokio::test]
async fn register_rejects_short_password() {
    let router = router(state_without_analyzer());
    let response = post_json(
        &router,
        "/api/auth/register",
        json!({ "email": "a@example.com", "password": "123", "name": "小王" }),
    )
    .await;
    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let router = router(state_without_analyzer());
    let payload = json!({ "email": "a@example.com", "password": "secret123", "name": "小王" });

    let first = post_json(&router, "/api/auth/register", payload.clone()).await;
    assert_status(&first, StatusCode::OK);

    let second = post_json(&router, "/api/auth/register", payload).await;
    assert_status(&second, StatusCode::BAD_REQUEST);
    let body = body_json(second).await;
    assert_eq!(body["error"], "用户已存在");
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let router = router(state_without_analyzer());
    post_json(
        &router,
        "/api/auth/register",
        json!({ "email": "a@example.com", "password": "secret123", "name": "小王" }),
    )
    .await;

    let response = post_json(
        &router,
        "/api/auth/login",
        json!({ "email": "a@example.com", "password": "wrong-password" }),
    )
    .await;
    assert_status(&response, StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "密码错误");
}

#[tokio::test]
async fn login_rejects_unknown_email() {
    let router = router(state_without_analyzer());
    let response = post_json(
        &router,
        "/api/auth/login",
        json!({ "email": "ghost@example.com", "password": "secret123" }),
    )
    .await;
    assert_status(&response, StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "用户不存在");
}
