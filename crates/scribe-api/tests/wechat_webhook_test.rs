//! WeChat webhook challenge and message-routing tests.

mod common;

use axum::http::StatusCode;
use sha1::{Digest, Sha1};

use common::*;

fn sign(token: &str, timestamp: &str, nonce: &str) -> String {
    let mut parts = [token, timestamp, nonce];
    parts.sort_unstable();
    let mut sha = Sha1::new();
    sha.update(parts.join(""));
    hex::encode(sha.finalize())
}

#[tokio::test]
async fn challenge_echoes_echostr_on_valid_signature() {
    let router = router(state_without_analyzer());
    let signature = sign("test_wechat_token", "1700000000", "nonce1");

    let response = get(
        &router,
        &format!(
            "/api/wechat/webhook?signature={}&timestamp=1700000000&nonce=nonce1&echostr=echo123",
            signature
        ),
    )
    .await;
    assert_status(&response, StatusCode::OK);
    assert_eq!(body_text(response).await, "echo123");
}

#[tokio::test]
async fn challenge_rejects_bad_signature() {
    let router = router(state_without_analyzer());
    let response = get(
        &router,
        "/api/wechat/webhook?signature=deadbeef&timestamp=1700000000&nonce=nonce1&echostr=echo123",
    )
    .await;
    assert_status(&response, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn challenge_rejects_missing_parameters() {
    let router = router(state_without_analyzer());
    let response = get(&router, "/api/wechat/webhook?timestamp=1700000000").await;
    assert_status(&response, StatusCode::BAD_REQUEST);
}

fn text_message_xml(from: &str, content: &str) -> String {
    format!(
        "<xml>\
        <ToUserName><![CDATA[gh_bot]]></ToUserName>\
        <FromUserName><![CDATA[{from}]]></FromUserName>\
        <CreateTime>1700000000</CreateTime>\
        <MsgType><![CDATA[text]]></MsgType>\
        <Content><![CDATA[{content}]]></Content>\
        </xml>"
    )
}

async fn post_xml(router: &axum::Router, body: String) -> axum::http::Response<axum::body::Body> {
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/wechat/webhook")
        .header("content-type", "text/xml")
        .body(axum::body::Body::from(body))
        .unwrap();
    send(router, request).await
}

#[tokio::test]
async fn text_from_unauthorized_user_gets_auth_link_reply() {
    let router = router(state_without_analyzer());
    let response = post_xml(&router, text_message_xml("openid_9", "今天很开心")).await;
    assert_status(&response, StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/xml"
    );

    let body = body_text(response).await;
    assert!(body.contains("<MsgType><![CDATA[text]]></MsgType>"));
    assert!(body.contains("/auth/notion?user_id=openid_9"));
    // Reply is addressed back to the sender.
    assert!(body.contains("<ToUserName><![CDATA[openid_9]]></ToUserName>"));
}

#[tokio::test]
async fn subscribe_event_gets_welcome_reply() {
    let router = router(state_without_analyzer());
    let xml = "<xml>\
        <ToUserName><![CDATA[gh_bot]]></ToUserName>\
        <FromUserName><![CDATA[openid_9]]></FromUserName>\
        <CreateTime>1700000000</CreateTime>\
        <MsgType><![CDATA[event]]></MsgType>\
        <Event><![CDATA[subscribe]]></Event>\
        </xml>";
    let response = post_xml(&router, xml.to_string()).await;
    assert_status(&response, StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("欢迎关注微信日记AI"));
}

#[tokio::test]
async fn unsupported_message_types_answer_success() {
    let router = router(state_without_analyzer());
    let xml = "<xml>\
        <MsgType><![CDATA[image]]></MsgType>\
        <FromUserName><![CDATA[openid_9]]></FromUserName>\
        <ToUserName><![CDATA[gh_bot]]></ToUserName>\
        </xml>";
    let response = post_xml(&router, xml.to_string()).await;
    assert_status(&response, StatusCode::OK);
    assert_eq!(body_text(response).await, "success");
}
