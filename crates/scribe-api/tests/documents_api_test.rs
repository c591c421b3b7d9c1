//! Document upload, limits, and listing tests.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;

use common::*;

async fn upload(
    router: &axum::Router,
    file_name: &str,
    content: &str,
    user_id: &str,
) -> axum::http::Response<Body> {
    let (content_type, body) = multipart_upload("XBOUNDARYX", file_name, content, user_id);
    let request = Request::builder()
        .method("POST")
        .uri("/api/documents")
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap();
    send(router, request).await
}

#[tokio::test]
async fn upload_stores_document_without_returning_content() {
    let router = router(state_with_mock(vec![document_analysis_json()]));

    let response = upload(&router, "report.txt", "季度总结正文", "u1").await;
    assert_status(&response, StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["document"]["title"], "测试文档");
    assert_eq!(body["document"]["file_name"], "report.txt");
    assert!(body["document"].get("original_content").is_none());
}

#[tokio::test]
async fn upload_rejects_content_over_char_limit() {
    let router = router(state_with_mock(vec![document_analysis_json()]));

    let oversized = "字".repeat(200_001);
    let response = upload(&router, "big.txt", &oversized, "u1").await;
    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_accepts_content_at_char_limit() {
    let router = router(state_with_mock(vec![document_analysis_json()]));

    let boundary_content = "a".repeat(200_000);
    let response = upload(&router, "exact.txt", &boundary_content, "u1").await;
    assert_status(&response, StatusCode::OK);
}

#[tokio::test]
async fn upload_requires_file_and_user() {
    let router = router(state_with_mock(vec![document_analysis_json()]));

    let (content_type, _) = multipart_upload("XBOUNDARYX", "a.txt", "text", "u1");
    // user_id part only, no file part.
    let body =
        "--XBOUNDARYX\r\nContent-Disposition: form-data; name=\"user_id\"\r\n\r\nu1\r\n--XBOUNDARYX--\r\n"
            .to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/api/documents")
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap();
    let response = send(&router, request).await;
    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn detail_includes_content_but_listing_does_not() {
    let router = router(state_with_mock(vec![document_analysis_json()]));
    let created = upload(&router, "plan.md", "完整正文", "u1").await;
    let id = body_json(created).await["document"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let listed = get(&router, "/api/documents?user_id=u1").await;
    assert_status(&listed, StatusCode::OK);
    let body = body_json(listed).await;
    assert_eq!(body["total"], 1);
    assert!(body["documents"][0].get("original_content").is_none());

    let detail = get(&router, &format!("/api/documents/{}", id)).await;
    assert_status(&detail, StatusCode::OK);
    assert_eq!(body_json(detail).await["original_content"], "完整正文");
}

#[tokio::test]
async fn update_and_delete_document() {
    let router = router(state_with_mock(vec![document_analysis_json()]));
    let created = upload(&router, "plan.md", "原始正文", "u1").await;
    let id = body_json(created).await["document"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/documents/{}", id))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "content": "修订正文" }).to_string()))
        .unwrap();
    let updated = send(&router, request).await;
    assert_status(&updated, StatusCode::OK);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/documents/{}", id))
        .body(Body::empty())
        .unwrap();
    let deleted = send(&router, request).await;
    assert_status(&deleted, StatusCode::OK);

    let missing = get(&router, &format!("/api/documents/{}", id)).await;
    assert_status(&missing, StatusCode::NOT_FOUND);
}
