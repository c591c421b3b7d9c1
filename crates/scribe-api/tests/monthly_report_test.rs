//! Monthly report generation over the full router.

mod common;

use axum::http::StatusCode;
use chrono::{Datelike, Utc};
use serde_json::json;

use common::*;

fn report_analysis_json() -> &'static str {
    r#"{
        "title": "月度报告",
        "summary": "这个月记录稳定",
        "highlights": ["保持了记录习惯"],
        "insights": ["日常类内容偏多"],
        "action_items": ["下月整理标签"],
        "category_analysis": {
            "work": "工作记录不多",
            "study": "学习笔记稳定",
            "daily": "日常记录最多"
        }
    }"#
}

#[tokio::test]
async fn monthly_report_combines_local_statistics_with_analysis() {
    // First reply analyzes the created note; the report analysis follows and
    // repeats for the report call.
    let router = router(state_with_mock(vec![
        note_analysis_json(),
        report_analysis_json(),
    ]));

    let created = post_json(
        &router,
        "/api/notes",
        json!({ "content": "本月的第一条记录", "user_id": "u1" }),
    )
    .await;
    assert_status(&created, StatusCode::OK);

    let now = Utc::now();
    let response = post_json(
        &router,
        "/api/monthly-report",
        json!({ "user_id": "u1", "year": now.year(), "month": now.month() }),
    )
    .await;
    assert_status(&response, StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["report"]["title"], "月度报告");
    assert_eq!(body["report"]["statistics"]["total_notes"], 1);
    assert_eq!(body["report"]["statistics"]["total_documents"], 0);
    assert_eq!(body["report"]["statistics"]["category_breakdown"]["日常"], 1);
    assert_ne!(body["report"]["statistics"]["most_active_day"], "无数据");
}

#[tokio::test]
async fn monthly_report_for_empty_month_has_placeholder_day() {
    let router = router(state_with_mock(vec![report_analysis_json()]));

    let response = post_json(
        &router,
        "/api/monthly-report",
        json!({ "user_id": "u1", "year": 2020, "month": 1 }),
    )
    .await;
    assert_status(&response, StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["report"]["statistics"]["total_notes"], 0);
    assert_eq!(body["report"]["statistics"]["most_active_day"], "无数据");
}

#[tokio::test]
async fn monthly_report_rejects_invalid_month() {
    let router = router(state_with_mock(vec![report_analysis_json()]));
    let response = post_json(
        &router,
        "/api/monthly-report",
        json!({ "user_id": "u1", "year": 2026, "month": 13 }),
    )
    .await;
    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn monthly_summary_returns_analyzer_output() {
    let reply = r#"{
        "total_chats": 12,
        "top_friends": [
            { "name": "小明", "chat_count": 8, "main_topics": ["旅行"], "emotional_tone": "轻松" }
        ],
        "emotional_trends": [
            { "emotion": "温馨", "frequency": 6, "description": "日常关心" }
        ],
        "highlights": ["一起计划了旅行"],
        "word_cloud": [{ "word": "旅行", "frequency": 5 }],
        "summary": "这个月的对话温暖而充实",
        "insights": ["多和朋友见面"]
    }"#;
    let router = router(state_with_mock(vec![reply]));

    let response = post_json(
        &router,
        "/api/monthly-summary",
        json!({ "year": 2026, "month": 7, "reports": [{ "friend": "小明" }] }),
    )
    .await;
    assert_status(&response, StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_chats"], 12);
    assert_eq!(body["top_friends"][0]["name"], "小明");
}
