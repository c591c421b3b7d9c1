//! WeChat official-account webhook.
//!
//! Inbound transport is the fixed XML envelope with CDATA-wrapped fields;
//! replies reuse the same envelope shape. The GET challenge verifies the
//! shared-secret signature: SHA-1 over the sorted `[token, timestamp, nonce]`
//! concatenation must equal the provided signature.

use std::sync::OnceLock;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use regex::Regex;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use tracing::{info, warn};

use scribe_core::DiaryEntry;
use scribe_notion::{blocks, NotionClient};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ChallengeQuery {
    pub signature: Option<String>,
    pub timestamp: Option<String>,
    pub nonce: Option<String>,
    pub echostr: Option<String>,
}

/// Extracted fields of an inbound message envelope.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct InboundMessage {
    pub msg_type: String,
    pub content: String,
    pub from_user: String,
    pub to_user: String,
    pub create_time: i64,
    pub event: String,
}

// =============================================================================
// SIGNATURE
// =============================================================================

/// Check the challenge signature: hex SHA-1 of the sorted concatenation of
/// token, timestamp, and nonce.
pub(crate) fn verify_signature(
    token: &str,
    signature: &str,
    timestamp: &str,
    nonce: &str,
) -> bool {
    let mut parts = [token, timestamp, nonce];
    parts.sort_unstable();

    let mut sha = Sha1::new();
    sha.update(parts.join(""));
    let expected = hex::encode(sha.finalize());
    expected.eq_ignore_ascii_case(signature)
}

// =============================================================================
// XML ENVELOPE
// =============================================================================

fn cdata_field<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    // The envelope is a fixed tag set; regex extraction over CDATA is the
    // transport contract, not general XML parsing.
    let pattern = format!(r"<{tag}><!\[CDATA\[(.+?)\]\]></{tag}>", tag = tag);
    Regex::new(&pattern)
        .ok()?
        .captures(xml)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn create_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<CreateTime>(\d+)</CreateTime>").expect("create time regex"))
}

pub(crate) fn parse_envelope(xml: &str) -> InboundMessage {
    InboundMessage {
        msg_type: cdata_field(xml, "MsgType").unwrap_or_default().to_string(),
        content: cdata_field(xml, "Content").unwrap_or_default().to_string(),
        from_user: cdata_field(xml, "FromUserName")
            .unwrap_or_default()
            .to_string(),
        to_user: cdata_field(xml, "ToUserName")
            .unwrap_or_default()
            .to_string(),
        create_time: create_time_re()
            .captures(xml)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0),
        event: cdata_field(xml, "Event").unwrap_or_default().to_string(),
    }
}

/// Text reply in the same envelope shape, addressed back to the sender.
pub(crate) fn reply_xml(to_user: &str, from_user: &str, content: &str) -> String {
    format!(
        "<xml>\n  <ToUserName><![CDATA[{}]]></ToUserName>\n  <FromUserName><![CDATA[{}]]></FromUserName>\n  <CreateTime>{}</CreateTime>\n  <MsgType><![CDATA[text]]></MsgType>\n  <Content><![CDATA[{}]]></Content>\n</xml>",
        to_user,
        from_user,
        Utc::now().timestamp(),
        content
    )
}

fn xml_response(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/xml")],
        body,
    )
        .into_response()
}

// =============================================================================
// HANDLERS
// =============================================================================

/// GET challenge: echo `echostr` when the signature checks out.
///
/// # Returns
/// - 200 OK with `echostr` on a valid signature
/// - 400 Bad Request on missing parameters
/// - 403 Forbidden on signature mismatch
pub async fn verify_webhook(
    State(state): State<AppState>,
    Query(query): Query<ChallengeQuery>,
) -> Response {
    let (Some(signature), Some(timestamp), Some(nonce), Some(echostr)) = (
        query.signature.as_deref(),
        query.timestamp.as_deref(),
        query.nonce.as_deref(),
        query.echostr,
    ) else {
        return (StatusCode::BAD_REQUEST, "Missing parameters").into_response();
    };

    if verify_signature(&state.config.wechat_token, signature, timestamp, nonce) {
        (StatusCode::OK, echostr).into_response()
    } else {
        warn!("WeChat challenge signature mismatch");
        (StatusCode::FORBIDDEN, "Invalid signature").into_response()
    }
}

/// POST messages: text from authorized users flows through the diary
/// pipeline into Notion; everyone else gets guidance replies.
pub async fn receive_message(State(state): State<AppState>, body: String) -> Response {
    let message = parse_envelope(&body);

    match message.msg_type.as_str() {
        "text" if !message.content.is_empty() => {
            handle_text(&state, &message).await
        }
        "event" if message.event == "subscribe" => {
            let welcome = format!(
                "🎉 欢迎关注微信日记AI！\n\n我可以帮您将日常想法自动转化为结构化日记，并保存到Notion。\n\n请先授权连接您的Notion：\n{}/auth/notion?user_id={}\n\n授权后，直接发送文字给我，我会自动生成包含标题、摘要、情绪、关键词的日记！",
                state.config.public_base_url, message.from_user
            );
            xml_response(reply_xml(&message.from_user, &message.to_user, &welcome))
        }
        _ => (StatusCode::OK, "success").into_response(),
    }
}

async fn handle_text(state: &AppState, message: &InboundMessage) -> Response {
    let auth = match state.store.notion_auth.get(&message.from_user).await {
        Ok(auth) => auth,
        Err(err) => {
            warn!(error = %err, "credential lookup failed");
            None
        }
    };

    let Some(auth) = auth else {
        let reply = format!(
            "📝 欢迎使用微信日记AI！\n\n请先授权连接您的Notion：\n{}/auth/notion?user_id={}\n\n授权完成后，您就可以直接发送文字，我会自动帮您生成日记并保存到Notion！",
            state.config.public_base_url, message.from_user
        );
        return xml_response(reply_xml(&message.from_user, &message.to_user, &reply));
    };

    match process_diary(state, message, &auth).await {
        Ok(()) => {
            let preview: String = message.content.chars().take(50).collect();
            let ellipsis = if message.content.chars().count() > 50 {
                "..."
            } else {
                ""
            };
            let reply = format!(
                "✅ 日记已生成并保存到您的Notion！\n\n📖 内容：{}{}\n\n您可以在Notion中查看完整的结构化日记。",
                preview, ellipsis
            );
            xml_response(reply_xml(&message.from_user, &message.to_user, &reply))
        }
        Err(err) => {
            warn!(user = %message.from_user, error = %err, "diary pipeline failed");
            let reply = "❌ 处理失败，请稍后重试。\n\n如果问题持续，请重新授权Notion连接。";
            xml_response(reply_xml(&message.from_user, &message.to_user, reply))
        }
    }
}

async fn process_diary(
    state: &AppState,
    message: &InboundMessage,
    auth: &scribe_core::NotionAuth,
) -> scribe_core::Result<()> {
    let analyzer = state
        .analyzer
        .as_ref()
        .ok_or_else(|| scribe_core::Error::Config("AI服务未配置".to_string()))?;
    let database_id = auth
        .database_id
        .as_deref()
        .ok_or_else(|| scribe_core::Error::Config("未绑定Notion数据库".to_string()))?;

    let now = Utc::now();
    let analysis = analyzer.analyze_diary(&message.content, now).await?;
    let entry = DiaryEntry {
        user_id: message.from_user.clone(),
        original_content: message.content.clone(),
        analysis,
        created_at: now,
        processed_at: Utc::now(),
    };

    let client = NotionClient::new(&auth.access_token)?;
    let page_id = client
        .create_page(blocks::diary_page_body(database_id, &entry))
        .await?;
    info!(user = %message.from_user, page_id = %page_id, "diary saved to Notion");
    Ok(())
}
