//! Page body builders.
//!
//! Notion page requests are deeply nested JSON; these helpers keep the
//! handlers free of block plumbing. Property names match the schema
//! provisioned by [`crate::NotionClient::create_notes_database`], except for
//! the chat report body, which maps onto whatever properties the target
//! database actually has.

use serde_json::{json, Value as JsonValue};

use scribe_core::{ChatReport, DiaryEntry, Document, MonthlyReport, MonthlySummary, Note};

use crate::client::DatabaseInfo;

// =============================================================================
// BLOCK BUILDERS
// =============================================================================

pub fn heading_1(text: &str) -> JsonValue {
    json!({
        "object": "block",
        "type": "heading_1",
        "heading_1": { "rich_text": [{ "text": { "content": text } }] },
    })
}

pub fn heading_2(text: &str) -> JsonValue {
    json!({
        "object": "block",
        "type": "heading_2",
        "heading_2": { "rich_text": [{ "text": { "content": text } }] },
    })
}

pub fn paragraph(text: &str) -> JsonValue {
    json!({
        "object": "block",
        "type": "paragraph",
        "paragraph": { "rich_text": [{ "text": { "content": text } }] },
    })
}

pub fn bulleted_item(text: &str) -> JsonValue {
    json!({
        "object": "block",
        "type": "bulleted_list_item",
        "bulleted_list_item": { "rich_text": [{ "text": { "content": text } }] },
    })
}

pub fn quote(text: &str) -> JsonValue {
    json!({
        "object": "block",
        "type": "quote",
        "quote": { "rich_text": [{ "text": { "content": text } }] },
    })
}

pub fn code_block(text: &str, language: &str) -> JsonValue {
    json!({
        "object": "block",
        "type": "code",
        "code": {
            "rich_text": [{ "type": "text", "text": { "content": text } }],
            "language": language,
        },
    })
}

// =============================================================================
// PAGE BODIES
// =============================================================================

/// Diary entry page (WeChat channel).
pub fn diary_page_body(database_id: &str, entry: &DiaryEntry) -> JsonValue {
    let mut children = vec![
        heading_2("📝 内容摘要"),
        paragraph(&entry.analysis.summary),
        heading_2("✨ 结构化内容"),
        paragraph(&entry.analysis.structured_content),
        heading_2("💭 深度洞察"),
    ];
    children.extend(entry.analysis.insights.iter().map(|i| bulleted_item(i)));
    children.push(heading_2("📱 原始内容"));
    children.push(quote(&entry.original_content));

    json!({
        "parent": { "database_id": database_id },
        "properties": {
            "标题": { "title": [{ "text": { "content": entry.analysis.title } }] },
            "分类": { "select": { "name": entry.analysis.category } },
            "情绪": { "select": { "name": entry.analysis.emotion } },
            "心情指数": { "number": entry.analysis.mood_score },
            "关键词": {
                "multi_select": entry
                    .analysis
                    .keywords
                    .iter()
                    .map(|k| json!({ "name": k }))
                    .collect::<Vec<_>>()
            },
            "日期": { "date": { "start": entry.created_at.format("%Y-%m-%d").to_string() } },
            "来源": { "select": { "name": "微信" } },
        },
        "children": children,
    })
}

/// Note page in the provisioned notes database.
pub fn note_page_body(database_id: &str, note: &Note) -> JsonValue {
    let mut children = vec![heading_2("📝 内容摘要"), paragraph(&note.analysis.summary)];
    if !note.analysis.action_items.is_empty() {
        children.push(heading_2("✅ 行动项"));
        children.extend(note.analysis.action_items.iter().map(|a| bulleted_item(a)));
    }
    if !note.analysis.insights.is_empty() {
        children.push(heading_2("💭 深度洞察"));
        children.extend(note.analysis.insights.iter().map(|i| bulleted_item(i)));
    }
    children.push(heading_2("📱 原始内容"));
    children.push(quote(&note.original_content));

    json!({
        "parent": { "database_id": database_id },
        "properties": {
            "标题": { "title": [{ "text": { "content": note.analysis.title } }] },
            "分类": { "select": { "name": note.analysis.category.as_str() } },
            "标签": {
                "multi_select": note
                    .analysis
                    .tags
                    .iter()
                    .map(|t| json!({ "name": t }))
                    .collect::<Vec<_>>()
            },
            "优先级": { "select": { "name": note.analysis.priority.as_str() } },
            "创建日期": { "date": { "start": note.created_at.format("%Y-%m-%d").to_string() } },
            "类型": { "select": { "name": "笔记" } },
        },
        "children": children,
    })
}

/// Document page in the provisioned notes database.
pub fn document_page_body(database_id: &str, document: &Document) -> JsonValue {
    let mut children = vec![
        heading_2("📝 内容摘要"),
        paragraph(&document.analysis.summary),
    ];
    if !document.analysis.key_points.is_empty() {
        children.push(heading_2("📌 关键要点"));
        children.extend(document.analysis.key_points.iter().map(|k| bulleted_item(k)));
    }
    if !document.analysis.action_items.is_empty() {
        children.push(heading_2("✅ 行动项"));
        children.extend(
            document
                .analysis
                .action_items
                .iter()
                .map(|a| bulleted_item(a)),
        );
    }

    json!({
        "parent": { "database_id": database_id },
        "properties": {
            "标题": { "title": [{ "text": { "content": document.analysis.title } }] },
            "分类": { "select": { "name": document.analysis.category.as_str() } },
            "标签": {
                "multi_select": document
                    .analysis
                    .tags
                    .iter()
                    .map(|t| json!({ "name": t }))
                    .collect::<Vec<_>>()
            },
            "创建日期": { "date": { "start": document.created_at.format("%Y-%m-%d").to_string() } },
            "类型": { "select": { "name": "文档" } },
        },
        "children": children,
    })
}

/// Chat report page, mapped onto the target database's actual properties.
///
/// The title property is found by type; 朋友/日期/情感 properties are matched
/// by name fragment and skipped when absent, so reports land in databases the
/// user created by hand.
pub fn chat_page_body(database: &DatabaseInfo, report: &ChatReport) -> JsonValue {
    let mut properties = serde_json::Map::new();

    for (name, kind) in &database.properties {
        match kind.as_str() {
            "title" => {
                properties.insert(
                    name.clone(),
                    json!({
                        "title": [{ "text": { "content": format!("{} - {}", report.date, report.friend) } }]
                    }),
                );
            }
            "rich_text" if name.contains("朋友") => {
                properties.insert(
                    name.clone(),
                    json!({ "rich_text": [{ "text": { "content": report.friend } }] }),
                );
            }
            "date" if name.contains("日期") => {
                properties.insert(
                    name.clone(),
                    json!({ "date": { "start": chrono::Utc::now().format("%Y-%m-%d").to_string() } }),
                );
            }
            "multi_select" if name.contains("情感") => {
                properties.insert(
                    name.clone(),
                    json!({
                        "multi_select": report
                            .emotions
                            .iter()
                            .map(|e| json!({ "name": e }))
                            .collect::<Vec<_>>()
                    }),
                );
            }
            _ => {}
        }
    }

    json!({
        "parent": { "database_id": database.id },
        "properties": properties,
        "children": [
            heading_2("故事叙述"),
            paragraph(&report.narrative),
            heading_2("原始聊天记录"),
            code_block(&report.original_chat, "plain text"),
        ],
    })
}

/// Monthly report page over notes and documents.
pub fn monthly_report_page_body(database_id: &str, report: &MonthlyReport) -> JsonValue {
    let mut children = vec![
        heading_1(&report.analysis.title),
        paragraph(&report.analysis.summary),
        heading_2("数据统计"),
        bulleted_item(&format!("笔记：{} 篇", report.statistics.total_notes)),
        bulleted_item(&format!("文档：{} 份", report.statistics.total_documents)),
        bulleted_item(&format!("最活跃的一天:{}", report.statistics.most_active_day)),
        heading_2("本月亮点"),
    ];
    children.extend(report.analysis.highlights.iter().map(|h| bulleted_item(h)));
    children.push(heading_2("下月行动计划"));
    children.extend(report.analysis.action_items.iter().map(|a| bulleted_item(a)));

    json!({
        "parent": { "database_id": database_id },
        "properties": {
            "标题": { "title": [{ "text": { "content": report.analysis.title } }] },
            "类型": { "select": { "name": "月报" } },
            "创建日期": {
                "date": { "start": format!("{}-{:02}-01", report.year, report.month) }
            },
        },
        "children": children,
    })
}

/// Monthly chat summary page.
pub fn monthly_summary_page_body(
    database_id: &str,
    year: i32,
    month: u32,
    summary: &MonthlySummary,
) -> JsonValue {
    let mut children = vec![
        heading_1(&format!("{}年{}月聊天总结", year, month)),
        paragraph(&summary.summary),
        heading_2("数据统计"),
        bulleted_item(&format!("总聊天记录：{} 条", summary.total_chats)),
        heading_2("重要时刻"),
    ];
    children.extend(summary.highlights.iter().map(|h| bulleted_item(h)));

    json!({
        "parent": { "database_id": database_id },
        "properties": {
            "标题": { "title": [{ "text": { "content": format!("{}年{}月总结", year, month) } }] },
            "类型": { "select": { "name": "月度总结" } },
            "日期": { "date": { "start": format!("{}-{:02}-01", year, month) } },
        },
        "children": children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use scribe_core::{Category, ChatMessage, DiaryAnalysis, NoteAnalysis, Priority};

    #[test]
    fn diary_page_pins_properties_and_sections() {
        let entry = DiaryEntry {
            user_id: "u1".to_string(),
            original_content: "今天很开心".to_string(),
            analysis: DiaryAnalysis {
                title: "开心的一天".to_string(),
                summary: "摘要".to_string(),
                emotion: "开心".to_string(),
                keywords: vec!["开心".to_string()],
                category: "生活".to_string(),
                mood_score: 8,
                structured_content: "结构化".to_string(),
                insights: vec!["洞察".to_string()],
            },
            created_at: Utc::now(),
            processed_at: Utc::now(),
        };

        let body = diary_page_body("db-1", &entry);
        assert_eq!(body["parent"]["database_id"], "db-1");
        assert_eq!(body["properties"]["心情指数"]["number"], 8);
        assert_eq!(body["properties"]["来源"]["select"]["name"], "微信");
        let children = body["children"].as_array().unwrap();
        // 4 section headings + summary + structured + 1 insight + quote
        assert_eq!(children.len(), 8);
    }

    #[test]
    fn note_page_uses_enum_labels() {
        let note = Note::new(
            "u1".to_string(),
            "内容".to_string(),
            NoteAnalysis {
                title: "标题".to_string(),
                summary: "摘要".to_string(),
                category: Category::Work,
                tags: vec!["a".to_string()],
                priority: Priority::High,
                action_items: vec![],
                insights: vec![],
            },
        );

        let body = note_page_body("db-1", &note);
        assert_eq!(body["properties"]["分类"]["select"]["name"], "工作");
        assert_eq!(body["properties"]["优先级"]["select"]["name"], "高");
        assert_eq!(body["properties"]["类型"]["select"]["name"], "笔记");
    }

    #[test]
    fn chat_page_maps_dynamic_properties() {
        let database = DatabaseInfo {
            id: "db-2".to_string(),
            title: "微信聊天日记".to_string(),
            properties: vec![
                ("标题".to_string(), "title".to_string()),
                ("朋友".to_string(), "rich_text".to_string()),
                ("日期".to_string(), "date".to_string()),
                ("情感标签".to_string(), "multi_select".to_string()),
                ("状态".to_string(), "select".to_string()),
            ],
        };
        let report = ChatReport {
            date: "2026/08/08".to_string(),
            friend: "小明".to_string(),
            original_chat: "小明 10:30\n你好".to_string(),
            narrative: "叙述".to_string(),
            emotions: vec!["温馨".to_string()],
            messages: vec![ChatMessage {
                sender: "小明".to_string(),
                time: "10:30".to_string(),
                content: "你好".to_string(),
            }],
        };

        let body = chat_page_body(&database, &report);
        let properties = body["properties"].as_object().unwrap();
        assert!(properties.contains_key("标题"));
        assert!(properties.contains_key("朋友"));
        assert!(properties.contains_key("情感标签"));
        // Unmatched select property is left alone.
        assert!(!properties.contains_key("状态"));
        assert_eq!(
            body["properties"]["标题"]["title"][0]["text"]["content"],
            "2026/08/08 - 小明"
        );
    }

    #[test]
    fn chat_page_with_no_matching_properties_still_builds() {
        let database = DatabaseInfo {
            id: "db-3".to_string(),
            title: "空库".to_string(),
            properties: vec![],
        };
        let report = ChatReport {
            date: "2026/08/08".to_string(),
            friend: "小明".to_string(),
            original_chat: String::new(),
            narrative: String::new(),
            emotions: vec![],
            messages: vec![],
        };

        let body = chat_page_body(&database, &report);
        assert!(body["properties"].as_object().unwrap().is_empty());
        assert_eq!(body["children"].as_array().unwrap().len(), 4);
    }
}
