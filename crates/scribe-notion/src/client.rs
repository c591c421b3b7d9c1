//! Token-scoped Notion API client.

use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info};

use scribe_core::{defaults, Error, Result};

use crate::normalize_database_id;

/// Parent under which a database is provisioned.
#[derive(Debug, Clone)]
pub enum DatabaseParent {
    /// Workspace root (integration tokens with workspace access).
    Workspace,
    /// Under an existing page.
    Page(String),
}

/// Minimal view of a retrieved database.
#[derive(Debug, Clone)]
pub struct DatabaseInfo {
    pub id: String,
    pub title: String,
    /// Property name → property type (e.g. "标题" → "title").
    pub properties: Vec<(String, String)>,
}

/// Result of a database provisioning call.
#[derive(Debug, Clone)]
pub struct CreatedDatabase {
    pub id: String,
    pub url: Option<String>,
    pub title: String,
}

/// Client bound to one access token. Integration tokens and per-user OAuth
/// tokens behave the same against the REST API.
pub struct NotionClient {
    client: Client,
    token: String,
}

impl NotionClient {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(defaults::NOTION_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Notion(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            token: token.into(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", defaults::NOTION_API_URL, path);
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", defaults::NOTION_VERSION)
            .header("Content-Type", "application/json")
    }

    /// Send a request and decode the body, mapping API errors to
    /// `Error::Notion` with the upstream code and message.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<JsonValue> {
        let response = req
            .send()
            .await
            .map_err(|e| Error::Notion(format!("request failed: {}", e)))?;

        let status = response.status();
        let body: JsonValue = response
            .json()
            .await
            .map_err(|e| Error::Notion(format!("unreadable response: {}", e)))?;

        if !status.is_success() {
            let code = body
                .get("code")
                .and_then(JsonValue::as_str)
                .unwrap_or("unknown");
            let message = body
                .get("message")
                .and_then(JsonValue::as_str)
                .unwrap_or("Unknown error");
            return Err(Error::Notion(format!("{} ({})", message, code)));
        }

        Ok(body)
    }

    /// Fetch the bot user behind this token. Used as a connectivity check
    /// before provisioning.
    pub async fn current_user(&self) -> Result<JsonValue> {
        self.send(self.request(reqwest::Method::GET, "/users/me"))
            .await
    }

    /// Retrieve a database, normalizing the id first.
    pub async fn retrieve_database(&self, database_id: &str) -> Result<DatabaseInfo> {
        let id = normalize_database_id(database_id);
        let body = self
            .send(self.request(reqwest::Method::GET, &format!("/databases/{}", id)))
            .await?;

        Ok(DatabaseInfo {
            id: body
                .get("id")
                .and_then(JsonValue::as_str)
                .unwrap_or(&id)
                .to_string(),
            title: database_title(&body),
            properties: body
                .get("properties")
                .and_then(JsonValue::as_object)
                .map(|props| {
                    props
                        .iter()
                        .map(|(name, prop)| {
                            let kind = prop
                                .get("type")
                                .and_then(JsonValue::as_str)
                                .unwrap_or("unknown");
                            (name.clone(), kind.to_string())
                        })
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    /// Find the first page visible to this token, for use as a database
    /// parent. Returns None when the integration sees no pages.
    pub async fn search_first_page(&self) -> Result<Option<String>> {
        let body = self
            .send(self.request(reqwest::Method::POST, "/search").json(&json!({
                "filter": { "value": "page", "property": "object" },
                "page_size": 1,
            })))
            .await?;

        Ok(body
            .get("results")
            .and_then(JsonValue::as_array)
            .and_then(|results| results.first())
            .and_then(|page| page.get("id"))
            .and_then(JsonValue::as_str)
            .map(str::to_string))
    }

    /// Provision the notes database with its fixed property schema.
    pub async fn create_notes_database(
        &self,
        parent: DatabaseParent,
        title: &str,
    ) -> Result<CreatedDatabase> {
        let parent_value = match &parent {
            DatabaseParent::Workspace => json!({ "type": "workspace", "workspace": true }),
            DatabaseParent::Page(page_id) => json!({ "type": "page_id", "page_id": page_id }),
        };

        let body = json!({
            "parent": parent_value,
            "title": [{ "type": "text", "text": { "content": title } }],
            "properties": {
                "标题": { "title": {} },
                "分类": {
                    "select": {
                        "options": [
                            { "name": "日常", "color": "blue" },
                            { "name": "工作", "color": "green" },
                            { "name": "学习", "color": "purple" },
                            { "name": "其他", "color": "gray" },
                        ]
                    }
                },
                "标签": {
                    "multi_select": {
                        "options": [
                            { "name": "重要", "color": "red" },
                            { "name": "待办", "color": "yellow" },
                            { "name": "已完成", "color": "green" },
                            { "name": "参考", "color": "blue" },
                        ]
                    }
                },
                "优先级": {
                    "select": {
                        "options": [
                            { "name": "高", "color": "red" },
                            { "name": "中", "color": "yellow" },
                            { "name": "低", "color": "gray" },
                        ]
                    }
                },
                "创建日期": { "date": {} },
                "类型": {
                    "select": {
                        "options": [
                            { "name": "笔记", "color": "blue" },
                            { "name": "文档", "color": "green" },
                            { "name": "月报", "color": "purple" },
                        ]
                    }
                },
            },
        });

        info!(parent = ?parent, title, "creating Notion database");
        let created = self
            .send(self.request(reqwest::Method::POST, "/databases").json(&body))
            .await?;

        Ok(CreatedDatabase {
            id: created
                .get("id")
                .and_then(JsonValue::as_str)
                .unwrap_or_default()
                .to_string(),
            url: created
                .get("url")
                .and_then(JsonValue::as_str)
                .map(str::to_string),
            title: database_title(&created),
        })
    }

    /// Create a page from a fully built request body. Returns the page id.
    pub async fn create_page(&self, body: JsonValue) -> Result<String> {
        let created = self
            .send(self.request(reqwest::Method::POST, "/pages").json(&body))
            .await?;

        let page_id = created
            .get("id")
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string();
        debug!(page_id = %page_id, "Notion page created");
        Ok(page_id)
    }
}

fn database_title(body: &JsonValue) -> String {
    body.get("title")
        .and_then(JsonValue::as_array)
        .and_then(|title| title.first())
        .and_then(|t| t.pointer("/text/content"))
        .and_then(JsonValue::as_str)
        .unwrap_or("智能笔记助手")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_title_reads_rich_text() {
        let body = json!({
            "title": [{ "type": "text", "text": { "content": "我的数据库" } }]
        });
        assert_eq!(database_title(&body), "我的数据库");
    }

    #[test]
    fn database_title_defaults_when_absent() {
        assert_eq!(database_title(&json!({})), "智能笔记助手");
    }

    #[test]
    fn client_construction_succeeds() {
        assert!(NotionClient::new("secret_token").is_ok());
    }
}
