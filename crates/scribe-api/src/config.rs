//! Environment-driven server configuration.
//!
//! Absence of a credential disables the corresponding feature rather than
//! failing startup: no DeepSeek key means no analyzer, no OAuth app means no
//! authorization flow, no integration token means no server-level Notion
//! sync. `/api/config-status` reports what ended up enabled.

use std::sync::Arc;

use scribe_notion::NotionOAuth;

use scribe_core::defaults;

/// Resolved server configuration.
pub struct ApiConfig {
    /// Public base URL, used in auth links and the OAuth redirect URI.
    pub public_base_url: String,
    /// Shared secret for the WeChat signature check.
    pub wechat_token: String,
    /// Server-level Notion integration token (non-OAuth deployments).
    pub notion_api_key: Option<String>,
    /// Server-level Notion database id.
    pub notion_database_id: Option<String>,
    /// OAuth app credentials, when configured.
    pub oauth: Option<Arc<NotionOAuth>>,
    /// Listen port.
    pub port: u16,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| format!("http://localhost:{}", defaults::SERVER_PORT));

        let oauth = NotionOAuth::from_env(&public_base_url).map(Arc::new);

        Self {
            wechat_token: std::env::var("WECHAT_TOKEN")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "your_wechat_token".to_string()),
            notion_api_key: std::env::var("NOTION_API_KEY").ok().filter(|v| !v.is_empty()),
            notion_database_id: std::env::var("NOTION_DATABASE_ID")
                .ok()
                .filter(|v| !v.is_empty()),
            oauth,
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults::SERVER_PORT),
            public_base_url,
        }
    }

    /// Server-level Notion sync is available only with both the integration
    /// token and a target database.
    pub fn notion_configured(&self) -> bool {
        self.notion_api_key.is_some() && self.notion_database_id.is_some()
    }
}
