//! Notion OAuth authorization-code exchange.

use std::time::Duration;

use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use scribe_core::{defaults, Error, Result};

/// Token bundle returned by the OAuth exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    pub workspace_id: Option<String>,
    pub workspace_name: Option<String>,
    pub bot_id: Option<String>,
}

/// OAuth client credentials. Absence of either id or secret disables the
/// OAuth feature rather than failing startup.
pub struct NotionOAuth {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl NotionOAuth {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(defaults::NOTION_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Notion(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        })
    }

    /// Build from the environment. Returns None when the OAuth app is not
    /// configured.
    pub fn from_env(public_base_url: &str) -> Option<Self> {
        let client_id = std::env::var("NOTION_CLIENT_ID").ok().filter(|v| !v.is_empty())?;
        let client_secret = std::env::var("NOTION_CLIENT_SECRET")
            .ok()
            .filter(|v| !v.is_empty())?;
        let redirect_uri = std::env::var("NOTION_REDIRECT_URI")
            .unwrap_or_else(|_| format!("{}/api/notion/callback", public_base_url));

        Self::new(client_id, client_secret, redirect_uri).ok()
    }

    /// Exchange an authorization code for an access token.
    ///
    /// The redirect URI must match the one used at authorization time
    /// exactly; Notion rejects the exchange otherwise.
    pub async fn exchange_code(&self, code: &str) -> Result<OAuthTokens> {
        let credentials = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.client_id, self.client_secret));

        let response = self
            .client
            .post(format!("{}/oauth/token", defaults::NOTION_API_URL))
            .header("Authorization", format!("Basic {}", credentials))
            .header("Content-Type", "application/json")
            .json(&json!({
                "grant_type": "authorization_code",
                "code": code,
                "redirect_uri": self.redirect_uri,
            }))
            .send()
            .await
            .map_err(|e| Error::Notion(format!("token exchange request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = body
                .get("error")
                .or_else(|| body.get("message"))
                .and_then(serde_json::Value::as_str)
                .unwrap_or("未知错误");
            return Err(Error::Notion(format!(
                "token exchange failed ({}): {}",
                status, message
            )));
        }

        let tokens: OAuthTokens = response
            .json()
            .await
            .map_err(|e| Error::Notion(format!("unreadable token response: {}", e)))?;

        info!(
            workspace = tokens.workspace_name.as_deref().unwrap_or("-"),
            "Notion OAuth exchange succeeded"
        );
        Ok(tokens)
    }
}
