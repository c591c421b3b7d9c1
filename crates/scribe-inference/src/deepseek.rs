//! DeepSeek (OpenAI-compatible) generation backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use scribe_core::{defaults, Error, GenerationBackend, Result};

/// Configuration for the DeepSeek backend.
#[derive(Debug, Clone)]
pub struct DeepSeekConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key for authentication.
    pub api_key: String,
    /// Model to use for generation.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl DeepSeekConfig {
    /// Read configuration from the environment.
    ///
    /// Fails with a configuration error when `DEEPSEEK_API_KEY` is absent;
    /// the caller decides whether that disables the analyzer feature or
    /// aborts the operation.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("DEEPSEEK_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("DEEPSEEK_API_KEY is not configured".to_string()))?;

        Ok(Self {
            base_url: std::env::var("DEEPSEEK_BASE_URL")
                .unwrap_or_else(|_| defaults::DEEPSEEK_URL.to_string()),
            api_key,
            model: std::env::var("DEEPSEEK_MODEL")
                .unwrap_or_else(|_| defaults::GEN_MODEL.to_string()),
            timeout_seconds: std::env::var("DEEPSEEK_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::GEN_TIMEOUT_SECS),
        })
    }
}

/// DeepSeek chat-completions backend.
pub struct DeepSeekBackend {
    client: Client,
    config: DeepSeekConfig,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl DeepSeekBackend {
    /// Create a new backend with the given configuration.
    pub fn new(config: DeepSeekConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing DeepSeek backend: url={}, model={}",
            config.base_url, config.model
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(DeepSeekConfig::from_env()?)
    }

    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
        };

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ApiErrorResponse>()
                .await
                .map(|b| b.error.message)
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Inference(format!(
                "DeepSeek returned {}: {}",
                status, message
            )));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        let content = result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Inference("DeepSeek returned no choices".to_string()))?;

        debug!(response_len = content.len(), "generation complete");
        Ok(content)
    }
}

#[async_trait]
impl GenerationBackend for DeepSeekBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "generating"
        );

        let mut messages = Vec::new();
        if !system.is_empty() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });

        self.chat(messages).await
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_from_explicit_config() {
        let backend = DeepSeekBackend::new(DeepSeekConfig {
            base_url: "https://api.deepseek.com".to_string(),
            api_key: "sk-test".to_string(),
            model: "deepseek-chat".to_string(),
            timeout_seconds: 5,
        })
        .unwrap();
        assert_eq!(backend.model_name(), "deepseek-chat");
    }

    #[test]
    fn trailing_slash_in_base_url_is_tolerated() {
        let config = DeepSeekConfig {
            base_url: "https://api.deepseek.com/".to_string(),
            api_key: "sk-test".to_string(),
            model: "deepseek-chat".to_string(),
            timeout_seconds: 5,
        };
        let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        assert_eq!(url, "https://api.deepseek.com/chat/completions");
    }
}
