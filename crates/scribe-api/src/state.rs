//! Shared application state.

use std::sync::Arc;

use scribe_inference::Analyzer;
use scribe_store::Store;

use crate::config::ApiConfig;
use crate::error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository bundle (in-memory stand-in behind the core traits).
    pub store: Store,
    /// Content analyzer; None when no DeepSeek credential is configured.
    pub analyzer: Option<Arc<Analyzer>>,
    /// Resolved server configuration.
    pub config: Arc<ApiConfig>,
}

impl AppState {
    /// The analyzer, or a missing-configuration error when the feature is
    /// disabled.
    pub fn analyzer(&self) -> Result<&Arc<Analyzer>, ApiError> {
        self.analyzer
            .as_ref()
            .ok_or_else(|| ApiError::ServiceUnavailable("AI服务未配置".to_string()))
    }
}
