//! Completion service construction from the environment

use super::{GeminiModel, GeminiService, LlmError, LlmService, LoggingService};
use std::sync::Arc;

/// Configuration for the completion provider
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub gemini_api_key: Option<String>,
    /// Gateway URL that replaces the public Gemini endpoint
    pub gateway: Option<String>,
    /// Default model ID
    pub default_model: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("API_KEY"))
                .ok(),
            gateway: std::env::var("LLM_GATEWAY").ok(),
            default_model: std::env::var("DEFAULT_MODEL").ok(),
        }
    }

    /// Key handed to the provider; empty when no credential is configured.
    ///
    /// In gateway mode the gateway authenticates, so "implicit" stands in.
    fn api_key(&self) -> String {
        if self.gateway.is_some() {
            return "implicit".to_string();
        }
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string()
    }

    fn model(&self) -> GeminiModel {
        match self.default_model.as_deref() {
            None => GeminiModel::Gemini25Flash,
            Some(name) => GeminiModel::from_api_name(name).unwrap_or_else(|| {
                tracing::warn!(model = %name, "Unknown model requested, using gemini-2.5-flash");
                GeminiModel::Gemini25Flash
            }),
        }
    }
}

/// The configured completion service
///
/// A service is always built, even without a key. It then reports
/// `has_credential() == false` and callers answer with their canned text.
pub struct ModelRegistry {
    service: Arc<dyn LlmService>,
}

impl ModelRegistry {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let gemini =
            GeminiService::new(config.api_key(), config.model(), config.gateway.as_deref())?;
        Ok(Self {
            service: Arc::new(LoggingService::new(Arc::new(gemini))),
        })
    }

    pub fn service(&self) -> Arc<dyn LlmService> {
        self.service.clone()
    }

    pub fn has_credential(&self) -> bool {
        self.service.has_credential()
    }

    pub fn model_id(&self) -> &str {
        self.service.model_id()
    }
}
