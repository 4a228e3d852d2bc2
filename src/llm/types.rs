//! Common types for LLM interactions

/// LLM request
///
/// Prior turns travel in `history`; the new input is kept apart in
/// `message` and is always sent last.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    pub system: Option<String>,
    pub history: Vec<LlmMessage>,
    pub message: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl LlmRequest {
    /// Single-shot request with no prior turns
    pub fn prompt(message: impl Into<String>) -> Self {
        Self {
            system: None,
            history: vec![],
            message: message.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_history(mut self, history: Vec<LlmMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Message in conversation history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmMessage {
    pub role: MessageRole,
    pub text: String,
}

impl LlmMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            text: text.into(),
        }
    }

    #[allow(dead_code)] // Constructor for API completeness
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Model,
            text: text.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Model,
}

impl MessageRole {
    /// Role name on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Model => "model",
        }
    }
}

/// LLM response
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    /// Concatenated text parts, `None` when the service returned no text
    pub text: Option<String>,
    pub usage: Usage,
}

impl LlmResponse {
    #[allow(dead_code)] // Used by the mock service
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            usage: Usage::default(),
        }
    }

    /// The reply text, `None` when absent or whitespace only
    pub fn non_blank_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Usage statistics
#[derive(Debug, Clone, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
