//! Diary turns

use crate::llm::{LlmMessage, MessageRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Turn identifier, increasing in creation order within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(u64);

impl TurnId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who wrote a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// The person writing in the diary
    Local,
    /// The persona answering from the pages
    Remote,
}

impl Sender {
    /// Role this sender takes in a completion request
    pub fn request_role(self) -> MessageRole {
        match self {
            Sender::Local => MessageRole::User,
            Sender::Remote => MessageRole::Model,
        }
    }
}

/// One entry in the diary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub id: TurnId,
    pub sender: Sender,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(id: TurnId, sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id,
            sender,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn to_llm_message(&self) -> LlmMessage {
        LlmMessage {
            role: self.sender.request_role(),
            text: self.text.clone(),
        }
    }
}
