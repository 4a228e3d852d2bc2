//! API request and response types

use crate::diary::Turn;
use crate::house::House;
use serde::{Deserialize, Serialize};

/// Response for a freshly opened diary
#[derive(Debug, Serialize)]
pub struct DiaryOpenedResponse {
    pub id: String,
    /// Shown while the diary is empty
    pub greeting: &'static str,
}

/// Response with a diary and its turns
#[derive(Debug, Serialize)]
pub struct DiaryResponse {
    pub id: String,
    pub turns: Vec<Turn>,
    pub pending: bool,
}

/// Request to write in the diary
#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    pub text: String,
}

/// What happened to a diary entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOutcome {
    /// Written; the reply will appear in the diary
    Accepted,
    /// Blank entry, nothing written
    Ignored,
    /// A reply is still being written
    Busy,
}

/// Response for a diary entry
#[derive(Debug, Serialize, Deserialize)]
pub struct EntryResponse {
    pub outcome: EntryOutcome,
}

/// Request to generate a story
#[derive(Debug, Deserialize)]
pub struct StoryRequest {
    pub prompt: String,
    #[serde(default)]
    pub house: House,
}

/// Response with a generated story
#[derive(Debug, Serialize)]
pub struct StoryResponse {
    pub story: String,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
