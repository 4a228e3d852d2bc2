//! Effects produced by state transitions

use super::turn::Sender;
use crate::llm::LlmMessage;

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a turn to the log
    AppendTurn { sender: Sender, text: String },

    /// Call the completion service with the prior turns and the new message
    RequestReply {
        epoch: u64,
        history: Vec<LlmMessage>,
        message: String,
    },

    /// Empty the log and start a new epoch
    ResetConversation,

    /// A reply arrived for a log that has since been cleared
    DiscardReply { epoch: u64 },
}

impl Effect {
    pub fn append_local(text: impl Into<String>) -> Self {
        Effect::AppendTurn {
            sender: Sender::Local,
            text: text.into(),
        }
    }

    pub fn append_remote(text: impl Into<String>) -> Self {
        Effect::AppendTurn {
            sender: Sender::Remote,
            text: text.into(),
        }
    }
}
