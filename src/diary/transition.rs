//! Pure state transition function
//!
//! Given the same state, context and event this always produces the same
//! result; all I/O happens in the controller that executes the effects.

use super::{Effect, SessionContext, SessionEvent, SessionState, Turn};
use crate::prompts::{DIARY_BLANK_REPLY, DIARY_FAILURE};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("A reply is still being written, cannot accept message")]
    Busy,
    #[error("Unexpected reply for epoch {epoch} in state {state:?}")]
    UnexpectedReply { epoch: u64, state: SessionState },
}

pub fn transition(
    state: &SessionState,
    context: &SessionContext<'_>,
    event: SessionEvent,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Validation comes first: blank input is a no-op in every state
        (_, SessionEvent::Submit { text }) if text.trim().is_empty() => {
            Err(TransitionError::EmptyMessage)
        }

        // Idle + Submit -> Pending. History is the log before the local
        // turn is appended; the new text travels separately.
        (SessionState::Idle, SessionEvent::Submit { text }) => {
            let message = text.trim().to_string();
            let history = context.turns.iter().map(Turn::to_llm_message).collect();
            Ok(
                TransitionResult::new(SessionState::Pending {
                    epoch: context.epoch,
                })
                .with_effect(Effect::append_local(message.clone()))
                .with_effect(Effect::RequestReply {
                    epoch: context.epoch,
                    history,
                    message,
                }),
            )
        }

        (SessionState::Pending { .. }, SessionEvent::Submit { .. }) => Err(TransitionError::Busy),

        (SessionState::Pending { epoch: pending }, SessionEvent::ReplyReceived { epoch, text })
            if *pending == epoch =>
        {
            let text = text
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DIARY_BLANK_REPLY.to_string());
            Ok(complete(epoch, context, text))
        }

        (SessionState::Pending { epoch: pending }, SessionEvent::ReplyFailed { epoch, .. })
            if *pending == epoch =>
        {
            Ok(complete(epoch, context, DIARY_FAILURE.to_string()))
        }

        (
            state,
            SessionEvent::ReplyReceived { epoch, .. } | SessionEvent::ReplyFailed { epoch, .. },
        ) => Err(TransitionError::UnexpectedReply {
            epoch,
            state: *state,
        }),

        // Clear never cancels the call in flight; the controller stays
        // Pending until it resolves, and its reply is then discarded.
        (state, SessionEvent::Clear) => {
            Ok(TransitionResult::new(*state).with_effect(Effect::ResetConversation))
        }
    }
}

/// Pending -> Idle, appending the reply unless the log was cleared meanwhile
fn complete(epoch: u64, context: &SessionContext<'_>, text: String) -> TransitionResult {
    let result = TransitionResult::new(SessionState::Idle);
    if epoch == context.epoch {
        result.with_effect(Effect::append_remote(text))
    } else {
        result.with_effect(Effect::DiscardReply { epoch })
    }
}
