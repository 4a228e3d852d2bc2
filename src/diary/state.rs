//! Session state types

use super::turn::Turn;
use serde::Serialize;

/// Submission state of a diary session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionState {
    /// No reply outstanding, new input accepted
    #[default]
    Idle,

    /// Exactly one remote call in flight, started during `epoch`
    Pending { epoch: u64 },
}

impl SessionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, SessionState::Pending { .. })
    }
}

/// Read-only inputs to a transition
#[derive(Debug, Clone, Copy)]
pub struct SessionContext<'a> {
    /// Bumped by every clear; replies from an older epoch are stale
    pub epoch: u64,
    /// The log as it stands before the event is applied
    pub turns: &'a [Turn],
}

impl<'a> SessionContext<'a> {
    pub fn new(epoch: u64, turns: &'a [Turn]) -> Self {
        Self { epoch, turns }
    }
}
