//! In-memory conversation log
//!
//! Append-only; the only removal is a full reset. Nothing is persisted.

use super::turn::Turn;

#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    turns: Vec<Turn>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn reset(&mut self) {
        self.turns.clear();
    }

    /// Owned copy of the current log; later appends do not show up in it
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[allow(dead_code)] // API completeness
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
