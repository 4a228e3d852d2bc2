//! Tom Riddle's diary
//!
//! An ephemeral, in-memory conversation with a persona. Implements the Elm
//! Architecture pattern: a pure transition function decides, the controller
//! performs the I/O.

mod controller;
mod effect;
mod event;
mod registry;
mod state;
mod store;
pub(crate) mod transition;
mod turn;

#[cfg(test)]
mod proptests;

pub use controller::{Admission, SessionController, DEFAULT_REPLY_TIMEOUT};
pub use effect::Effect;
pub use event::SessionEvent;
pub use registry::{SessionRegistry, DEFAULT_IDLE_EXPIRY};
pub use state::{SessionContext, SessionState};
pub use store::ConversationStore;
pub use turn::{Sender, Turn, TurnId};
