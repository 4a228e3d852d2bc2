//! Events that drive a diary session

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The user wrote something
    Submit { text: String },

    /// The remote call for `epoch` returned; `None` when it carried no text
    ReplyReceived { epoch: u64, text: Option<String> },

    /// The remote call for `epoch` failed or timed out
    ReplyFailed { epoch: u64, message: String },

    /// The user burned the pages
    Clear,
}
