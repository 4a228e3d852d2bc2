//! Session controller
//!
//! Executes the effects of the pure transition function against the
//! in-memory log and the completion service. The lock is never held across
//! the network await: a submission is split into a synchronous `begin`
//! (guard, optimistic append, request construction) and an async `finish`.

use super::transition::{transition, TransitionError};
use super::{
    ConversationStore, Effect, Sender, SessionContext, SessionEvent, SessionState, Turn, TurnId,
};
use crate::llm::{LlmMessage, LlmRequest, LlmService};
use crate::prompts::{diary_instruction, DIARY_MISSING_KEY, DIARY_TEMPERATURE};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::{timeout, Instant};

/// Default bound on a single remote call
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(60);

/// Whether `submit` took the message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Blank input; nothing changed
    Ignored,
    /// A reply is already being written; nothing changed
    Busy,
    /// The local turn is in the log and the reply is on its way
    Accepted,
}

/// Outcome of `begin`
#[derive(Debug)]
pub enum Submission {
    Ignored,
    Busy,
    Accepted(PendingReply),
}

/// A reply owed for an accepted submission; hand it to `finish`.
///
/// Dropping it unfinished (cancelled future, panicking task) records the
/// failure fallback so the session never stays pending.
#[must_use = "the session stays pending until the reply is finished"]
pub struct PendingReply {
    controller: SessionController,
    epoch: u64,
    source: ReplySource,
    settled: bool,
}

enum ReplySource {
    Remote(LlmRequest),
    /// No credential configured: answer with canned text, no I/O
    MissingCredential,
}

impl fmt::Debug for PendingReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingReply")
            .field("session_id", &self.controller.session_id())
            .field("epoch", &self.epoch)
            .field("settled", &self.settled)
            .finish_non_exhaustive()
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        tracing::warn!(
            session_id = %self.controller.session_id,
            epoch = self.epoch,
            "Reply abandoned before it arrived"
        );
        self.controller.record(SessionEvent::ReplyFailed {
            epoch: self.epoch,
            message: "Reply abandoned".to_string(),
        });
    }
}

/// What `finish` did with the reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The remote turn appended for this submission
    Replied(Turn),
    /// The log was cleared while the reply was being written
    Discarded,
}

struct Inner {
    state: SessionState,
    store: ConversationStore,
    epoch: u64,
    next_id: TurnId,
    touched: Instant,
}

impl Inner {
    fn append(&mut self, sender: Sender, text: String) -> Turn {
        let turn = Turn::new(self.next_id, sender, text);
        self.next_id = self.next_id.next();
        self.store.append(turn.clone());
        turn
    }
}

/// Drives request/response exchanges for one diary
#[derive(Clone)]
pub struct SessionController {
    session_id: Arc<str>,
    inner: Arc<Mutex<Inner>>,
    service: Arc<dyn LlmService>,
    reply_timeout: Duration,
}

impl SessionController {
    pub fn new(session_id: impl Into<String>, service: Arc<dyn LlmService>) -> Self {
        Self {
            session_id: Arc::from(session_id.into()),
            inner: Arc::new(Mutex::new(Inner {
                state: SessionState::Idle,
                store: ConversationStore::new(),
                epoch: 0,
                next_id: TurnId::new(1),
                touched: Instant::now(),
            })),
            service,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }

    pub fn with_reply_timeout(mut self, reply_timeout: Duration) -> Self {
        self.reply_timeout = reply_timeout;
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Owned copy of the log
    pub fn snapshot(&self) -> Vec<Turn> {
        self.lock().store.snapshot()
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    pub fn is_pending(&self) -> bool {
        self.state().is_pending()
    }

    /// Mark the view as still alive
    pub fn touch(&self) {
        self.lock().touched = Instant::now();
    }

    /// Time since the view last touched this diary
    pub fn idle_for(&self) -> Duration {
        self.lock().touched.elapsed()
    }

    /// Submit a message; the reply is written to the log in the background.
    ///
    /// Never fails: blank input and busy sessions are no-ops, and any
    /// service failure becomes a fallback turn. Must be called from within
    /// a tokio runtime.
    pub fn submit(&self, text: &str) -> Admission {
        match self.begin(text) {
            Submission::Ignored => Admission::Ignored,
            Submission::Busy => Admission::Busy,
            Submission::Accepted(pending) => {
                let diary = self.clone();
                tokio::spawn(async move {
                    diary.finish(pending).await;
                });
                Admission::Accepted
            }
        }
    }

    /// Submit and wait for the reply; `None` when the message was not taken
    #[cfg(test)]
    pub async fn exchange(&self, text: &str) -> Option<SubmitOutcome> {
        match self.begin(text) {
            Submission::Accepted(pending) => Some(self.finish(pending).await),
            Submission::Ignored | Submission::Busy => None,
        }
    }

    /// Validate, append the local turn and build the request
    pub fn begin(&self, text: &str) -> Submission {
        let mut inner = self.lock();
        let context = SessionContext::new(inner.epoch, inner.store.turns());
        let event = SessionEvent::Submit {
            text: text.to_string(),
        };

        let result = match transition(&inner.state, &context, event) {
            Ok(result) => result,
            Err(TransitionError::EmptyMessage) => {
                tracing::debug!(session_id = %self.session_id, "Ignoring blank diary entry");
                return Submission::Ignored;
            }
            Err(e) => {
                tracing::info!(session_id = %self.session_id, error = %e, "Rejecting diary entry");
                return Submission::Busy;
            }
        };

        inner.state = result.new_state;
        let mut request = None;
        for effect in result.effects {
            if let Some(owed) = self.apply(&mut inner, effect) {
                request = Some(owed);
            }
        }

        let Some((epoch, history, message)) = request else {
            // transition always pairs Submit with RequestReply
            tracing::error!(session_id = %self.session_id, "Submission produced no request");
            inner.state = SessionState::Idle;
            return Submission::Ignored;
        };

        let source = if self.service.has_credential() {
            ReplySource::Remote(
                LlmRequest::prompt(message)
                    .with_history(history)
                    .with_system(diary_instruction())
                    .with_temperature(DIARY_TEMPERATURE),
            )
        } else {
            tracing::warn!(
                session_id = %self.session_id,
                "No API key configured, diary stays silent"
            );
            ReplySource::MissingCredential
        };

        Submission::Accepted(PendingReply {
            controller: self.clone(),
            epoch,
            source,
            settled: false,
        })
    }

    /// Wait for the reply owed by `begin` and record it
    pub async fn finish(&self, mut pending: PendingReply) -> SubmitOutcome {
        let epoch = pending.epoch;

        let event = match &pending.source {
            ReplySource::MissingCredential => SessionEvent::ReplyReceived {
                epoch,
                text: Some(DIARY_MISSING_KEY.to_string()),
            },
            ReplySource::Remote(request) => {
                match timeout(self.reply_timeout, self.service.complete(request)).await {
                    Ok(Ok(response)) => SessionEvent::ReplyReceived {
                        epoch,
                        text: response.text,
                    },
                    Ok(Err(e)) => {
                        tracing::warn!(
                            session_id = %self.session_id,
                            error = %e,
                            "Diary reply failed"
                        );
                        SessionEvent::ReplyFailed {
                            epoch,
                            message: e.message,
                        }
                    }
                    Err(_) => {
                        tracing::warn!(
                            session_id = %self.session_id,
                            timeout_secs = self.reply_timeout.as_secs(),
                            "Diary reply timed out"
                        );
                        SessionEvent::ReplyFailed {
                            epoch,
                            message: "Reply timed out".to_string(),
                        }
                    }
                }
            }
        };

        pending.settled = true;
        self.record(event)
    }

    /// Feed a reply event through the transition and apply its effects
    fn record(&self, event: SessionEvent) -> SubmitOutcome {
        let mut inner = self.lock();
        let context = SessionContext::new(inner.epoch, inner.store.turns());
        let result = match transition(&inner.state, &context, event) {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(session_id = %self.session_id, error = %e, "Dropping reply");
                return SubmitOutcome::Discarded;
            }
        };

        inner.state = result.new_state;
        let before = inner.store.len();
        for effect in result.effects {
            self.apply(&mut inner, effect);
        }

        if inner.store.len() > before {
            inner
                .store
                .turns()
                .last()
                .cloned()
                .map_or(SubmitOutcome::Discarded, SubmitOutcome::Replied)
        } else {
            SubmitOutcome::Discarded
        }
    }

    /// Burn the pages. Does not cancel a reply in flight; that reply is
    /// discarded when it arrives.
    pub fn clear(&self) {
        let mut inner = self.lock();
        let context = SessionContext::new(inner.epoch, inner.store.turns());
        match transition(&inner.state, &context, SessionEvent::Clear) {
            Ok(result) => {
                inner.state = result.new_state;
                for effect in result.effects {
                    self.apply(&mut inner, effect);
                }
            }
            Err(e) => {
                tracing::error!(session_id = %self.session_id, error = %e, "Clear rejected");
            }
        }
    }

    /// Execute one effect; returns the request parameters for `RequestReply`
    fn apply(&self, inner: &mut Inner, effect: Effect) -> Option<(u64, Vec<LlmMessage>, String)> {
        match effect {
            Effect::AppendTurn { sender, text } => {
                let turn = inner.append(sender, text);
                tracing::debug!(
                    session_id = %self.session_id,
                    turn_id = %turn.id,
                    sender = ?turn.sender,
                    "Appended turn"
                );
                None
            }
            Effect::RequestReply {
                epoch,
                history,
                message,
            } => Some((epoch, history, message)),
            Effect::ResetConversation => {
                inner.store.reset();
                inner.epoch += 1;
                tracing::info!(session_id = %self.session_id, epoch = inner.epoch, "Diary cleared");
                None
            }
            Effect::DiscardReply { epoch } => {
                tracing::info!(
                    session_id = %self.session_id,
                    epoch,
                    "Discarding reply that arrived after a clear"
                );
                None
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The log stays consistent even if a holder panicked mid-append
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
