//! Property-based tests for the diary session
//!
//! These tests verify key invariants hold across all possible inputs.

use super::transition::*;
use super::*;
use crate::llm::testing::MockLlmService;
use crate::llm::LlmMessage;
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

/// Applies effects the way the controller does, without I/O
#[derive(Default)]
struct Harness {
    state: SessionState,
    store: ConversationStore,
    epoch: u64,
    next_id: u64,
    requests: Vec<(u64, Vec<LlmMessage>, String)>,
}

impl Harness {
    fn step(&mut self, event: SessionEvent) -> Result<(), TransitionError> {
        let context = SessionContext::new(self.epoch, self.store.turns());
        let result = transition(&self.state, &context, event)?;
        self.state = result.new_state;
        for effect in result.effects {
            match effect {
                Effect::AppendTurn { sender, text } => {
                    self.next_id += 1;
                    self.store.append(Turn::new(TurnId::new(self.next_id), sender, text));
                }
                Effect::RequestReply {
                    epoch,
                    history,
                    message,
                } => self.requests.push((epoch, history, message)),
                Effect::ResetConversation => {
                    self.store.reset();
                    self.epoch += 1;
                }
                Effect::DiscardReply { .. } => {}
            }
        }
        Ok(())
    }

    fn pending_epoch(&self) -> Option<u64> {
        match self.state {
            SessionState::Pending { epoch } => Some(epoch),
            SessionState::Idle => None,
        }
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_message() -> impl Strategy<Value = String> {
    "[a-zA-Z?!. ]{0,12}[a-zA-Z?!.][a-zA-Z?!. ]{0,12}"
}

fn arb_messages() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(arb_message(), 1..8)
}

fn arb_blank() -> impl Strategy<Value = String> {
    "[ \t\n]{0,6}"
}

#[derive(Debug, Clone)]
enum Action {
    Submit(String),
    Reply(Option<String>),
    Fail,
    Clear,
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => arb_message().prop_map(Action::Submit),
        1 => arb_blank().prop_map(Action::Submit),
        2 => proptest::option::of("[a-z ]{0,10}").prop_map(Action::Reply),
        1 => Just(Action::Fail),
        1 => Just(Action::Clear),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: replies alternate with submissions, in order
    #[test]
    fn prop_successful_exchanges_alternate(messages in arb_messages()) {
        let mut harness = Harness::default();
        for (k, message) in messages.iter().enumerate() {
            harness.step(SessionEvent::Submit { text: message.clone() }).unwrap();
            let text = Some(format!("reply {k}"));
            harness.step(SessionEvent::ReplyReceived { epoch: 0, text }).unwrap();
        }

        let turns = harness.store.turns();
        prop_assert_eq!(turns.len(), 2 * messages.len());
        for (k, message) in messages.iter().enumerate() {
            prop_assert_eq!(turns[2 * k].sender, Sender::Local);
            prop_assert_eq!(&turns[2 * k].text, message.trim());
            prop_assert_eq!(turns[2 * k + 1].sender, Sender::Remote);
            prop_assert_eq!(&turns[2 * k + 1].text, &format!("reply {k}"));
        }
    }

    // Invariant 2: the k-th request carries exactly the first 2(k-1) turns
    #[test]
    fn prop_history_is_prefix_before_local_turn(messages in arb_messages()) {
        let mut harness = Harness::default();
        for message in &messages {
            harness.step(SessionEvent::Submit { text: message.clone() }).unwrap();
            let text = Some("ok".to_string());
            harness.step(SessionEvent::ReplyReceived { epoch: 0, text }).unwrap();
        }

        let turns = harness.store.turns();
        for (k, (_, history, message)) in harness.requests.iter().enumerate() {
            let expected: Vec<LlmMessage> =
                turns[..2 * k].iter().map(Turn::to_llm_message).collect();
            prop_assert_eq!(history, &expected);
            prop_assert_eq!(message, &turns[2 * k].text);
        }
    }

    // Invariant 3: blank input never changes the log or the state
    #[test]
    fn prop_blank_submit_is_noop(
        prefix in proptest::collection::vec(arb_action(), 0..10),
        blank in arb_blank(),
    ) {
        let mut harness = Harness::default();
        for action in prefix {
            apply_action(&mut harness, action);
        }

        let len = harness.store.len();
        let state = harness.state;
        let result = harness.step(SessionEvent::Submit { text: blank });
        prop_assert_eq!(result, Err(TransitionError::EmptyMessage));
        prop_assert_eq!(harness.store.len(), len);
        prop_assert_eq!(harness.state, state);
    }

    // Invariant 4: never more than one request outstanding, and clear
    // always empties the log
    #[test]
    fn prop_single_flight_and_clear(actions in proptest::collection::vec(arb_action(), 0..30)) {
        let mut harness = Harness::default();
        for action in actions {
            let was_pending = harness.state.is_pending();
            let requests_before = harness.requests.len();
            let is_clear = matches!(action, Action::Clear);

            apply_action(&mut harness, action);

            if was_pending {
                prop_assert_eq!(harness.requests.len(), requests_before);
            }
            if is_clear {
                prop_assert!(harness.store.is_empty());
            }
            // Every turn after a clear is strictly ordered by id
            let ids: Vec<TurnId> = harness.store.turns().iter().map(|t| t.id).collect();
            prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
        }
    }

    // Invariant 5: a reply for a cleared log never resurrects content
    #[test]
    fn prop_reply_after_clear_discarded(message in arb_message(), reply in "[a-z]{1,10}") {
        let mut harness = Harness::default();
        harness.step(SessionEvent::Submit { text: message }).unwrap();
        harness.step(SessionEvent::Clear).unwrap();
        harness.step(SessionEvent::ReplyReceived { epoch: 0, text: Some(reply) }).unwrap();

        prop_assert!(harness.store.is_empty());
        prop_assert_eq!(harness.state, SessionState::Idle);
    }

    // Invariant 6: the controller honours the same contract end to end
    #[test]
    fn prop_controller_alternates(messages in proptest::collection::vec(arb_message(), 1..5)) {
        let mock = Arc::new(MockLlmService::new("mock"));
        for k in 0..messages.len() {
            mock.queue_text(format!("reply {k}"));
        }
        let diary = SessionController::new("prop", mock.clone());

        runtime().block_on(async {
            for message in &messages {
                diary.exchange(message).await;
            }
        });

        let turns = diary.snapshot();
        prop_assert_eq!(turns.len(), 2 * messages.len());
        prop_assert_eq!(mock.call_count(), messages.len());
        for (k, request) in mock.recorded_requests().iter().enumerate() {
            prop_assert_eq!(request.history.len(), 2 * k);
        }
        let alternates = turns.iter().enumerate().all(|(i, t)| {
            t.sender == if i % 2 == 0 { Sender::Local } else { Sender::Remote }
        });
        prop_assert!(alternates);
    }
}

/// Drive one action, answering replies only when one is owed
fn apply_action(harness: &mut Harness, action: Action) {
    let event = match action {
        Action::Submit(text) => SessionEvent::Submit { text },
        Action::Clear => SessionEvent::Clear,
        Action::Reply(text) => match harness.pending_epoch() {
            Some(epoch) => SessionEvent::ReplyReceived { epoch, text },
            None => return,
        },
        Action::Fail => match harness.pending_epoch() {
            Some(epoch) => SessionEvent::ReplyFailed {
                epoch,
                message: "boom".to_string(),
            },
            None => return,
        },
    };
    // Rejections (blank, busy) are part of the contract, not failures
    let _ = harness.step(event);
}
