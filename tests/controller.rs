use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use chat_provider::{
    CancelSignal, ConversationError, ConversationPayload, ConversationProvider, Fragment,
    ProviderProfile, Turn,
};
use chat_provider_mock::MockProvider;
use papermind::config::DEFAULT_ERROR_MARKER;
use papermind::{
    ChatController, ChatSession, ControllerError, NoopObserver, SessionChange, SessionConfig,
    SessionError,
};
use pretty_assertions::assert_eq;
use serde_json::json;

mod support;

struct PanickingProvider;

impl ConversationProvider for PanickingProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: "panicking".to_string(),
            endpoint: None,
        }
    }

    fn start_conversation(
        &self,
        _payload: ConversationPayload,
        _cancel: CancelSignal,
        on_fragment: &mut dyn FnMut(Fragment),
    ) -> Result<(), ConversationError> {
        on_fragment(Fragment::from("half"));
        panic!("provider bug");
    }
}

/// Streams until cancelled, then reports cancellation.
struct EndlessProvider;

impl ConversationProvider for EndlessProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: "endless".to_string(),
            endpoint: None,
        }
    }

    fn start_conversation(
        &self,
        _payload: ConversationPayload,
        cancel: CancelSignal,
        on_fragment: &mut dyn FnMut(Fragment),
    ) -> Result<(), ConversationError> {
        while !cancel.load(Ordering::SeqCst) {
            on_fragment(Fragment::from("."));
            std::thread::sleep(Duration::from_millis(5));
        }
        Err(ConversationError::Cancelled)
    }
}

fn controller_with(
    provider: Arc<dyn ConversationProvider>,
) -> (Arc<ChatController>, Arc<support::RecordingObserver>) {
    let observer = support::RecordingObserver::new();
    let controller = ChatController::new(
        ChatSession::new(SessionConfig::default(), Some("ns-1".to_string())),
        provider,
        Arc::clone(&observer) as Arc<dyn papermind::ChangeObserver>,
    );
    (controller, observer)
}

#[test]
fn streamed_answer_lands_in_transcript_and_releases_busy() {
    let provider = MockProvider::new(vec![
        Fragment::Record(json!({"text": "Hel"})),
        Fragment::from("lo"),
        Fragment::Record(json!({"data": " world"})),
    ]);
    let (controller, observer) = controller_with(Arc::new(provider));

    let id = controller
        .submit("Say hello")
        .expect("submit succeeds")
        .expect("exchange dispatched");
    controller.wait_idle();

    assert!(!controller.is_busy());
    assert_eq!(
        controller.turns(),
        vec![
            Turn::bot("Hello, How can I help you today?"),
            Turn::user("Say hello"),
            Turn::bot("Hello world"),
        ]
    );
    assert_eq!(observer.fragment_texts(), vec!["Hel", "lo", " world"]);
    assert_eq!(
        observer.changes().last(),
        Some(&SessionChange::Finished { exchange: id })
    );
}

#[test]
fn provider_failure_appends_error_turn_after_partial_answer() {
    let provider = MockProvider::from_texts(["partial"])
        .failing_with(ConversationError::transport("connection reset"));
    let (controller, observer) = controller_with(Arc::new(provider));

    let id = controller.submit("q").expect("ok").expect("dispatched");
    controller.wait_idle();

    let turns = controller.turns();
    assert_eq!(turns[turns.len() - 2], Turn::bot("partial"));
    assert_eq!(turns[turns.len() - 1], Turn::bot(DEFAULT_ERROR_MARKER));
    assert!(!controller.is_busy());
    assert!(matches!(
        observer.changes().last(),
        Some(SessionChange::Failed { exchange, error })
            if *exchange == id && error.contains("connection reset")
    ));
}

#[test]
fn provider_panic_is_reported_as_failure() {
    let (controller, observer) = controller_with(Arc::new(PanickingProvider));

    controller.submit("q").expect("ok").expect("dispatched");
    controller.wait_idle();

    assert!(!controller.is_busy());
    assert_eq!(
        controller.turns().last(),
        Some(&Turn::bot(DEFAULT_ERROR_MARKER))
    );
    assert!(matches!(
        observer.changes().last(),
        Some(SessionChange::Failed { error, .. }) if error.contains("panicked")
    ));
}

#[test]
fn submit_while_streaming_is_ignored() {
    let provider = MockProvider::from_texts(["slow"]).with_start_delay(Duration::from_millis(150));
    let controller = ChatController::new(
        ChatSession::default(),
        Arc::new(provider),
        Arc::new(NoopObserver),
    );

    controller.submit("first").expect("ok").expect("dispatched");
    let len = controller.turns().len();

    assert_eq!(controller.submit("second").expect("ok"), None);
    assert_eq!(controller.turns().len(), len);

    controller.wait_idle();
    assert!(controller.submit("second").expect("ok").is_some());
    controller.wait_idle();
}

#[test]
fn empty_question_is_rejected_without_dispatch() {
    let (controller, observer) = controller_with(Arc::new(MockProvider::from_texts(["x"])));

    let error = controller.submit("   ").expect_err("blank rejected");
    assert!(matches!(
        error,
        ControllerError::Session(SessionError::EmptyQuestion)
    ));
    assert_eq!(controller.turns().len(), 1);
    assert!(observer.changes().is_empty());
}

#[test]
fn shutdown_cancels_in_flight_exchange_and_freezes_transcript() {
    let (controller, observer) = controller_with(Arc::new(EndlessProvider));

    let id = controller.submit("q").expect("ok").expect("dispatched");
    assert!(support::wait_until(Duration::from_secs(2), || {
        !observer.fragment_texts().is_empty()
    }));

    controller.shutdown();
    let frozen = controller.turns();

    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(controller.turns(), frozen);
    assert!(!controller.is_busy());
    assert!(observer
        .changes()
        .contains(&SessionChange::Cancelled { exchange: id }));
    assert!(!observer
        .changes()
        .iter()
        .any(|change| matches!(change, SessionChange::Failed { .. })));

    let error = controller.submit("again").expect_err("closed");
    assert!(matches!(error, ControllerError::Session(SessionError::Closed)));
}

#[test]
fn payload_carries_namespace_and_prior_history() {
    struct CapturingProvider {
        seen: std::sync::Mutex<Vec<ConversationPayload>>,
    }

    impl ConversationProvider for CapturingProvider {
        fn profile(&self) -> ProviderProfile {
            ProviderProfile {
                provider_id: "capture".to_string(),
                endpoint: None,
            }
        }

        fn start_conversation(
            &self,
            payload: ConversationPayload,
            _cancel: CancelSignal,
            on_fragment: &mut dyn FnMut(Fragment),
        ) -> Result<(), ConversationError> {
            support::lock_unpoisoned(&self.seen).push(payload);
            on_fragment(Fragment::from("ok"));
            Ok(())
        }
    }

    let provider = Arc::new(CapturingProvider {
        seen: std::sync::Mutex::new(Vec::new()),
    });
    let (controller, _) = controller_with(Arc::clone(&provider) as Arc<dyn ConversationProvider>);

    controller.submit("one").expect("ok");
    controller.wait_idle();
    controller.submit("two").expect("ok");
    controller.wait_idle();

    let seen = support::lock_unpoisoned(&provider.seen).clone();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].namespace_id.as_deref(), Some("ns-1"));
    assert_eq!(
        seen[1].chat_history,
        vec![
            Turn::bot("Hello, How can I help you today?"),
            Turn::user("one"),
            Turn::bot("ok"),
        ]
    );
}
