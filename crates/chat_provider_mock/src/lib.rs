//! Deterministic mock implementation of the shared `chat_provider` contract.
//!
//! This crate contains no transport logic and is intended for local
//! development and contract-level integration testing.

use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use chat_provider::{
    CancelSignal, ConversationError, ConversationPayload, ConversationProvider, Fragment,
    ProviderProfile,
};
use serde_json::json;

/// Stable provider identifier used for explicit startup selection.
pub const MOCK_PROVIDER_ID: &str = "mock";

/// Scripted provider used by session tests and offline runs.
///
/// Emits its fragments in order, optionally pausing before the first one and
/// between fragments, then settles with the configured outcome.
#[derive(Debug, Clone)]
pub struct MockProvider {
    fragments: Vec<Fragment>,
    failure: Option<ConversationError>,
    start_delay: Duration,
    fragment_delay: Duration,
}

impl MockProvider {
    /// Creates a mock provider streaming `fragments` without delays.
    #[must_use]
    pub fn new(fragments: Vec<Fragment>) -> Self {
        Self {
            fragments,
            failure: None,
            start_delay: Duration::ZERO,
            fragment_delay: Duration::ZERO,
        }
    }

    /// Creates a mock provider streaming plain text chunks.
    #[must_use]
    pub fn from_texts<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            chunks
                .into_iter()
                .map(|chunk| Fragment::Text(chunk.into()))
                .collect(),
        )
    }

    /// Fails with `error` after all fragments were emitted.
    #[must_use]
    pub fn failing_with(mut self, error: ConversationError) -> Self {
        self.failure = Some(error);
        self
    }

    #[must_use]
    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    #[must_use]
    pub fn with_fragment_delay(mut self, delay: Duration) -> Self {
        self.fragment_delay = delay;
        self
    }

    const OFFLINE_START_DELAY_MS: u64 = 200;
    const OFFLINE_FRAGMENT_DELAY_MS: u64 = 40;

    /// Canned answer used by the CLI when no backend is configured.
    #[must_use]
    pub fn offline() -> Self {
        Self::new(vec![
            Fragment::Record(json!({"text": "PaperMind is running without a backend. "})),
            Fragment::Record(json!({"text": "Answers are scripted. "})),
            Fragment::Text("• Upload documents to a bot ".to_string()),
            Fragment::Text("• Ask questions about them ".to_string()),
            Fragment::Record(json!({"Ai_response": "For More Reference: "})),
            Fragment::Record(json!({"data": "offline-guide.pdf"})),
        ])
        .with_start_delay(Duration::from_millis(Self::OFFLINE_START_DELAY_MS))
        .with_fragment_delay(Duration::from_millis(Self::OFFLINE_FRAGMENT_DELAY_MS))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::offline()
    }
}

impl ConversationProvider for MockProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: MOCK_PROVIDER_ID.to_string(),
            endpoint: None,
        }
    }

    fn start_conversation(
        &self,
        payload: ConversationPayload,
        cancel: CancelSignal,
        on_fragment: &mut dyn FnMut(Fragment),
    ) -> Result<(), ConversationError> {
        let _ = payload;

        pause(self.start_delay);

        for (index, fragment) in self.fragments.iter().enumerate() {
            if cancel.load(Ordering::SeqCst) {
                return Err(ConversationError::Cancelled);
            }
            if index > 0 {
                pause(self.fragment_delay);
                if cancel.load(Ordering::SeqCst) {
                    return Err(ConversationError::Cancelled);
                }
            }
            on_fragment(fragment.clone());
        }

        if cancel.load(Ordering::SeqCst) {
            return Err(ConversationError::Cancelled);
        }

        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;

    fn payload() -> ConversationPayload {
        ConversationPayload {
            question: "q".to_string(),
            namespace_id: None,
            chat_history: Vec::new(),
        }
    }

    #[test]
    fn emits_fragments_in_order_and_succeeds() {
        let provider = MockProvider::from_texts(["Hel", "lo"]);
        let mut seen = Vec::new();

        let result = provider.start_conversation(
            payload(),
            Arc::new(AtomicBool::new(false)),
            &mut |fragment| seen.push(fragment.text()),
        );

        assert_eq!(result, Ok(()));
        assert_eq!(seen, vec!["Hel".to_string(), "lo".to_string()]);
        assert_eq!(provider.profile().provider_id, MOCK_PROVIDER_ID);
    }

    #[test]
    fn configured_failure_follows_partial_output() {
        let provider = MockProvider::from_texts(["partial"])
            .failing_with(ConversationError::transport("connection dropped"));
        let mut seen = Vec::new();

        let result = provider.start_conversation(
            payload(),
            Arc::new(AtomicBool::new(false)),
            &mut |fragment| seen.push(fragment.text()),
        );

        assert_eq!(seen, vec!["partial".to_string()]);
        assert_eq!(
            result,
            Err(ConversationError::transport("connection dropped"))
        );
    }

    #[test]
    fn raised_cancel_stops_between_fragments() {
        let provider = MockProvider::from_texts(["a", "b", "c"]);
        let cancel = Arc::new(AtomicBool::new(false));
        let mut seen = Vec::new();

        let result = provider.start_conversation(payload(), Arc::clone(&cancel), &mut |fragment| {
            seen.push(fragment.text());
            cancel.store(true, Ordering::SeqCst);
        });

        assert_eq!(result, Err(ConversationError::Cancelled));
        assert_eq!(seen, vec!["a".to_string()]);
    }

    #[test]
    fn offline_script_mixes_text_and_records() {
        let provider = MockProvider::offline().with_start_delay(Duration::ZERO);
        let provider = provider.with_fragment_delay(Duration::ZERO);
        let mut answer = String::new();

        provider
            .start_conversation(
                payload(),
                Arc::new(AtomicBool::new(false)),
                &mut |fragment| answer.push_str(&fragment.text()),
            )
            .expect("offline script succeeds");

        assert!(answer.starts_with("PaperMind is running without a backend."));
        assert!(answer.contains("For More Reference:"));
        assert!(answer.ends_with("offline-guide.pdf"));
    }
}
