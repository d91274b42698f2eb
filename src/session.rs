use chat_provider::{ConversationError, ConversationPayload, ExchangeId, Fragment, Turn};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::format::format_response;
use crate::transcript::{FragmentOutcome, Transcript};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("question is empty")]
    EmptyQuestion,
    #[error("chat session is closed")]
    Closed,
}

/// One outbound exchange issued by [`ChatSession::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub id: ExchangeId,
    pub payload: ConversationPayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The question was appended and `Exchange` must be sent.
    Dispatched(Exchange),
    /// An exchange is already in flight; nothing changed.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

/// Render-ready view of one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnView {
    pub role: Role,
    pub question: String,
    pub answer: String,
}

impl TurnView {
    fn from_turn(turn: &Turn) -> Self {
        if turn.is_user() {
            Self {
                role: Role::User,
                question: turn.question().to_string(),
                answer: String::new(),
            }
        } else {
            Self {
                role: Role::Bot,
                question: String::new(),
                answer: format_response(turn.answer()),
            }
        }
    }

    /// Text shown for this turn.
    #[must_use]
    pub fn text(&self) -> &str {
        match self.role {
            Role::User => &self.question,
            Role::Bot => &self.answer,
        }
    }
}

/// Streaming chat session state machine.
///
/// Owns the transcript and enforces one exchange in flight. Fragments and
/// settlements carry the [`ExchangeId`] issued at submission; anything for a
/// different exchange, or arriving after teardown, is ignored.
#[derive(Debug)]
pub struct ChatSession {
    config: SessionConfig,
    namespace_id: Option<String>,
    transcript: Transcript,
    in_flight: Option<ExchangeId>,
    next_exchange_id: ExchangeId,
    live: bool,
}

impl ChatSession {
    pub fn new(config: SessionConfig, namespace_id: Option<String>) -> Self {
        let transcript = Transcript::seeded(config.greeting.clone());
        Self {
            config,
            namespace_id,
            transcript,
            in_flight: None,
            next_exchange_id: 1,
            live: true,
        }
    }

    /// Session over an existing transcript; mainly for tests and replays.
    pub fn with_transcript(
        config: SessionConfig,
        namespace_id: Option<String>,
        transcript: Transcript,
    ) -> Self {
        Self {
            transcript,
            ..Self::new(config, namespace_id)
        }
    }

    pub fn namespace_id(&self) -> Option<&str> {
        self.namespace_id.as_deref()
    }

    pub fn set_namespace_id(&mut self, namespace_id: Option<String>) {
        self.namespace_id = namespace_id;
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn turns(&self) -> &[Turn] {
        self.transcript.turns()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// True while an answer is pending; drives the progress indicator.
    pub fn show_progress(&self) -> bool {
        self.is_busy()
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn in_flight(&self) -> Option<ExchangeId> {
        self.in_flight
    }

    /// Appends the trimmed question as a user turn and issues an exchange.
    ///
    /// The payload's history is the transcript as it was before the question
    /// was appended.
    pub fn submit(&mut self, question: &str) -> Result<Submission, SessionError> {
        if !self.live {
            return Err(SessionError::Closed);
        }

        let question = question.trim();
        if question.is_empty() {
            return Err(SessionError::EmptyQuestion);
        }

        if let Some(active) = self.in_flight {
            debug!(exchange = active, "submission ignored while busy");
            return Ok(Submission::Ignored);
        }

        let chat_history = self.transcript.snapshot();
        self.transcript.push_user(question);

        let id = self.next_exchange_id;
        self.next_exchange_id += 1;
        self.in_flight = Some(id);

        info!(exchange = id, history = chat_history.len(), "exchange dispatched");

        Ok(Submission::Dispatched(Exchange {
            id,
            payload: ConversationPayload {
                question: question.to_string(),
                namespace_id: self.namespace_id.clone(),
                chat_history,
            },
        }))
    }

    /// Folds a fragment of `exchange` into the transcript.
    pub fn apply_fragment(&mut self, exchange: ExchangeId, fragment: &Fragment) -> FragmentOutcome {
        if !self.accepts(exchange) {
            debug!(exchange, "stale fragment dropped");
            return FragmentOutcome::Dropped;
        }

        self.transcript.apply_fragment(&fragment.text())
    }

    /// Settles `exchange` after a normal end of stream.
    pub fn finish(&mut self, exchange: ExchangeId) -> bool {
        if !self.accepts(exchange) {
            return false;
        }

        self.in_flight = None;
        debug!(exchange, "exchange finished");
        true
    }

    /// Settles `exchange` after a transport failure by appending the error turn.
    pub fn fail(&mut self, exchange: ExchangeId, error: &ConversationError) -> bool {
        if !self.accepts(exchange) {
            return false;
        }

        warn!(exchange, %error, "exchange failed");
        self.transcript.push_bot(self.config.error_marker.clone());
        self.in_flight = None;
        true
    }

    /// Settles a cancelled `exchange` without touching the transcript.
    pub fn abandon(&mut self, exchange: ExchangeId) -> bool {
        if self.in_flight != Some(exchange) {
            return false;
        }

        self.in_flight = None;
        debug!(exchange, "exchange cancelled");
        true
    }

    /// Stops the session. Returns the exchange that was in flight so its
    /// transport can be cancelled; partial answers stay as they are.
    pub fn teardown(&mut self) -> Option<ExchangeId> {
        self.live = false;
        let in_flight = self.in_flight.take();
        info!(exchange = ?in_flight, "chat session torn down");
        in_flight
    }

    /// Formatted views of every turn, computed fresh.
    pub fn display_turns(&self) -> Vec<TurnView> {
        self.transcript.turns().iter().map(TurnView::from_turn).collect()
    }

    fn accepts(&self, exchange: ExchangeId) -> bool {
        self.live && self.in_flight == Some(exchange)
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(SessionConfig::default(), None)
    }
}
