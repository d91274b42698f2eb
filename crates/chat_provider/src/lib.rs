//! Minimal provider-agnostic contract for streaming one conversation exchange.
//!
//! This crate defines only the transcript turn shape sent as context, the
//! opaque response fragments a provider emits, and the streaming call itself.
//! Transport details and session bookkeeping live elsewhere.

use std::fmt;
use std::sync::{atomic::AtomicBool, Arc};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier for one submitted question and its streamed answer.
pub type ExchangeId = u64;

/// Shared cancellation flag for an exchange.
pub type CancelSignal = Arc<AtomicBool>;

/// Record fields checked, in order, when extracting text from a structured fragment.
const RECORD_TEXT_FIELDS: [&str; 3] = ["text", "Ai_response", "data"];

/// Error returned while constructing/configuring a provider before any exchange starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInitError {
    message: String,
}

impl ProviderInitError {
    /// Creates a new provider initialization error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the underlying error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ProviderInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProviderInitError {}

impl From<String> for ProviderInitError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ProviderInitError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// One question/answer unit of a chat transcript.
///
/// A user turn carries a non-empty question; a bot turn has an empty question
/// and an answer that only ever grows. Fields are private so that the question
/// never changes after construction and the answer is append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    #[serde(default)]
    question: String,
    #[serde(rename = "Ai_response", default)]
    answer: String,
}

impl Turn {
    /// Creates a user turn with an empty answer.
    #[must_use]
    pub fn user(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: String::new(),
        }
    }

    /// Creates a bot turn holding `answer`.
    #[must_use]
    pub fn bot(answer: impl Into<String>) -> Self {
        Self {
            question: String::new(),
            answer: answer.into(),
        }
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Returns true for turns that carry a user question.
    #[must_use]
    pub fn is_user(&self) -> bool {
        !self.question.is_empty()
    }

    /// Returns true for bot turns (empty question).
    #[must_use]
    pub fn is_bot(&self) -> bool {
        self.question.is_empty()
    }

    /// Appends streamed text to the answer.
    pub fn append_answer(&mut self, text: &str) {
        self.answer.push_str(text);
    }
}

/// One incremental piece of a streamed answer, as delivered by a provider.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Raw text chunk.
    Text(String),
    /// Structured chunk whose text is resolved by [`Fragment::text`].
    Record(Value),
}

impl Fragment {
    /// Resolves the display text carried by this fragment.
    ///
    /// Raw text (including a bare JSON string record) is used as-is. A record
    /// is checked for `text`, `Ai_response` and then `data`; the first non-null
    /// field wins, with non-string values serialized as JSON. A record with none
    /// of these fields is serialized whole.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Record(Value::String(text)) => text.clone(),
            Self::Record(record) => RECORD_TEXT_FIELDS
                .iter()
                .find_map(|field| record.get(field).filter(|value| !value.is_null()))
                .map(value_text)
                .unwrap_or_else(|| record.to_string()),
        }
    }
}

impl From<String> for Fragment {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Fragment {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Value> for Fragment {
    fn from(record: Value) -> Self {
        Self::Record(record)
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Request body for one exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationPayload {
    pub question: String,
    /// Bot/document namespace; passed through unchanged.
    pub namespace_id: Option<String>,
    /// Transcript snapshot taken before the submitted turn was appended.
    #[serde(rename = "chatHistory")]
    pub chat_history: Vec<Turn>,
}

/// Failure that settles a streaming call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationError {
    /// The caller raised the cancel signal.
    Cancelled,
    /// No response data arrived within the configured inactivity window.
    TimedOut { idle: Duration },
    /// Connection drop, non-success status or malformed stream.
    Transport(String),
}

impl ConversationError {
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for ConversationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "conversation was cancelled"),
            Self::TimedOut { idle } => {
                write!(f, "no response data for {}ms", idle.as_millis())
            }
            Self::Transport(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ConversationError {}

/// Immutable metadata describing a conversation provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider_id: String,
    pub endpoint: Option<String>,
}

/// Provider interface for streaming one exchange.
pub trait ConversationProvider: Send + Sync + 'static {
    /// Returns provider identity metadata.
    fn profile(&self) -> ProviderProfile;

    /// Sends `payload` and invokes `on_fragment` for every received fragment,
    /// in arrival order, before returning.
    ///
    /// Returns `Ok(())` on normal end-of-stream. Providers must poll `cancel`
    /// and return [`ConversationError::Cancelled`] once it is raised.
    fn start_conversation(
        &self,
        payload: ConversationPayload,
        cancel: CancelSignal,
        on_fragment: &mut dyn FnMut(Fragment),
    ) -> Result<(), ConversationError>;
}
