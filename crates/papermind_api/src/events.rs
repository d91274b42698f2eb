use serde_json::Value;

/// Stream event emitted by the decoders after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatStreamEvent {
    /// Text that is not JSON (raw stream chunk or plain SSE data).
    Text(String),
    /// SSE data that parsed as JSON.
    Record(Value),
    /// `[DONE]` sentinel; nothing after it is delivered.
    Done,
}

impl ChatStreamEvent {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}
