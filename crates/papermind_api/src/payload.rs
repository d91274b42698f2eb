use serde::{Deserialize, Serialize};

/// One prior transcript entry sent as chat context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub question: String,
    #[serde(rename = "Ai_response", default)]
    pub ai_response: String,
}

impl HistoryEntry {
    pub fn new(question: impl Into<String>, ai_response: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ai_response: ai_response.into(),
        }
    }
}

/// Canonical request payload for the chat stream endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    pub namespace_id: Option<String>,
    #[serde(rename = "chatHistory", default)]
    pub chat_history: Vec<HistoryEntry>,
}

impl ChatRequest {
    pub fn new(
        question: impl Into<String>,
        namespace_id: Option<String>,
        chat_history: Vec<HistoryEntry>,
    ) -> Self {
        Self {
            question: question.into(),
            namespace_id,
            chat_history,
        }
    }
}
