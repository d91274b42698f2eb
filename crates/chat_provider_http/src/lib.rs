//! PaperMind HTTP implementation of the shared `chat_provider` contract.
//!
//! This adapter translates `papermind_api` stream events into response
//! fragments and maps transport failures onto `ConversationError`.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use chat_provider::{
    CancelSignal, ConversationError, ConversationPayload, ConversationProvider, Fragment,
    ProviderInitError, ProviderProfile, Turn,
};
use papermind_api::{ApiClient, ApiConfig, ApiError, ChatRequest, ChatStreamEvent, HistoryEntry};
use tracing::debug;

/// Stable provider identifier used for explicit startup selection.
pub const HTTP_PROVIDER_ID: &str = "http";

/// Runtime configuration for the HTTP provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpProviderConfig {
    pub base_url: String,
    pub access_token: Option<String>,
    pub timeout: Option<Duration>,
    pub idle_timeout: Option<Duration>,
    pub max_retries: Option<u32>,
}

impl HttpProviderConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: None,
            timeout: None,
            idle_timeout: None,
            max_retries: None,
        }
    }

    #[must_use]
    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = Some(idle_timeout);
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Builds the transport config; unset fields keep the client defaults.
    pub fn to_api_config(&self) -> ApiConfig {
        let mut config = ApiConfig::new(self.base_url.clone());

        if let Some(token) = &self.access_token {
            config = config.with_access_token(token.clone());
        }

        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }

        if let Some(idle_timeout) = self.idle_timeout {
            config = config.with_idle_timeout(Some(idle_timeout));
        }

        if let Some(max_retries) = self.max_retries {
            config = config.with_max_retries(max_retries);
        }

        config
    }
}

trait StreamClient: Send + Sync {
    fn stream(
        &self,
        request: &ChatRequest,
        cancel: &CancelSignal,
        on_event: &mut dyn FnMut(ChatStreamEvent),
    ) -> Result<(), ApiError>;
}

#[derive(Debug)]
struct DefaultStreamClient {
    client: ApiClient,
}

impl StreamClient for DefaultStreamClient {
    fn stream(
        &self,
        request: &ChatRequest,
        cancel: &CancelSignal,
        on_event: &mut dyn FnMut(ChatStreamEvent),
    ) -> Result<(), ApiError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| ApiError::Unknown(format!("failed to initialize tokio runtime: {error}")))?;

        runtime.block_on(
            self.client
                .stream_chat_with_handler(request, Some(cancel), |event| on_event(event)),
        )
    }
}

/// `ConversationProvider` adapter backed by `papermind_api` transport.
pub struct HttpConversationProvider {
    endpoint: String,
    stream_client: Arc<dyn StreamClient>,
}

impl HttpConversationProvider {
    /// Creates a provider using the real PaperMind transport.
    pub fn new(config: HttpProviderConfig) -> Result<Self, ProviderInitError> {
        let client = ApiClient::new(config.to_api_config()).map_err(map_init_error)?;
        let endpoint = client.chat_endpoint();

        Ok(Self {
            endpoint,
            stream_client: Arc::new(DefaultStreamClient { client }),
        })
    }

    #[cfg(test)]
    fn with_stream_client_for_tests(stream_client: Arc<dyn StreamClient>) -> Self {
        Self {
            endpoint: "http://test.invalid/chat-bot/chat".to_string(),
            stream_client,
        }
    }
}

impl ConversationProvider for HttpConversationProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: HTTP_PROVIDER_ID.to_string(),
            endpoint: Some(self.endpoint.clone()),
        }
    }

    fn start_conversation(
        &self,
        payload: ConversationPayload,
        cancel: CancelSignal,
        on_fragment: &mut dyn FnMut(Fragment),
    ) -> Result<(), ConversationError> {
        if cancel.load(Ordering::Acquire) {
            return Err(ConversationError::Cancelled);
        }

        let request = chat_request(payload);
        debug!(history = request.chat_history.len(), "starting chat exchange");

        self.stream_client
            .stream(&request, &cancel, &mut |event| {
                if let Some(fragment) = fragment_for_event(event) {
                    on_fragment(fragment);
                }
            })
            .map_err(map_stream_error)
    }
}

fn chat_request(payload: ConversationPayload) -> ChatRequest {
    let history = payload.chat_history.iter().map(history_entry).collect();
    ChatRequest::new(payload.question, payload.namespace_id, history)
}

fn history_entry(turn: &Turn) -> HistoryEntry {
    HistoryEntry::new(turn.question(), turn.answer())
}

fn fragment_for_event(event: ChatStreamEvent) -> Option<Fragment> {
    match event {
        ChatStreamEvent::Text(text) => Some(Fragment::Text(text)),
        ChatStreamEvent::Record(record) => Some(Fragment::Record(record)),
        ChatStreamEvent::Done => None,
    }
}

fn map_stream_error(error: ApiError) -> ConversationError {
    match error {
        ApiError::Cancelled => ConversationError::Cancelled,
        ApiError::IdleTimeout(idle) => ConversationError::TimedOut { idle },
        other => ConversationError::transport(format!("chat request failed: {other}")),
    }
}

fn map_init_error(error: ApiError) -> ProviderInitError {
    ProviderInitError::new(format!("Failed to initialize http provider: {error}"))
}
