//! Transport-only PaperMind API client primitives.
//!
//! This crate owns request building and response parsing for the chat stream
//! endpoint and the REST endpoints (auth, bots, files). It contains no session
//! bookkeeping and no UI coupling.
//!
//! The chat endpoint may answer with Server-Sent Events or with a raw text
//! stream; both are normalized into [`ChatStreamEvent`]s by [`StreamDecoder`].

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod headers;
pub mod payload;
pub mod rest;
pub mod retry;
pub mod sse;
pub mod url;

pub use client::{ApiClient, CancellationSignal};
pub use config::ApiConfig;
pub use error::ApiError;
pub use events::ChatStreamEvent;
pub use payload::{ChatRequest, HistoryEntry};
pub use rest::{Bot, DeleteFileRequest, Envelope, LoginRequest, NewBot, RegisterRequest, StoredFile};
pub use sse::{SseStreamParser, StreamDecoder, TextStreamDecoder};
pub use url::{endpoint_url, normalize_base_url};
