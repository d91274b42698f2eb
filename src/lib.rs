//! Streaming chat session core for PaperMind document bots.
//!
//! Invariant: one exchange in flight per session. Every fragment and
//! settlement carries the exchange id it belongs to, and is ignored unless it
//! matches the exchange currently in flight.
//!
//! # Public API Overview
//! - [`ChatSession`] owns the transcript and the submit/fragment/settle state
//!   machine; it performs no I/O.
//! - [`ChatController`] runs each exchange on a worker thread against a
//!   [`chat_provider::ConversationProvider`] and reports changes through a
//!   [`ChangeObserver`].
//! - [`format_response`] derives the display form of a bot answer.
//! - [`pagination`] and [`listing`] back the bot and file listings.
//!
//! ## Configuration
//!
//! - `PAPERMIND_GREETING` overrides the greeting seeded as the first bot turn.
//!   Blank values are ignored.

pub mod config;
pub mod format;
pub mod listing;
pub mod pagination;
pub mod runtime;
pub mod session;
pub mod transcript;

pub use crate::config::SessionConfig;
pub use crate::format::format_response;
pub use crate::runtime::{ChangeObserver, ChatController, ControllerError, NoopObserver, SessionChange};
pub use crate::session::{ChatSession, Exchange, Role, SessionError, Submission, TurnView};
pub use crate::transcript::{FragmentOutcome, Transcript};
