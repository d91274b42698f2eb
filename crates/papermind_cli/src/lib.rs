//! `papermind` command-line front-end.
//!
//! `chat` runs a line-oriented session against the provider named by
//! `PAPERMIND_PROVIDER` (`mock` by default, or `http`). The remaining
//! subcommands are thin wrappers over the REST endpoints and always need a
//! client config file:
//!
//! ```json
//! { "base_url": "http://127.0.0.1:8000", "access_token": "<token>" }
//! ```
//!
//! Unknown fields are rejected, `timeout_sec` and `idle_timeout_sec` must be
//! greater than zero when present.

pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod crud;
pub mod providers;
pub mod tables;
