//! Entity chat client
//!
//! A small chat client for the Entity agent backend: plain messages go to the
//! chat endpoint with the full conversation history, `run: <command>` lines go
//! to the command-execution endpoint, and every reply is rendered into a
//! scrolling transcript.
//!
//! # Architecture
//!
//! - **Controller**: Routes submissions and renders replies
//! - **Backend**: Trait over the server's JSON endpoints, with a reqwest implementation
//! - **View models**: Input field and transcript container, rendered to HTML
//! - **Console**: Terminal front-end driving the controller from stdin
//!
//! # Modules
//!
//! - [`api`]: Wire types, [`api::ChatBackend`] and [`api::HttpBackend`]
//! - [`config`]: Layered configuration (defaults, files, env, CLI)
//! - [`console`]: Terminal front-end
//! - [`controller`]: Submission routing and the chat/execute flows
//! - [`input`]: Auto-growing input field
//! - [`markup`]: Markdown and literal-text rendering
//! - [`session`]: Conversation history
//! - [`transcript`]: Message container model

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod api;
pub mod config;
pub mod console;
pub mod controller;
pub mod error;
pub mod input;
pub mod markup;
pub mod session;
pub mod transcript;

pub use controller::{ChatController, Outcome, PendingRequest};
pub use error::{Error, Result};
