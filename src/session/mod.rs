//! Conversation history for the client session.
//!
//! The backend is stateless: the client replays its full history with every
//! chat request. History lives in memory for the lifetime of the process and
//! is never trimmed or persisted.
//!
//! # Architecture
//!
//! - [`TranscriptEntry`]: One `{ role, content }` item as sent on the wire
//! - [`History`]: Append-only, thread-safe list of entries
//!
//! # Example
//!
//! ```rust
//! use entity_chat::session::History;
//!
//! let history = History::new();
//! history.record_exchange("Hello!", "Hi there.");
//!
//! let entries = history.snapshot();
//! assert_eq!(entries.len(), 2);
//! ```

mod history;

pub use history::{History, Role, TranscriptEntry};
