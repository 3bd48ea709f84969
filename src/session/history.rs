//! Append-only conversation history.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing into the client.
    User,
    /// The backend model.
    Assistant,
}

impl Role {
    /// Wire name of the role, also used as the CSS class of rendered messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single history item, serialized as `{ "role": ..., "content": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Role of the author.
    pub role: Role,
    /// Raw message text.
    pub content: String,
}

impl TranscriptEntry {
    /// Create a user entry.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant entry.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Conversation history shared between the controller and in-flight requests.
///
/// Cloning is cheap and every clone observes the same entries. Entries are
/// only ever appended in user/assistant pairs, so the length is always even.
#[derive(Debug, Clone, Default)]
pub struct History {
    inner: Arc<RwLock<Vec<TranscriptEntry>>>,
}

impl History {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed exchange.
    ///
    /// Both entries are pushed under a single write lock so concurrent
    /// exchanges never split a pair.
    pub fn record_exchange(&self, user: impl Into<String>, assistant: impl Into<String>) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.push(TranscriptEntry::user(user));
        guard.push(TranscriptEntry::assistant(assistant));
    }

    /// Copy of all entries, in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TranscriptEntry> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if no exchange has completed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
