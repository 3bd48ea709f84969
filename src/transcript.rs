//! Transcript container model.
//!
//! [`Transcript`] is the message container of the chat view: an ordered list
//! of rendered nodes plus a scroll position that is pinned to the bottom
//! after every insertion. Front-ends observe changes through
//! [`Transcript::subscribe`] and can snapshot the whole container as HTML.
//!
//! # Node kinds
//!
//! - [`NodeKind::Welcome`]: one-time banner, removed on first submission
//! - [`NodeKind::Message`]: a user or assistant bubble
//! - [`NodeKind::Placeholder`]: transient "Typing..." / "Executing..." bubble

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::markup::{markdown_to_html, text_to_html};
use crate::session::Role;

/// Capacity of the change-notification channel.
const EVENT_CAPACITY: usize = 256;

/// Identifier of a node in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Uuid);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// What a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Welcome banner shown before the first submission.
    Welcome,
    /// A chat bubble.
    Message(Role),
    /// Loading indicator owned by one in-flight request.
    Placeholder,
}

/// A rendered element of the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Node identifier.
    pub id: NodeId,
    /// Node kind.
    pub kind: NodeKind,
    /// Text the node was created from (markdown for assistant messages).
    pub source: String,
    /// HTML body of the node.
    pub markup: String,
}

impl Node {
    fn new(kind: NodeKind, source: String, markup: String) -> Self {
        Self {
            id: NodeId(Uuid::new_v4()),
            kind,
            source,
            markup,
        }
    }

    /// CSS classes of the outer element.
    #[must_use]
    pub fn class_name(&self) -> &'static str {
        match self.kind {
            NodeKind::Welcome => "welcome-message",
            NodeKind::Message(Role::User) => "message user",
            NodeKind::Message(Role::Assistant) => "message assistant",
            NodeKind::Placeholder => "message assistant loading",
        }
    }

    /// Number of rows the node occupies.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.source.lines().count().max(1)
    }

    /// Outer HTML of the node.
    #[must_use]
    pub fn to_html(&self) -> String {
        format!(
            "<div class=\"{}\"><div class=\"message-content\">{}</div></div>",
            self.class_name(),
            self.markup
        )
    }
}

/// Change notification emitted by a [`Transcript`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    /// A node was appended at the end.
    Appended(Node),
    /// A node was removed.
    Removed(NodeId),
}

/// Scroll position of the container, in rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    /// Offset of the top of the viewport.
    pub top: usize,
    /// Total height of the content.
    pub height: usize,
}

#[derive(Debug)]
struct TranscriptInner {
    nodes: RwLock<Vec<Node>>,
    scroll: RwLock<ScrollState>,
    events: broadcast::Sender<TranscriptEvent>,
}

/// Shared handle to the message container.
///
/// Cloning is cheap; all clones address the same container.
#[derive(Debug, Clone)]
pub struct Transcript {
    inner: Arc<TranscriptInner>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    /// Create an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(TranscriptInner {
                nodes: RwLock::new(Vec::new()),
                scroll: RwLock::new(ScrollState::default()),
                events,
            }),
        }
    }

    /// Create a transcript that starts with a welcome banner.
    #[must_use]
    pub fn with_welcome(text: &str) -> Self {
        let transcript = Self::new();
        transcript.insert(Node::new(
            NodeKind::Welcome,
            text.to_string(),
            markdown_to_html(text),
        ));
        transcript
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<TranscriptEvent> {
        self.inner.events.subscribe()
    }

    /// Append a message bubble.
    ///
    /// Assistant content is rendered as markdown, user content is inserted as
    /// literal text.
    pub fn add_message(&self, content: &str, role: Role) -> NodeId {
        let markup = match role {
            Role::Assistant => markdown_to_html(content),
            Role::User => text_to_html(content),
        };
        self.insert(Node::new(
            NodeKind::Message(role),
            content.to_string(),
            markup,
        ))
    }

    /// Append a loading placeholder and hand back its owner handle.
    pub fn add_placeholder(&self, label: &str) -> Placeholder {
        let id = self.insert(Node::new(
            NodeKind::Placeholder,
            label.to_string(),
            text_to_html(label),
        ));
        Placeholder {
            id,
            transcript: self.clone(),
        }
    }

    /// Remove the welcome banner if it is still present.
    ///
    /// Returns `true` if a banner was removed.
    pub fn remove_welcome(&self) -> bool {
        let id = {
            let nodes = self.inner.nodes.read().unwrap_or_else(PoisonError::into_inner);
            nodes
                .iter()
                .find(|node| node.kind == NodeKind::Welcome)
                .map(|node| node.id)
        };
        id.is_some_and(|id| self.remove(id))
    }

    /// Remove a node by ID. Returns `false` if it was already gone.
    pub fn remove(&self, id: NodeId) -> bool {
        let removed = {
            let mut nodes = self
                .inner
                .nodes
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let before = nodes.len();
            nodes.retain(|node| node.id != id);
            let removed = nodes.len() != before;
            if removed {
                let height = content_height(&nodes);
                let mut scroll = self
                    .inner
                    .scroll
                    .write()
                    .unwrap_or_else(PoisonError::into_inner);
                scroll.height = height;
                scroll.top = scroll.top.min(height);
            }
            removed
        };
        if removed {
            tracing::trace!(node_id = %id, "Transcript node removed");
            let _ = self.inner.events.send(TranscriptEvent::Removed(id));
        }
        removed
    }

    /// Snapshot of all nodes in display order.
    #[must_use]
    pub fn nodes(&self) -> Vec<Node> {
        self.inner
            .nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Snapshot of message bubbles only, as `(role, source)` pairs.
    #[must_use]
    pub fn messages(&self) -> Vec<(Role, String)> {
        self.nodes()
            .into_iter()
            .filter_map(|node| match node.kind {
                NodeKind::Message(role) => Some((role, node.source)),
                _ => None,
            })
            .collect()
    }

    /// Check if a node is still present.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.inner
            .nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|node| node.id == id)
    }

    /// Number of placeholders currently shown.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner
            .nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|node| node.kind == NodeKind::Placeholder)
            .count()
    }

    /// Current scroll position.
    #[must_use]
    pub fn scroll(&self) -> ScrollState {
        *self
            .inner
            .scroll
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Check if the viewport is at the bottom of the content.
    #[must_use]
    pub fn is_pinned_to_bottom(&self) -> bool {
        let scroll = self.scroll();
        scroll.top == scroll.height
    }

    /// Render the container and all of its nodes as HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::from("<div id=\"chat-container\">");
        for node in self.nodes() {
            out.push_str(&node.to_html());
        }
        out.push_str("</div>");
        out
    }

    fn insert(&self, node: Node) -> NodeId {
        let id = node.id;
        {
            let mut nodes = self
                .inner
                .nodes
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            nodes.push(node.clone());
            let height = content_height(&nodes);
            let mut scroll = self
                .inner
                .scroll
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            scroll.height = height;
            scroll.top = height;
        }
        tracing::trace!(node_id = %id, kind = ?node.kind, "Transcript node appended");
        let _ = self.inner.events.send(TranscriptEvent::Appended(node));
        id
    }
}

fn content_height(nodes: &[Node]) -> usize {
    nodes.iter().map(Node::rows).sum()
}

/// Handle to a placeholder owned by a single request.
///
/// The placeholder stays in the transcript until [`Placeholder::remove`] is
/// called; dropping the handle leaves it in place.
#[derive(Debug)]
pub struct Placeholder {
    id: NodeId,
    transcript: Transcript,
}

impl Placeholder {
    /// Node ID of the placeholder.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Remove the placeholder from the transcript.
    pub fn remove(self) {
        self.transcript.remove(self.id);
    }
}
