//! Line-oriented terminal front-end.
//!
//! Each input line is one Enter key press. A line ending in `\` is a
//! Shift+Enter continuation, so multi-line messages can be typed. `exit` or
//! `quit` ends the session, as do EOF and Ctrl-C.
//!
//! Every submission is spawned as its own task, so a slow reply never blocks
//! the prompt and several requests may be in flight at once.

use std::collections::HashSet;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::{JoinError, JoinSet};

use crate::controller::{ChatController, Outcome};
use crate::input::{InputField, Key, KeyOutcome, KeyPress};
use crate::session::Role;
use crate::transcript::{NodeId, NodeKind, TranscriptEvent};

/// Words that end the session when submitted on their own.
const QUIT_WORDS: [&str; 2] = ["exit", "quit"];

/// How the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Input reached EOF.
    EndOfInput,
    /// The user typed a quit word.
    Quit,
    /// Ctrl-C.
    Interrupted,
}

/// Terminal driver for a [`ChatController`].
#[derive(Debug)]
pub struct Console {
    controller: ChatController,
    input: InputField,
    tasks: JoinSet<Outcome>,
    printed: HashSet<NodeId>,
}

impl Console {
    /// Create a console over a controller.
    pub fn new(controller: ChatController) -> Self {
        Self {
            controller,
            input: InputField::new(),
            tasks: JoinSet::new(),
            printed: HashSet::new(),
        }
    }

    /// Run until EOF, a quit word, or Ctrl-C.
    ///
    /// On EOF and quit, in-flight requests are awaited and their replies
    /// printed before returning. Ctrl-C abandons them.
    pub async fn run<R, W>(mut self, reader: R, mut writer: W) -> std::io::Result<Exit>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut events = self.controller.transcript().subscribe();
        let mut lines = reader.lines();

        // Anything rendered before we subscribed (the welcome banner).
        self.catch_up(&mut writer).await?;

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let exit = loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break Exit::EndOfInput;
                    };
                    if self.feed_line(&line) {
                        break Exit::Quit;
                    }
                }
                event = events.recv() => {
                    if !self.on_event(&mut writer, event).await? {
                        break Exit::EndOfInput;
                    }
                }
                Some(joined) = self.tasks.join_next() => log_join(joined),
                _ = &mut ctrl_c => {
                    self.tasks.abort_all();
                    break Exit::Interrupted;
                }
            }
        };

        if exit != Exit::Interrupted {
            // Keep printing while the remaining replies arrive.
            while !self.tasks.is_empty() {
                tokio::select! {
                    Some(joined) = self.tasks.join_next() => log_join(joined),
                    event = events.recv() => {
                        if !self.on_event(&mut writer, event).await? {
                            break;
                        }
                    }
                }
            }
            while let Some(joined) = self.tasks.join_next().await {
                log_join(joined);
            }
        }

        loop {
            match events.try_recv() {
                Ok(event) => self.print(&mut writer, &event).await?,
                Err(TryRecvError::Lagged(_)) => self.catch_up(&mut writer).await?,
                Err(_) => break,
            }
        }
        self.catch_up(&mut writer).await?;
        writer.flush().await?;

        Ok(exit)
    }

    /// Handle one received event. Returns `false` once the channel closes.
    async fn on_event<W: AsyncWrite + Unpin>(
        &mut self,
        writer: &mut W,
        event: Result<TranscriptEvent, RecvError>,
    ) -> std::io::Result<bool> {
        match event {
            Ok(event) => self.print(writer, &event).await?,
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Console fell behind, re-reading transcript");
                self.catch_up(writer).await?;
            }
            Err(RecvError::Closed) => return Ok(false),
        }
        Ok(true)
    }

    async fn print<W: AsyncWrite + Unpin>(
        &mut self,
        writer: &mut W,
        event: &TranscriptEvent,
    ) -> std::io::Result<()> {
        let fresh = match event {
            TranscriptEvent::Appended(node) => self.printed.insert(node.id),
            TranscriptEvent::Removed(_) => false,
        };
        if !fresh {
            return Ok(());
        }
        if let Some(text) = render_event(event) {
            writer.write_all(text.as_bytes()).await?;
            writer.flush().await?;
        }
        Ok(())
    }

    /// Print every node of the transcript that has not been printed yet.
    async fn catch_up<W: AsyncWrite + Unpin>(&mut self, writer: &mut W) -> std::io::Result<()> {
        for node in self.controller.transcript().nodes() {
            self.print(writer, &TranscriptEvent::Appended(node)).await?;
        }
        writer.flush().await
    }

    /// Feed one input line. Returns `true` if the user asked to quit.
    fn feed_line(&mut self, line: &str) -> bool {
        let press = if let Some(head) = line.strip_suffix('\\') {
            self.input.insert_str(head);
            KeyPress::shifted(Key::Enter)
        } else {
            self.input.insert_str(line);
            KeyPress::plain(Key::Enter)
        };

        if self.input.handle_key(press) != KeyOutcome::Submit {
            return false;
        }

        let text = self.input.value().trim();
        if QUIT_WORDS.iter().any(|word| text.eq_ignore_ascii_case(word)) {
            self.input.clear();
            return true;
        }

        if let Some(pending) = self.controller.send_message(&mut self.input) {
            self.tasks.spawn(pending.complete());
        }
        false
    }
}

fn log_join(joined: Result<Outcome, JoinError>) {
    if let Err(e) = joined {
        tracing::error!(error = %e, "Request task failed");
    }
}

/// Plain-text rendering of a transcript change, or `None` if nothing should
/// be printed.
#[must_use]
pub fn render_event(event: &TranscriptEvent) -> Option<String> {
    let TranscriptEvent::Appended(node) = event else {
        return None;
    };
    let text = match node.kind {
        NodeKind::Welcome => format!("{}\n\n", node.source),
        NodeKind::Message(Role::User) => format!("you> {}\n", node.source),
        NodeKind::Message(Role::Assistant) | NodeKind::Placeholder => {
            format!("entity> {}\n", node.source)
        }
    };
    Some(text)
}
