//! Chat UI controller.
//!
//! The controller turns a submission into exactly one backend request and
//! renders the result into the [`Transcript`]. Submission is split in two
//! phases:
//!
//! 1. [`ChatController::send_message`] runs synchronously: it clears the
//!    input, drops the welcome banner, shows the user bubble and the request's
//!    placeholder, and snapshots the request body.
//! 2. [`PendingRequest::complete`] awaits the backend and renders the reply.
//!
//! Nothing serializes phase 2. Front-ends may run several pending requests at
//! once; each one only touches its own placeholder, and history appends land
//! in completion order.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use entity_chat::api::HttpBackend;
//! use entity_chat::controller::ChatController;
//! use entity_chat::input::InputField;
//! use entity_chat::transcript::Transcript;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = Arc::new(HttpBackend::new("http://localhost:8000")?);
//! let controller = ChatController::new(backend, Transcript::new());
//!
//! let mut input = InputField::new();
//! input.set_value("run: uname -a");
//! if let Some(pending) = controller.send_message(&mut input) {
//!     pending.complete().await;
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::api::{ChatBackend, ChatRequest, ExecuteRequest};
use crate::input::InputField;
use crate::markup::fenced_block;
use crate::session::{History, Role};
use crate::transcript::{NodeId, Placeholder, Transcript};

/// Placeholder text while waiting for a chat reply.
pub const TYPING_LABEL: &str = "Typing...";

/// Placeholder text while waiting for a command.
pub const EXECUTING_LABEL: &str = "Executing...";

/// Shown when a command printed nothing.
pub const NO_OUTPUT_MESSAGE: &str = "Command executed successfully (no output).";

/// Prefix that turns a submission into a shell command.
const COMMAND_PREFIX: &str = "run:";

/// Command name served by the processes endpoint when enabled.
const LIST_PROCESSES_COMMAND: &str = "list_processes";

/// Fence language of command output blocks.
const SHELL_LANG: &str = "bash";

/// Destination of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Plain chat message, sent as-is.
    Chat(String),
    /// Shell command, with the `run:` prefix stripped and trimmed.
    Execute(String),
}

/// Route a trimmed submission.
///
/// A case-insensitive `run:` prefix selects the execute flow.
#[must_use]
pub fn route(text: &str) -> Route {
    match text.get(..COMMAND_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(COMMAND_PREFIX) => {
            Route::Execute(text[COMMAND_PREFIX.len()..].trim().to_string())
        }
        _ => Route::Chat(text.to_string()),
    }
}

/// Final state of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A reply was rendered.
    Replied,
    /// The backend answered without the expected field; nothing was rendered.
    Empty,
    /// The request failed; an error bubble was rendered.
    Failed(String),
}

/// Chat UI controller.
///
/// Cloning is cheap and all clones share the same history and transcript.
#[derive(Debug, Clone)]
pub struct ChatController {
    backend: Arc<dyn ChatBackend>,
    history: History,
    transcript: Transcript,
    list_processes_builtin: bool,
}

impl ChatController {
    /// Create a controller over the given backend and transcript.
    pub fn new(backend: Arc<dyn ChatBackend>, transcript: Transcript) -> Self {
        Self {
            backend,
            history: History::new(),
            transcript,
            list_processes_builtin: false,
        }
    }

    /// Serve `run: list_processes` from the processes endpoint.
    #[must_use]
    pub fn with_process_listing(mut self, enabled: bool) -> Self {
        self.list_processes_builtin = enabled;
        self
    }

    /// Conversation history.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Transcript the controller renders into.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Submit the current input.
    ///
    /// Returns `None` without touching anything when the trimmed input is
    /// empty. Otherwise the input is cleared, the user bubble and the request
    /// placeholder are shown, and the returned request is ready to be awaited.
    pub fn send_message(&self, input: &mut InputField) -> Option<PendingRequest> {
        let text = input.take_submission()?;

        self.transcript.remove_welcome();
        self.transcript.add_message(&text, Role::User);

        let (label, kind) = match route(&text) {
            Route::Execute(command)
                if self.list_processes_builtin
                    && command.eq_ignore_ascii_case(LIST_PROCESSES_COMMAND) =>
            {
                (EXECUTING_LABEL, RequestKind::ListProcesses)
            }
            Route::Execute(command) => (
                EXECUTING_LABEL,
                RequestKind::Execute(ExecuteRequest { command }),
            ),
            Route::Chat(message) => (
                TYPING_LABEL,
                RequestKind::Chat(ChatRequest {
                    message,
                    history: self.history.snapshot(),
                }),
            ),
        };

        let pending = self.pending(label, kind);
        let request_id = pending.id();
        match &pending.kind {
            RequestKind::Chat(req) => tracing::info!(
                request_id = %request_id,
                message_len = req.message.len(),
                history_len = req.history.len(),
                "Dispatching chat message"
            ),
            RequestKind::Execute(req) => tracing::info!(
                request_id = %request_id,
                command_len = req.command.len(),
                "Dispatching command"
            ),
            RequestKind::ListProcesses => {
                tracing::info!(request_id = %request_id, "Dispatching process listing");
            }
        }
        Some(pending)
    }

    fn pending(&self, label: &str, kind: RequestKind) -> PendingRequest {
        PendingRequest {
            controller: self.clone(),
            placeholder: self.transcript.add_placeholder(label),
            kind,
        }
    }

    fn show_error(&self, err: &crate::error::Error) -> Outcome {
        let message = err.to_string();
        self.transcript
            .add_message(&format!("Error: {message}"), Role::Assistant);
        Outcome::Failed(message)
    }

    fn show_output(&self, output: &str) {
        let output = if output.is_empty() {
            NO_OUTPUT_MESSAGE
        } else {
            output
        };
        self.transcript
            .add_message(&fenced_block(SHELL_LANG, output), Role::Assistant);
    }
}

#[derive(Debug)]
enum RequestKind {
    Chat(ChatRequest),
    Execute(ExecuteRequest),
    ListProcesses,
}

/// A dispatched request whose reply has not been rendered yet.
///
/// Dropping it without calling [`PendingRequest::complete`] leaves the
/// placeholder in the transcript, like a request that never returns.
#[derive(Debug)]
pub struct PendingRequest {
    controller: ChatController,
    placeholder: Placeholder,
    kind: RequestKind,
}

impl PendingRequest {
    /// Request ID, shared with the placeholder node and every log event of
    /// this request.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.placeholder.id()
    }

    /// Route this request was dispatched to.
    pub fn route(&self) -> Route {
        match &self.kind {
            RequestKind::Chat(req) => Route::Chat(req.message.clone()),
            RequestKind::Execute(req) => Route::Execute(req.command.clone()),
            RequestKind::ListProcesses => Route::Execute(LIST_PROCESSES_COMMAND.to_string()),
        }
    }

    /// Await the backend and render the result.
    pub async fn complete(self) -> Outcome {
        let Self {
            controller,
            placeholder,
            kind,
        } = self;
        let request_id = placeholder.id();

        let outcome = match kind {
            RequestKind::Chat(request) => {
                let result = controller.backend.chat(&request).await;
                placeholder.remove();
                match result {
                    Ok(reply) => match reply.text() {
                        Some(text) => {
                            controller.transcript.add_message(text, Role::Assistant);
                            controller.history.record_exchange(request.message, text);
                            Outcome::Replied
                        }
                        None => Outcome::Empty,
                    },
                    Err(e) => controller.show_error(&e),
                }
            }
            RequestKind::Execute(request) => {
                let result = controller.backend.execute(&request).await;
                placeholder.remove();
                match result {
                    Ok(reply) => {
                        tracing::debug!(
                            request_id = %request_id,
                            return_code = ?reply.return_code,
                            "Command finished"
                        );
                        controller.show_output(&reply.combined_output());
                        Outcome::Replied
                    }
                    Err(e) => controller.show_error(&e),
                }
            }
            RequestKind::ListProcesses => {
                let result = controller.backend.list_processes().await;
                placeholder.remove();
                match result {
                    Ok(processes) => {
                        let listing = processes
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join("\n");
                        controller.show_output(&listing);
                        Outcome::Replied
                    }
                    Err(e) => controller.show_error(&e),
                }
            }
        };

        match &outcome {
            Outcome::Failed(message) => {
                tracing::error!(request_id = %request_id, error = %message, "Request failed");
            }
            other => {
                tracing::info!(request_id = %request_id, outcome = ?other, "Request completed");
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_plain_chat() {
        assert_eq!(route("hello"), Route::Chat("hello".to_string()));
        assert_eq!(route("runner: go"), Route::Chat("runner: go".to_string()));
        assert_eq!(route("ru"), Route::Chat("ru".to_string()));
    }

    #[test]
    fn test_route_prefix_is_case_insensitive() {
        assert_eq!(route("run: ls -l"), Route::Execute("ls -l".to_string()));
        assert_eq!(route("RUN: echo hi"), Route::Execute("echo hi".to_string()));
        assert_eq!(route("Run:pwd"), Route::Execute("pwd".to_string()));
    }

    #[test]
    fn test_route_bare_prefix_gives_empty_command() {
        assert_eq!(route("run:"), Route::Execute(String::new()));
    }

    #[test]
    fn test_route_multibyte_input() {
        assert_eq!(route("ñañ"), Route::Chat("ñañ".to_string()));
    }
}
