//! Backend API: wire types and the transport trait.
//!
//! The controller talks to the backend only through [`ChatBackend`], which
//! mirrors the server's JSON endpoints one method per route.
//!
//! # Endpoints
//!
//! - `POST /api/chat`: [`ChatRequest`] → [`ChatReply`]
//! - `POST /api/execute`: [`ExecuteRequest`] → [`ExecuteReply`]
//! - `GET /api/processes`: → `Vec<`[`ProcessInfo`]`>`
//!
//! [`HttpBackend`] is the reqwest implementation.

pub mod client;

pub use client::HttpBackend;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::TranscriptEntry;

/// Body of a chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,
    /// All previous exchanges, oldest first.
    pub history: Vec<TranscriptEntry>,
}

/// Reply from the chat endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    /// Assistant message, if the server produced one.
    #[serde(default)]
    pub response: Option<String>,
}

impl ChatReply {
    /// The assistant text, treating an empty string like a missing field.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.response.as_deref().filter(|s| !s.is_empty())
    }
}

/// Body of a command execution request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecuteRequest {
    /// Shell command line.
    pub command: String,
}

/// Reply from the execute endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExecuteReply {
    /// Captured standard output.
    #[serde(default)]
    pub stdout: Option<String>,
    /// Captured standard error.
    #[serde(default)]
    pub stderr: Option<String>,
    /// Exit status of the command.
    #[serde(default)]
    pub return_code: Option<i32>,
}

impl ExecuteReply {
    /// Combined transcript text for the command.
    ///
    /// Standard output comes first; standard error follows after an
    /// `Error:` header. Empty streams count as absent.
    #[must_use]
    pub fn combined_output(&self) -> String {
        let mut output = String::new();
        if let Some(stdout) = self.stdout.as_deref().filter(|s| !s.is_empty()) {
            output.push_str(stdout);
        }
        if let Some(stderr) = self.stderr.as_deref().filter(|s| !s.is_empty()) {
            output.push_str("\nError:\n");
            output.push_str(stderr);
        }
        output
    }
}

/// A process reported by the backend host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProcessInfo {
    /// Process ID.
    pub pid: u32,
    /// Executable name.
    pub name: String,
    /// Owning user, when the host can tell.
    #[serde(default)]
    pub username: Option<String>,
}

impl std::fmt::Display for ProcessInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PID: {}, Name: {}, User: {}",
            self.pid,
            self.name,
            self.username.as_deref().unwrap_or("None")
        )
    }
}

/// Transport to the chat backend.
///
/// Implementations issue exactly one request per call and do not retry.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync + std::fmt::Debug {
    /// Send a chat message along with the prior history.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply>;

    /// Run a shell command on the backend host.
    async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteReply>;

    /// List processes running on the backend host.
    async fn list_processes(&self) -> Result<Vec<ProcessInfo>>;
}
