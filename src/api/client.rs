//! HTTP backend built on reqwest.

use std::time::Duration;

use url::Url;

use super::{ChatBackend, ChatReply, ChatRequest, ExecuteReply, ExecuteRequest, ProcessInfo};
use crate::config::ServerConfig;
use crate::error::{Error, Result};

/// HTTP client for the chat backend.
///
/// # Example
///
/// ```rust,no_run
/// use entity_chat::api::{ChatBackend, ChatRequest, HttpBackend};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = HttpBackend::new("http://localhost:8000")?;
/// let reply = backend
///     .chat(&ChatRequest { message: "Hello!".into(), history: vec![] })
///     .await?;
/// println!("{:?}", reply.text());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    chat_url: Url,
    execute_url: Url,
    processes_url: Url,
    timeout: Option<Duration>,
}

impl HttpBackend {
    /// Create a backend with the default endpoint paths and no timeout.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::from_config(&ServerConfig {
            base_url: base_url.as_ref().to_string(),
            ..ServerConfig::default()
        })
    }

    /// Create a backend from server settings.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Create a backend with a custom reqwest client.
    pub fn with_client(config: &ServerConfig, http: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        Ok(Self {
            http,
            chat_url: base_url.join(&config.chat_path)?,
            execute_url: base_url.join(&config.execute_path)?,
            processes_url: base_url.join(&config.processes_path)?,
            timeout: config.request_timeout_secs.map(Duration::from_secs),
        })
    }

    /// URL of the chat endpoint.
    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> Result<T> {
        let request = match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        };
        let response = request
            .send()
            .await
            .map_err(|e| Error::from_transport(e, url))?;

        // The status is not interpreted: error bodies that still decode are
        // handled by the caller like any other reply.
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "Backend returned error status");
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::from_transport(e, url))?;
        tracing::debug!(url = %url, status = status.as_u16(), body_len = body.len(), "Backend response received");
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait::async_trait]
impl ChatBackend for HttpBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        let builder = self.http.post(self.chat_url.clone()).json(request);
        self.send(builder, &self.chat_url).await
    }

    async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteReply> {
        let builder = self.http.post(self.execute_url.clone()).json(request);
        self.send(builder, &self.execute_url).await
    }

    async fn list_processes(&self) -> Result<Vec<ProcessInfo>> {
        let builder = self.http.get(self.processes_url.clone());
        self.send(builder, &self.processes_url).await
    }
}
