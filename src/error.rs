//! Error types for backend requests.
//!
//! Every variant ends up in the transcript as an `Error: <message>` bubble,
//! so the transport variants display only the underlying description.

use thiserror::Error;

/// Client error type.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The backend could not be reached at all.
    #[error("{0}")]
    Unavailable(String),

    /// The response body was not the JSON we expected.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// Invalid base URL or endpoint path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The configured request timeout elapsed.
    #[error("request timed out")]
    Timeout,
}

impl Error {
    /// Classify a transport error from reqwest.
    ///
    /// Connection failures get a short human-readable description, the way a
    /// browser reports `Failed to fetch`.
    pub(crate) fn from_transport(err: reqwest::Error, url: &url::Url) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Unavailable(format!("could not connect to {url}"))
        } else {
            Self::Http(err)
        }
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
