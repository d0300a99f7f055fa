// Error types shared by the library.
// - `ApiError` is what every `FileStoreClient` call returns on failure.
// - `UsageError` is raised before any request when a one-shot action is
//   missing a required flag.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered with a 4xx/5xx status. `body` is the raw
    /// response text, unparsed.
    #[error("HTTP Error {status}: {body}")]
    Http { status: u16, body: String },
    /// Connection, timeout or body-read failure. The request URL is
    /// stripped because it carries the API key.
    #[error("Request failed")]
    Transport(#[source] reqwest::Error),
    #[error("Invalid JSON from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },
    #[error("Cannot read {path}: {source}")]
    File {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.without_url())
    }
}

impl ApiError {
    /// HTTP status of the failed call, when the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Usage: {usage}")]
pub struct UsageError {
    pub usage: String,
}

impl UsageError {
    pub fn new(usage: impl Into<String>) -> Self {
        UsageError {
            usage: usage.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_message_carries_status_and_body() {
        let err = ApiError::Http {
            status: 404,
            body: r#"{"error":{"code":404}}"#.into(),
        };
        assert_eq!(err.to_string(), r#"HTTP Error 404: {"error":{"code":404}}"#);
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn usage_error_display() {
        let err = UsageError::new("filestore --action=list");
        assert_eq!(err.to_string(), "Usage: filestore --action=list");
    }
}
