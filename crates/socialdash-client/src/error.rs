use serde::Serialize;
use thiserror::Error;

/// Errors returned by the analytics API client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        data: Option<serde_json::Value>,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    /// A file was rejected before upload.
    #[error("cannot upload '{name}': {reason}")]
    InvalidFile { name: String, reason: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Flattened error shape handed to display slots and notifications.
///
/// All failures are treated alike; nothing here marks an error as retryable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedError {
    pub status: Option<u16>,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl ClientError {
    #[must_use]
    pub fn normalized(&self) -> NormalizedError {
        match self {
            ClientError::Api {
                status,
                message,
                data,
            } => NormalizedError {
                status: Some(*status),
                message: message.clone(),
                data: data.clone(),
            },
            ClientError::Http(e) => NormalizedError {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
                data: None,
            },
            other => NormalizedError {
                status: None,
                message: other.to_string(),
                data: None,
            },
        }
    }
}
