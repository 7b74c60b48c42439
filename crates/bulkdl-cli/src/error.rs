//! Error types for the bulkdl CLI
//!
//! Messages are user-facing. Errors that come back from the platform keep the
//! server's own message separately so the download dialog can show it verbatim.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// The platform answered with a non-success status
    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },

    /// The platform answered 2xx but the payload reported a failure
    #[error("Server error: {0}")]
    Api(String),

    /// GraphQL `errors[]` were present in the response
    #[error("GraphQL error: {0}")]
    Graphql(String),

    /// A response was missing a field the caller relies on
    #[error("Unexpected response from {endpoint}: {detail}")]
    UnexpectedResponse { endpoint: String, detail: String },

    /// HTTP request failed
    #[error("Network request failed: {0}. Check your internet connection and server URL.")]
    Http(#[from] reqwest::Error),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables or bulkdl.toml.")]
    Config(String),

    /// Invalid user input on the command line or in a selection file
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Shared(#[from] bulkdl_common::BulkdlError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn unexpected_response(endpoint: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            endpoint: endpoint.into(),
            detail: detail.into(),
        }
    }

    /// The message the platform itself attached to this failure, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server { message, .. } | Self::Api(message) | Self::Graphql(message) => {
                Some(message.as_str()).filter(|m| !m.is_empty())
            }
            _ => None,
        }
    }
}
