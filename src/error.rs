//! Error types for remove.bg submissions

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for remove.bg operations
pub type Result<T> = std::result::Result<T, RemoveBgError>;

/// Error types surfaced by option validation, request submission and result writing
#[derive(Error, Debug)]
pub enum RemoveBgError {
    /// An enum-typed option holds a value outside its allowed set
    #[error("Invalid option '{field}': '{value}' (allowed: {allowed})")]
    InvalidOption {
        field: &'static str,
        value: String,
        allowed: String,
    },

    /// Client construction problems (empty API key, bad endpoint, ...)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Local file open/read/write failures
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level failure while talking to the service
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with an error document
    #[error("remove.bg API error ({status}): {title}")]
    Api { status: StatusCode, title: String },

    /// The service answered with an error whose body could not be decoded
    #[error("Malformed error response ({status}): {reason}")]
    MalformedResponse { status: StatusCode, reason: String },
}

impl RemoveBgError {
    /// Create an invalid option error listing the allowed values
    pub fn invalid_option<T: std::fmt::Display>(
        field: &'static str,
        value: &str,
        allowed: &[T],
    ) -> Self {
        let allowed = allowed
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Self::InvalidOption {
            field,
            value: value.to_string(),
            allowed,
        }
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create network error with context
    pub fn network_error<S: AsRef<str>, E: std::fmt::Display>(context: S, error: E) -> Self {
        Self::Network(format!("{}: {}", context.as_ref(), error))
    }

    /// Create a malformed response error
    pub fn malformed_response<S: Into<String>>(status: StatusCode, reason: S) -> Self {
        Self::MalformedResponse {
            status,
            reason: reason.into(),
        }
    }

    /// Whether this error was raised before any network activity by option validation
    #[must_use]
    pub fn is_invalid_option(&self) -> bool {
        matches!(self, Self::InvalidOption { .. })
    }

    /// The title reported by the service, if this is an API error
    #[must_use]
    pub fn api_title(&self) -> Option<&str> {
        match self {
            Self::Api { title, .. } => Some(title),
            _ => None,
        }
    }
}
