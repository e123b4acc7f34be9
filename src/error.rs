//! Error types for assistant runs
//!
//! Run-level failures (transport, malformed stream payloads, timeouts) propagate
//! to the caller of [`Thread::run`](crate::Thread::run). Per-call failures
//! (`ToolNotFound`, `Tool`, argument `Decode`) are rendered into tool output text
//! by the run loop and never reach the caller.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Non-success response from the remote API
    #[error("API error: {0}")]
    Api(String),

    /// SSE framing error while reading a streaming body
    #[error("Streaming error: {0}")]
    Stream(String),

    /// Malformed stream payload or tool arguments
    #[error("Decode error: {0}")]
    Decode(String),

    /// No handler registered under the requested tool name.
    ///
    /// The display text is the diagnostic submitted back to the run.
    #[error("Tool {0} not a known function")]
    ToolNotFound(String),

    /// Tool handler failure
    #[error("Tool execution error: {0}")]
    Tool(String),

    /// A stream record did not arrive before the configured deadline
    #[error("Request timeout")]
    Timeout,

    /// The run was cancelled through its interrupt handle
    #[error("Run interrupted")]
    Interrupted,
}

impl Error {
    /// Create a new config error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a new API error
    pub fn api(msg: impl Into<String>) -> Self {
        Error::Api(msg.into())
    }

    /// Create a new stream error
    pub fn stream(msg: impl Into<String>) -> Self {
        Error::Stream(msg.into())
    }

    /// Create a new decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Error::Decode(msg.into())
    }

    /// Create a tool-not-found error
    pub fn tool_not_found(name: impl Into<String>) -> Self {
        Error::ToolNotFound(name.into())
    }

    /// Create a new tool error
    pub fn tool(msg: impl Into<String>) -> Self {
        Error::Tool(msg.into())
    }

    /// Create a timeout error
    pub fn timeout() -> Self {
        Error::Timeout
    }

    /// Returns true for failures of a remote call.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Api(_) | Error::Stream(_))
    }
}
