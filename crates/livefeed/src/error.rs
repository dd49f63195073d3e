//! Error handling for stream connections.

use thiserror::Error;

/// The main result type used throughout the crate.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors produced while establishing or reading a stream connection.
///
/// None of these are ever returned from [`SseHandle`](crate::sse::SseHandle)
/// operations; transport failures reach callers only as
/// [`StreamEvent::Error`](crate::sse::StreamEvent::Error).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TransportError {
    /// HTTP request errors (wraps reqwest::Error)
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered the stream request with a non-2xx status
    #[error("SSE request rejected: status={status}")]
    SseInvalidStatus { status: http::StatusCode },

    /// The server answered with something other than `text/event-stream`
    #[error("SSE response has unexpected content type: {content_type}")]
    SseInvalidContentType { content_type: String },

    /// The event stream body could not be read or parsed
    #[error("SSE stream error: {message}")]
    SseParse { message: String },

    /// The server closed the stream without sending the end-of-stream event
    #[error("SSE stream ended unexpectedly")]
    SseStreamEnded,

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Timeout errors
    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },
}

impl TransportError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(duration: std::time::Duration) -> Self {
        Self::Timeout { duration }
    }

    /// Create an invalid-status error for a stream request.
    pub fn sse_invalid_status(status: http::StatusCode) -> Self {
        Self::SseInvalidStatus { status }
    }

    /// Create an invalid-content-type error for a stream response.
    pub fn sse_invalid_content_type(content_type: impl Into<String>) -> Self {
        Self::SseInvalidContentType {
            content_type: content_type.into(),
        }
    }

    /// Create a stream read/parse error.
    pub fn sse_parse(message: impl Into<String>) -> Self {
        Self::SseParse {
            message: message.into(),
        }
    }

    /// Create an unexpected end-of-stream error.
    pub fn sse_stream_ended() -> Self {
        Self::SseStreamEnded
    }
}
