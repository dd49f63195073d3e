//! Protocol handler trait for SSE event classification.

use super::Event;
use crate::{error::TransportError, sse::types::SseMessageKind};

/// Trait for handling application-specific SSE protocol details.
///
/// Implementors classify incoming SSE events (including which event marks the
/// end of the stream), react to connection lifecycle transitions, and decide
/// whether reconnection should occur after errors.
///
/// SSE connections are read-only (server → client); the handler only observes
/// and classifies.
pub trait SseProtocolHandler: Send + Sync + 'static {
    /// Classify an incoming SSE event into a [`SseMessageKind`].
    ///
    /// Returning [`SseMessageKind::Eof`] ends the stream cleanly: the
    /// connection closes itself and does not reconnect.
    fn classify_event(&self, event: &Event) -> SseMessageKind;

    /// Called when a connection is successfully established (or re-established).
    fn on_connect(&self) {}

    /// Called when a connection is lost or closed.
    fn on_disconnect(&self) {}

    /// Determine whether the connection should be retried after the given error.
    ///
    /// Default implementation returns `true` for all errors (always retry).
    fn should_retry(&self, _error: &TransportError) -> bool {
        true
    }
}
