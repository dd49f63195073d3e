//! Core type definitions for SSE event handling.

use std::{fmt, sync::Arc};

use super::Event;
use crate::error::TransportError;

/// Classification of incoming SSE events.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum SseMessageKind {
    /// A data event (has event type + data payload).
    Data,
    /// System/control event (heartbeat, ping).
    System,
    /// Retry directive from server.
    Retry,
    /// The server's end-of-stream sentinel.
    Eof,
}

impl SseMessageKind {
    /// Returns true if this is a data event.
    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data)
    }

    /// Returns true if this is a system-level event.
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }

    /// Returns true if this is a retry directive.
    pub fn is_retry(&self) -> bool {
        matches!(self, Self::Retry)
    }

    /// Returns true if this is the end-of-stream sentinel.
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }
}

impl fmt::Display for SseMessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data => write!(f, "Data"),
            Self::System => write!(f, "System"),
            Self::Retry => write!(f, "Retry"),
            Self::Eof => write!(f, "Eof"),
        }
    }
}

/// A raw SSE event together with its classification.
#[derive(Clone, Debug)]
pub struct SseEvent {
    /// The raw SSE event.
    pub raw: Event,
    /// Classified message kind.
    pub kind: SseMessageKind,
}

impl SseEvent {
    /// Create a new SSE event with the given raw event and kind.
    pub fn new(raw: Event, kind: SseMessageKind) -> Self {
        Self { raw, kind }
    }

    /// Convenience accessor for the event's data field.
    pub fn data(&self) -> &str {
        &self.raw.data
    }

    /// Convenience accessor for the event type field.
    pub fn event_type(&self) -> &str {
        &self.raw.event
    }

    /// Convenience accessor for the event ID field.
    pub fn id(&self) -> &str {
        &self.raw.id
    }

    /// Convenience accessor for the retry duration, if present.
    pub fn retry(&self) -> Option<std::time::Duration> {
        self.raw.retry
    }
}

/// Lifecycle notifications delivered by an [`SseStream`](super::SseStream),
/// in the order the transport produced them.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum StreamEvent {
    /// A connection attempt succeeded; the retry count is back to zero.
    Open,
    /// An event arrived on the open stream.
    ///
    /// Events with an empty data buffer (bare `retry:` directives,
    /// keep-alives) are consumed by the connection and never delivered.
    Message(SseEvent),
    /// A connection attempt failed or an open stream broke.
    ///
    /// `retry_count` is the number of consecutive failures that preceded
    /// this one.
    Error {
        /// What went wrong.
        error: Arc<TransportError>,
        /// Consecutive failures before this one.
        retry_count: u32,
    },
    /// The server ended the stream on purpose. Nothing follows until
    /// [`SseHandle::reconnect`](super::SseHandle::reconnect).
    Eof,
}

impl StreamEvent {
    /// Returns the message payload if this is a [`StreamEvent::Message`].
    pub fn as_message(&self) -> Option<&SseEvent> {
        match self {
            Self::Message(event) => Some(event),
            _ => None,
        }
    }

    /// Returns true if this is [`StreamEvent::Open`].
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns true if this is [`StreamEvent::Error`].
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Returns true if this is [`StreamEvent::Eof`].
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }
}
