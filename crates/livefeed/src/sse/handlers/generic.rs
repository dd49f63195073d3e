//! Generic SSE protocol handler implementation.
//!
//! [`GenericSseHandler`] classifies events based on simple heuristics:
//! - Events whose type is the end-of-stream name → [`SseMessageKind::Eof`]
//! - Events with only a retry field → [`SseMessageKind::Retry`]
//! - Events with non-empty data → [`SseMessageKind::Data`]
//! - Everything else → [`SseMessageKind::System`]

use std::borrow::Cow;

use crate::sse::{Event, protocol::SseProtocolHandler, types::SseMessageKind};

/// Event type the server uses to announce the end of the stream.
pub const DEFAULT_EOF_EVENT: &str = "EOF";

/// A generic SSE handler that classifies events using simple heuristics.
#[derive(Clone, Debug)]
pub struct GenericSseHandler {
    eof_event: Cow<'static, str>,
}

impl Default for GenericSseHandler {
    fn default() -> Self {
        Self {
            eof_event: Cow::Borrowed(DEFAULT_EOF_EVENT),
        }
    }
}

impl GenericSseHandler {
    /// Create a handler that treats `EOF` events as the end of the stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different event type as the end-of-stream sentinel.
    #[must_use]
    pub fn with_eof_event(mut self, event: impl Into<Cow<'static, str>>) -> Self {
        self.eof_event = event.into();
        self
    }

    /// The event type treated as end-of-stream.
    pub fn eof_event(&self) -> &str {
        &self.eof_event
    }
}

impl SseProtocolHandler for GenericSseHandler {
    fn classify_event(&self, event: &Event) -> SseMessageKind {
        if event.event == self.eof_event {
            return SseMessageKind::Eof;
        }

        if event.retry.is_some() && event.data.is_empty() {
            return SseMessageKind::Retry;
        }

        if !event.data.is_empty() {
            return SseMessageKind::Data;
        }

        // Heartbeat / system events (empty data, no retry)
        SseMessageKind::System
    }
}
