//! Server-Sent Events (SSE) stream connections.
//!
//! This module provides a long-lived, self-healing SSE subscription:
//!
//! - **Auto-Reconnection**: failed attempts are retried after
//!   `reconnect_interval` (constant by default, exponential on request) up to
//!   an optional retry budget.
//! - **Deterministic lifecycle**: callers receive an ordered stream of
//!   [`StreamEvent`]s (`Open`, `Message`, `Error`, `Eof`) and nothing from a
//!   session after it was closed or restarted.
//! - **End of stream**: the server's `EOF` event finishes the subscription
//!   instead of triggering a retry.
//! - **Protocol Abstraction**: event classification and retry vetoes via the
//!   [`SseProtocolHandler`] trait.
//! - **Transport Abstraction**: HTTP by default ([`HttpTransport`]), anything
//!   implementing [`SseTransport`] otherwise.
//!
//! # Architecture
//!
//! ```text
//! SseConnection::open(config, handler)
//!   └─ spawns background task ──► tokio::spawn(Driver::run)
//!        │                              │  owns transport + retry timer
//!        ├── SseHandle ◄─── mpsc ◄──────┤  (close / reconnect)
//!        │                              │
//!        └── SseStream ◄─── mpsc ◄──────┘  (StreamEvent items)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use livefeed::sse::{SseConfig, SseConnection, StreamEvent, handlers::GenericSseHandler};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SseConfig::new("https://console.example.com/api/deploys/42/logs")
//!     .with_credentials(true)
//!     .reconnect_interval(Duration::from_secs(5))
//!     .max_retries(Some(10));
//!
//! let connection = SseConnection::open(config, GenericSseHandler::new())?;
//! let (handle, mut stream) = connection.split();
//!
//! while let Some(event) = stream.next_event().await {
//!     match event {
//!         StreamEvent::Message(message) => println!("{}", message.data()),
//!         StreamEvent::Error { error, retry_count } => {
//!             eprintln!("stream error (retry {retry_count}): {error}");
//!         }
//!         StreamEvent::Eof => break,
//!         _ => {}
//!     }
//! }
//! handle.close();
//! # Ok(())
//! # }
//! ```

mod config;
pub mod connection;
pub mod handlers;
mod protocol;
pub mod transport;
mod types;

pub use config::SseConfig;
pub use connection::{SseConnection, SseConnectionState, SseHandle, SseStream};
pub use eventsource_stream::Event;
pub use protocol::SseProtocolHandler;
#[cfg(feature = "http")]
pub use transport::HttpTransport;
pub use transport::{SseEventStream, SseRequest, SseTransport};
pub use types::{SseEvent, SseMessageKind, StreamEvent};
