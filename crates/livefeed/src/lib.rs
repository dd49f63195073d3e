//! # livefeed
//!
//! Long-lived, auto-recovering Server-Sent Events subscriptions.
//!
//! A console that follows deploy logs or job progress needs a live feed that
//! survives network flakiness without ever running two connections at once,
//! and that tells it unambiguously when the server is done. This crate
//! provides exactly that as a small connection-lifecycle manager.
//!
//! ## Features
//!
//! - **Automatic retry**: fixed or exponential delays, bounded or unbounded
//!   retry budget
//! - **Single owner**: one background task owns the transport and the retry
//!   timer; at most one of each exists at a time
//! - **Manual control**: synchronous, idempotent `close()` and `reconnect()`
//! - **Ordered notifications**: `Open` / `Message` / `Error` / `Eof` delivered
//!   as a [`Stream`](futures_util::Stream)
//! - **Observability**: structured `tracing` logs for every transition
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use livefeed::sse::{SseConfig, SseConnection, StreamEvent, handlers::GenericSseHandler};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SseConfig::new("https://console.example.com/api/jobs/7/progress");
//!     let mut connection = SseConnection::open(config, GenericSseHandler::new())?;
//!
//!     while let Some(event) = connection.next_event().await {
//!         if let StreamEvent::Message(message) = event {
//!             println!("{}", message.data());
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod reconnect;
pub mod sse;

pub use error::{TransportError, TransportResult};
pub use reconnect::ReconnectPolicy;
pub use sse::{
    SseConfig, SseConnection, SseConnectionState, SseHandle, SseProtocolHandler, SseStream,
    StreamEvent,
};
