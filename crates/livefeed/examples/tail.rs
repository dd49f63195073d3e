//! Tail an SSE endpoint
//!
//! Follows a live feed (deploy logs, job progress, ...) and prints every
//! event until the server sends `EOF` or Ctrl-C is pressed.
//!
//! Run with: `cargo run -p livefeed --example tail -- http://localhost:8080/api/deploys/1/logs`
//!
//! Set `RUST_LOG=livefeed=debug` to watch the connection lifecycle.

use std::time::Duration;

use livefeed::{
    ReconnectPolicy,
    sse::{SseConfig, SseConnection, StreamEvent, handlers::GenericSseHandler},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let url = std::env::args()
        .nth(1)
        .ok_or("usage: tail <url> [max-retries]")?;
    let max_retries = std::env::args().nth(2).map(|n| n.parse()).transpose()?;

    let config = SseConfig::new(url)
        .reconnect_interval(Duration::from_secs(1))
        .reconnect_policy(ReconnectPolicy::exponential(Duration::from_secs(30)))
        .max_retries(max_retries);

    let connection = SseConnection::open(config, GenericSseHandler::new())?;
    let (handle, mut stream) = connection.split();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                handle.close();
                break;
            }
            event = stream.next_event() => match event {
                Some(StreamEvent::Open) => info!("connected"),
                Some(StreamEvent::Message(message)) => {
                    println!("[{}] {}", message.event_type(), message.data());
                }
                Some(StreamEvent::Error { error, retry_count }) => {
                    eprintln!("stream error after {retry_count} retries: {error}");
                }
                Some(StreamEvent::Eof) => {
                    info!("server finished the stream");
                    break;
                }
                Some(_) => {}
                None => break,
            },
        }
    }

    Ok(())
}
