//! SSE connection driver implementation.
//!
//! Provides [`SseConnection`], [`SseHandle`], and [`SseStream`] for managing
//! a single auto-reconnecting event stream.
//!
//! All transport work happens on one background task. Caller operations
//! ([`SseHandle::close`], [`SseHandle::reconnect`]) update the shared state
//! under a mutex and then wake the task, so they never wait on I/O. Each
//! close/reconnect starts a new session epoch; events are tagged with the
//! epoch that produced them and [`SseStream`] drops anything from a session
//! that has since been superseded.

use std::{
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use futures_util::{Stream, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::{
    config::SseConfig,
    protocol::SseProtocolHandler,
    transport::{SseEventStream, SseRequest, SseTransport},
    types::{SseEvent, StreamEvent},
};
use crate::error::{TransportError, TransportResult};

// ---------------------------------------------------------------------------
// Connection state
// ---------------------------------------------------------------------------

/// SSE connection state machine states.
///
/// A connection is `Connecting` from the moment it is opened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SseConnectionState {
    /// Attempting to establish a connection.
    Connecting,
    /// Actively receiving events.
    Open,
    /// Waiting out the delay before the next attempt.
    Reconnecting {
        /// Number of consecutive failures so far.
        attempt: u32,
    },
    /// Inert until [`SseHandle::reconnect`].
    Closed,
}

impl SseConnectionState {
    /// Returns `true` if the connection is actively streaming.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns `true` if the connection is in a terminal state.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Shared {
    state: SseConnectionState,
    retry_count: u32,
    manually_closed: bool,
    epoch: u64,
}

impl Shared {
    /// Whether the driver may still act on behalf of session `epoch`.
    fn is_live(&self, epoch: u64) -> bool {
        self.epoch == epoch && !self.manually_closed
    }
}

type SharedState = Arc<Mutex<Shared>>;

#[derive(Debug)]
enum SseCommand {
    Close,
    Reconnect { epoch: u64 },
}

// ---------------------------------------------------------------------------
// Public API: SseConnection
// ---------------------------------------------------------------------------

/// Entry point for SSE connections.
///
/// Call [`open()`](SseConnection::open) to start connecting and then
/// [`split()`](SseConnection::split) to obtain a [`SseHandle`]
/// (for control) and [`SseStream`] (for events).
pub struct SseConnection {
    handle: SseHandle,
    stream: SseStream,
}

impl SseConnection {
    /// Start an SSE connection over HTTP.
    ///
    /// The first connection attempt starts right away on a background task;
    /// this call does not wait for it. An unreachable server shows up later
    /// as [`StreamEvent::Error`], never as an error here.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails, the HTTP client
    /// cannot be built, or no tokio runtime is running.
    #[cfg(feature = "http")]
    pub fn open<H: SseProtocolHandler>(config: SseConfig, handler: H) -> TransportResult<Self> {
        let transport = super::transport::HttpTransport::new(&config)?;
        Self::open_with_transport(config, handler, transport)
    }

    /// Start an SSE connection over a custom transport.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails or no tokio runtime
    /// is running.
    pub fn open_with_transport<H, T>(
        config: SseConfig,
        handler: H,
        transport: T,
    ) -> TransportResult<Self>
    where
        H: SseProtocolHandler,
        T: SseTransport,
    {
        config.validate().map_err(TransportError::config)?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| TransportError::config(format!("No tokio runtime available: {e}")))?;

        let shared = Arc::new(Mutex::new(Shared {
            state: SseConnectionState::Connecting,
            retry_count: 0,
            manually_closed: false,
            epoch: 0,
        }));
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(config.event_channel_capacity);

        let driver = Driver {
            request: SseRequest::from_config(&config),
            config,
            handler,
            transport,
            shared: Arc::clone(&shared),
            cmd_rx,
            event_tx,
        };
        runtime.spawn(driver.run());

        let handle = SseHandle {
            cmd_tx,
            shared: Arc::clone(&shared),
        };
        let stream = SseStream {
            rx: event_rx,
            shared,
        };

        Ok(Self { handle, stream })
    }

    /// Split the connection into a control handle and event stream.
    pub fn split(self) -> (SseHandle, SseStream) {
        (self.handle, self.stream)
    }

    /// Get a reference to the control handle.
    pub fn handle(&self) -> &SseHandle {
        &self.handle
    }

    /// Receive the next lifecycle event.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        self.stream.next_event().await
    }
}

impl Stream for SseConnection {
    type Item = StreamEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        Pin::new(&mut this.stream).poll_next(cx)
    }
}

// ---------------------------------------------------------------------------
// SseHandle
// ---------------------------------------------------------------------------

/// Clone-able handle for controlling a running SSE connection.
///
/// The background task stops once every handle has been dropped.
#[derive(Clone)]
pub struct SseHandle {
    cmd_tx: mpsc::UnboundedSender<SseCommand>,
    shared: SharedState,
}

impl SseHandle {
    /// Close the connection and stop reconnecting.
    ///
    /// Cancels any pending retry and drops the live transport. Once this
    /// returns, the [`SseStream`] yields nothing more from the closed session,
    /// including events that were already buffered. Calling it again is a
    /// no-op.
    pub fn close(&self) {
        {
            let mut shared = self.shared.lock();
            if shared.manually_closed && shared.state.is_closed() {
                return;
            }
            shared.manually_closed = true;
            shared.epoch = shared.epoch.wrapping_add(1);
            shared.state = SseConnectionState::Closed;
        }
        info!("SSE close requested");
        // Nothing to cancel if the task is already gone.
        let _ = self.cmd_tx.send(SseCommand::Close);
    }

    /// Tear down whatever is in flight and connect again immediately.
    ///
    /// Re-arms a closed connection (manual close, end-of-stream, or an
    /// exhausted retry budget) and restarts a live one, discarding its
    /// undelivered events. The retry count starts again from zero.
    pub fn reconnect(&self) {
        let epoch = {
            let mut shared = self.shared.lock();
            shared.manually_closed = false;
            shared.retry_count = 0;
            shared.epoch = shared.epoch.wrapping_add(1);
            shared.state = SseConnectionState::Connecting;
            shared.epoch
        };
        info!("SSE reconnect requested");
        if self.cmd_tx.send(SseCommand::Reconnect { epoch }).is_err() {
            warn!("SSE background task is gone, reconnect ignored");
            self.shared.lock().state = SseConnectionState::Closed;
        }
    }

    /// Current state of the connection.
    pub fn state(&self) -> SseConnectionState {
        self.shared.lock().state.clone()
    }

    /// Consecutive failed attempts since the last successful open.
    pub fn retry_count(&self) -> u32 {
        self.shared.lock().retry_count
    }

    /// Whether automatic reconnection is disabled by [`close`](Self::close)
    /// or a clean end-of-stream.
    pub fn is_manually_closed(&self) -> bool {
        self.shared.lock().manually_closed
    }

    /// Check whether the background task is still running.
    pub fn is_running(&self) -> bool {
        !self.cmd_tx.is_closed()
    }
}

// ---------------------------------------------------------------------------
// SseStream
// ---------------------------------------------------------------------------

/// Stream of [`StreamEvent`]s from an SSE connection.
///
/// Ends once every [`SseHandle`] has been dropped. Dropping the stream stops
/// the connection.
pub struct SseStream {
    rx: mpsc::Receiver<(u64, StreamEvent)>,
    shared: SharedState,
}

impl SseStream {
    /// Receive the next event, waiting until one is available.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        self.next().await
    }
}

impl Stream for SseStream {
    type Item = StreamEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match this.rx.poll_recv(cx) {
                Poll::Ready(Some((epoch, event))) => {
                    if this.shared.lock().epoch == epoch {
                        return Poll::Ready(Some(event));
                    }
                    debug!(epoch, "Dropping event from superseded SSE session");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Internal: background driver
// ---------------------------------------------------------------------------

/// How a session ended.
enum SessionEnd {
    /// Wait for a command before doing anything else.
    Idle,
    /// Start over for the given epoch.
    Restart(u64),
    /// No handles or no consumer left.
    Shutdown,
}

impl SessionEnd {
    fn from_command(cmd: Option<SseCommand>) -> Self {
        match cmd {
            Some(SseCommand::Close) => Self::Idle,
            Some(SseCommand::Reconnect { epoch }) => Self::Restart(epoch),
            None => Self::Shutdown,
        }
    }
}

/// How a single connection attempt ended.
enum AttemptEnd {
    Failed(TransportError),
    Finished(SessionEnd),
}

/// Outcome of handing one event to the consumer.
enum Delivery {
    Sent,
    /// A command arrived, or the consumer went away, before the event was
    /// accepted.
    Interrupted(SessionEnd),
}

/// Retry count to move to after a failure at `current`, or `None` once the
/// budget is spent.
fn next_retry(max_retries: Option<u32>, current: u32) -> Option<u32> {
    match max_retries {
        Some(max) if current >= max => None,
        _ => Some(current.saturating_add(1)),
    }
}

/// The long-lived background task that owns the transport and retry timer.
struct Driver<H, T> {
    config: SseConfig,
    request: SseRequest,
    handler: H,
    transport: T,
    shared: SharedState,
    cmd_rx: mpsc::UnboundedReceiver<SseCommand>,
    event_tx: mpsc::Sender<(u64, StreamEvent)>,
}

impl<H: SseProtocolHandler, T: SseTransport> Driver<H, T> {
    async fn run(mut self) {
        let mut epoch = 0;
        loop {
            let end = self.run_session(epoch).await;
            let end = match end {
                SessionEnd::Idle => self.wait_for_reconnect().await,
                other => other,
            };
            match end {
                SessionEnd::Restart(next) => epoch = next,
                SessionEnd::Idle | SessionEnd::Shutdown => break,
            }
        }
        self.shared.lock().state = SseConnectionState::Closed;
        debug!(url = %self.config.url, "SSE driver stopped");
    }

    /// Park until a reconnect arrives; stale closes are skipped.
    async fn wait_for_reconnect(&mut self) -> SessionEnd {
        loop {
            match SessionEnd::from_command(self.cmd_rx.recv().await) {
                SessionEnd::Idle => continue,
                end => return end,
            }
        }
    }

    /// Connect, stream, and retry for one session until it is closed,
    /// superseded, or runs out of retries.
    async fn run_session(&mut self, epoch: u64) -> SessionEnd {
        let mut server_retry = None;

        loop {
            {
                let mut shared = self.shared.lock();
                if !shared.is_live(epoch) {
                    return SessionEnd::Idle;
                }
                shared.state = SseConnectionState::Connecting;
            }

            let error = match self.attempt(epoch, &mut server_retry).await {
                AttemptEnd::Finished(end) => return end,
                AttemptEnd::Failed(err) => err,
            };
            self.handler.on_disconnect();

            let allow_retry = self.handler.should_retry(&error);
            let (retry_count, next) = {
                let mut shared = self.shared.lock();
                if !shared.is_live(epoch) {
                    return SessionEnd::Idle;
                }
                let current = shared.retry_count;
                let next = if allow_retry {
                    next_retry(self.config.max_retries, current)
                } else {
                    None
                };
                match next {
                    Some(next) => {
                        shared.retry_count = next;
                        shared.state = SseConnectionState::Reconnecting { attempt: next };
                    }
                    None => shared.state = SseConnectionState::Closed,
                }
                (current, next)
            };

            if next.is_some() {
                warn!(url = %self.config.url, error = %error, retry_count, "SSE connection failed");
            } else if allow_retry {
                error!(url = %self.config.url, error = %error, retry_count, "Max SSE retries exceeded");
            } else {
                error!(url = %self.config.url, error = %error, "Handler says no retry, closing");
            }

            let event = StreamEvent::Error {
                error: Arc::new(error),
                retry_count,
            };
            if let Delivery::Interrupted(end) = self.emit(epoch, event).await {
                return end;
            }
            let Some(attempt) = next else {
                return SessionEnd::Idle;
            };

            let delay = self.config.retry_delay(retry_count, server_retry);
            warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                "SSE reconnecting after delay"
            );
            tokio::select! {
                biased;

                cmd = self.cmd_rx.recv() => return SessionEnd::from_command(cmd),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Open one transport and pump its events until it fails or the session
    /// ends. The transport is dropped before this returns.
    async fn attempt(&mut self, epoch: u64, server_retry: &mut Option<Duration>) -> AttemptEnd {
        info!(url = %self.config.url, "SSE connecting");

        let opened = tokio::select! {
            biased;

            cmd = self.cmd_rx.recv() => return AttemptEnd::Finished(SessionEnd::from_command(cmd)),
            opened = self.transport.open(&self.request) => opened,
        };
        let mut events: SseEventStream = match opened {
            Ok(events) => events,
            Err(err) => return AttemptEnd::Failed(err),
        };

        {
            let mut shared = self.shared.lock();
            if !shared.is_live(epoch) {
                // A close or reconnect raced the open; its command is queued.
                return AttemptEnd::Finished(SessionEnd::Idle);
            }
            shared.retry_count = 0;
            shared.state = SseConnectionState::Open;
        }
        info!(url = %self.config.url, "SSE connection established");
        self.handler.on_connect();
        if let Delivery::Interrupted(end) = self.emit(epoch, StreamEvent::Open).await {
            self.handler.on_disconnect();
            return AttemptEnd::Finished(end);
        }

        loop {
            let item = tokio::select! {
                biased;

                cmd = self.cmd_rx.recv() => {
                    self.handler.on_disconnect();
                    return AttemptEnd::Finished(SessionEnd::from_command(cmd));
                }
                item = events.next() => item,
            };

            let raw = match item {
                Some(Ok(raw)) => raw,
                Some(Err(err)) => return AttemptEnd::Failed(err),
                None => return AttemptEnd::Failed(TransportError::sse_stream_ended()),
            };

            if raw.retry.is_some() {
                *server_retry = raw.retry;
            }

            let kind = self.handler.classify_event(&raw);
            debug!(
                event_type = %raw.event,
                id = %raw.id,
                kind = %kind,
                "SSE event received",
            );

            if kind.is_eof() {
                drop(events);
                info!(url = %self.config.url, "SSE stream finished");
                self.handler.on_disconnect();
                {
                    let mut shared = self.shared.lock();
                    if shared.epoch == epoch {
                        shared.manually_closed = true;
                        shared.state = SseConnectionState::Closed;
                    }
                }
                let end = match self.emit(epoch, StreamEvent::Eof).await {
                    Delivery::Sent => SessionEnd::Idle,
                    Delivery::Interrupted(end) => end,
                };
                return AttemptEnd::Finished(end);
            }

            // Nothing to dispatch without data.
            if raw.data.is_empty() {
                continue;
            }

            let event = StreamEvent::Message(SseEvent::new(raw, kind));
            if let Delivery::Interrupted(end) = self.emit(epoch, event).await {
                self.handler.on_disconnect();
                return AttemptEnd::Finished(end);
            }
        }
    }

    /// Deliver an event for `epoch`.
    ///
    /// A full channel must not hold up `close()` or `reconnect()`, so
    /// commands are still served while waiting for room.
    async fn emit(&mut self, epoch: u64, event: StreamEvent) -> Delivery {
        if self.shared.lock().epoch != epoch {
            return Delivery::Sent;
        }
        tokio::select! {
            biased;

            cmd = self.cmd_rx.recv() => Delivery::Interrupted(SessionEnd::from_command(cmd)),
            sent = self.event_tx.send((epoch, event)) => match sent {
                Ok(()) => Delivery::Sent,
                Err(_) => {
                    info!("SSE consumer dropped, shutting down");
                    Delivery::Interrupted(SessionEnd::Shutdown)
                }
            },
        }
    }
}
