//! The transport seam: something that can open one long-lived event stream.
//!
//! [`SseConnection`](super::SseConnection) never talks to the network itself.
//! Each connection attempt calls [`SseTransport::open`] once and reads the
//! returned [`SseEventStream`] until it ends, fails, or is dropped. Dropping
//! the stream must release the underlying connection.

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use super::Event;
use crate::error::TransportResult;

/// Events from one open transport, in arrival order.
pub type SseEventStream = BoxStream<'static, TransportResult<Event>>;

/// Everything a transport needs to open one attempt.
#[derive(Clone, Debug)]
pub struct SseRequest {
    /// Endpoint URL.
    pub url: String,
    /// Whether credentials accompany the request.
    pub with_credentials: bool,
    /// Headers for this attempt (credential headers already merged in when
    /// `with_credentials` is set).
    pub headers: http::HeaderMap,
}

impl SseRequest {
    pub(crate) fn from_config(config: &super::SseConfig) -> Self {
        let mut headers = config.headers.clone();
        if config.with_credentials {
            headers.extend(config.credential_headers.clone());
        }
        Self {
            url: config.url.clone(),
            with_credentials: config.with_credentials,
            headers,
        }
    }
}

/// Opens event streams for a connection.
#[async_trait]
pub trait SseTransport: Send + Sync + 'static {
    /// Open a stream for `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be established. The connection
    /// treats this like any other failed attempt.
    async fn open(&self, request: &SseRequest) -> TransportResult<SseEventStream>;
}

#[cfg(feature = "http")]
pub use http_transport::HttpTransport;

#[cfg(feature = "http")]
mod http_transport {
    use std::time::Duration;

    use async_trait::async_trait;
    use eventsource_stream::Eventsource;
    use futures_util::StreamExt;
    use tokio::time::timeout;
    use tracing::debug;

    use super::{SseEventStream, SseRequest, SseTransport};
    use crate::{
        error::{TransportError, TransportResult},
        sse::SseConfig,
    };

    /// HTTP(S) Server-Sent Events transport built on `reqwest`.
    ///
    /// Credentialed requests go through a client with a cookie store so that
    /// session cookies set by the server survive reconnections.
    #[derive(Clone, Debug)]
    pub struct HttpTransport {
        client: reqwest::Client,
        credentialed: reqwest::Client,
        connect_timeout: Duration,
    }

    impl HttpTransport {
        /// Build the HTTP clients for a configuration.
        ///
        /// # Errors
        ///
        /// Returns an error if the underlying HTTP client cannot be built.
        pub fn new(config: &SseConfig) -> TransportResult<Self> {
            let build = |cookies: bool| {
                reqwest::Client::builder()
                    .connect_timeout(config.connect_timeout)
                    .cookie_store(cookies)
                    .build()
                    .map_err(|e| TransportError::config(format!("Failed to build HTTP client: {e}")))
            };

            Ok(Self {
                client: build(false)?,
                credentialed: build(true)?,
                connect_timeout: config.connect_timeout,
            })
        }
    }

    #[async_trait]
    impl SseTransport for HttpTransport {
        async fn open(&self, request: &SseRequest) -> TransportResult<SseEventStream> {
            let client = if request.with_credentials {
                &self.credentialed
            } else {
                &self.client
            };

            let mut headers = request.headers.clone();
            headers.insert(
                http::header::ACCEPT,
                http::HeaderValue::from_static("text/event-stream"),
            );
            headers.insert(
                http::header::CACHE_CONTROL,
                http::HeaderValue::from_static("no-cache"),
            );

            let resp = timeout(
                self.connect_timeout,
                client.get(&request.url).headers(headers).send(),
            )
            .await
            .map_err(|_| TransportError::timeout(self.connect_timeout))??;

            let status = resp.status();
            if !status.is_success() {
                return Err(TransportError::sse_invalid_status(status));
            }

            if let Some(ct) = resp.headers().get(http::header::CONTENT_TYPE) {
                let ct_str = ct.to_str().unwrap_or("");
                if !ct_str.contains("text/event-stream") {
                    return Err(TransportError::sse_invalid_content_type(ct_str));
                }
            }

            debug!(url = %request.url, %status, "SSE response accepted");

            let events = resp
                .bytes_stream()
                .eventsource()
                .map(|item| item.map_err(|e| TransportError::sse_parse(e.to_string())));
            Ok(events.boxed())
        }
    }
}
