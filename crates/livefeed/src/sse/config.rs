//! SSE connection configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::reconnect::{ReconnectPolicy, millis};

/// Configuration for an SSE stream connection.
///
/// Built with chainable setters, or deserialized from a camelCase options
/// object such as
/// `{"url": "...", "withCredentials": true, "reconnectInterval": 5000, "maxRetries": 3}`.
/// Unknown keys are ignored and missing keys keep their defaults.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SseConfig {
    /// SSE endpoint URL. Fixed for the lifetime of the connection.
    pub url: String,
    /// Send credentials (cookies and [`credential_headers`](Self::credential_headers))
    /// with every connection attempt.
    pub with_credentials: bool,
    /// Additional HTTP headers included with every request.
    #[serde(skip)]
    pub headers: http::HeaderMap,
    /// Headers only sent when `with_credentials` is set (e.g. `Authorization`).
    #[serde(skip)]
    pub credential_headers: http::HeaderMap,
    /// Time allowed for the server to answer with a response head.
    #[serde(with = "millis")]
    pub connect_timeout: Duration,
    /// Base delay between a failure and the next connection attempt.
    #[serde(with = "millis")]
    pub reconnect_interval: Duration,
    /// Retries allowed after consecutive failures before giving up
    /// (None = retry forever). `Some(0)` disables automatic retry.
    pub max_retries: Option<u32>,
    /// How the delay evolves across consecutive retries.
    pub reconnect_policy: ReconnectPolicy,
    /// Use `retry:` directives from the server as the delay for later retries.
    pub honor_server_retry: bool,
    /// Capacity of the event channel.
    pub event_channel_capacity: usize,
}

impl Default for SseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            with_credentials: false,
            headers: http::HeaderMap::new(),
            credential_headers: http::HeaderMap::new(),
            connect_timeout: Duration::from_secs(10),
            reconnect_interval: Duration::from_millis(5000),
            max_retries: None,
            reconnect_policy: ReconnectPolicy::Fixed,
            honor_server_retry: false,
            event_channel_capacity: 256,
        }
    }
}

impl SseConfig {
    /// Create a new SSE configuration with the given URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set whether credentials are sent.
    #[must_use]
    pub fn with_credentials(mut self, with_credentials: bool) -> Self {
        self.with_credentials = with_credentials;
        self
    }

    /// Set additional HTTP headers.
    #[must_use]
    pub fn headers(mut self, headers: http::HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set the headers sent only when credentials are enabled.
    #[must_use]
    pub fn credential_headers(mut self, headers: http::HeaderMap) -> Self {
        self.credential_headers = headers;
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the base reconnection delay.
    #[must_use]
    pub fn reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Set the retry budget.
    #[must_use]
    pub fn max_retries(mut self, max_retries: Option<u32>) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the reconnect policy.
    #[must_use]
    pub fn reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect_policy = policy;
        self
    }

    /// Set whether server `retry:` directives override the computed delay.
    #[must_use]
    pub fn honor_server_retry(mut self, honor: bool) -> Self {
        self.honor_server_retry = honor;
        self
    }

    /// Set the event channel capacity.
    #[must_use]
    pub fn event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity;
        self
    }

    /// Delay before the retry that follows the `attempt`-th consecutive
    /// failure.
    pub(crate) fn retry_delay(&self, attempt: u32, server_retry: Option<Duration>) -> Duration {
        match server_retry {
            Some(delay) if self.honor_server_retry => delay,
            _ => self.reconnect_policy.delay(self.reconnect_interval, attempt),
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error message string if any field has an invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.url.is_empty() {
            return Err("URL cannot be empty".to_string());
        }
        let parsed = url::Url::parse(&self.url).map_err(|e| format!("Invalid URL: {e}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(format!("Unsupported URL scheme: {}", parsed.scheme()));
        }
        if self.connect_timeout.is_zero() {
            return Err("Connect timeout must be > 0".to_string());
        }
        if self.event_channel_capacity == 0 {
            return Err("Event channel capacity must be > 0".to_string());
        }
        self.reconnect_policy.validate(self.reconnect_interval)
    }
}
