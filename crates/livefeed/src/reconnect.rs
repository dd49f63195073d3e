//! Retry delay policies shared by stream connections.

use std::time::Duration;

use rand::RngExt;
use serde::Deserialize;

/// How long to wait between a failed connection attempt and the next one.
///
/// The first retry always waits the connection's base `reconnect_interval`;
/// the policy decides what happens to later retries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ReconnectPolicy {
    /// Wait the same interval before every retry.
    #[default]
    Fixed,
    /// Grow the interval geometrically up to `max_delay`, with random jitter.
    Exponential {
        /// Upper bound for any single delay.
        #[serde(with = "millis")]
        max_delay: Duration,
        /// Multiplier applied per retry (must be >= 1.0).
        factor: f64,
        /// Weight (0.0-1.0) of the random component blended into the delay.
        jitter: f64,
    },
}

impl ReconnectPolicy {
    /// Exponential policy with the given cap, a factor of 2 and 10% jitter.
    #[must_use]
    pub fn exponential(max_delay: Duration) -> Self {
        Self::Exponential {
            max_delay,
            factor: 2.0,
            jitter: 0.1,
        }
    }

    /// Delay before the retry that follows the `attempt`-th consecutive
    /// failure (0-based).
    pub fn delay(&self, interval: Duration, attempt: u32) -> Duration {
        match *self {
            Self::Fixed => interval,
            Self::Exponential {
                max_delay,
                factor,
                jitter,
            } => calculate_backoff(
                BackoffConfig {
                    initial_delay: interval,
                    max_delay,
                    factor,
                    jitter,
                },
                attempt,
            ),
        }
    }

    pub(crate) fn validate(&self, interval: Duration) -> Result<(), String> {
        match *self {
            Self::Fixed => Ok(()),
            Self::Exponential {
                max_delay,
                factor,
                jitter,
            } => BackoffConfig {
                initial_delay: interval,
                max_delay,
                factor,
                jitter,
            }
            .validate(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct BackoffConfig {
    pub(crate) initial_delay: Duration,
    pub(crate) max_delay: Duration,
    pub(crate) factor: f64,
    pub(crate) jitter: f64,
}

impl BackoffConfig {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.initial_delay.is_zero() {
            return Err("Reconnect interval must be > 0 for exponential backoff".to_string());
        }
        if self.max_delay < self.initial_delay {
            return Err("Max reconnect delay must be >= reconnect interval".to_string());
        }
        if self.factor < 1.0 || !self.factor.is_finite() {
            return Err("Backoff factor must be >= 1.0".to_string());
        }
        if !(0.0..=1.0).contains(&self.jitter) || !self.jitter.is_finite() {
            return Err("Jitter must be between 0.0 and 1.0".to_string());
        }
        Ok(())
    }
}

pub(crate) fn calculate_backoff(config: BackoffConfig, attempt: u32) -> Duration {
    let initial = config.initial_delay.as_secs_f64();
    let max = config.max_delay.as_secs_f64();
    let exponent = config.factor.powf(f64::from(attempt));
    let base = (initial * exponent).min(max);

    if config.jitter == 0.0 || base <= 0.0 {
        return Duration::from_secs_f64(base);
    }

    let mut rng = rand::rng();
    let randomized = rng.random_range(0.0..=base);
    let blended = base * (1.0 - config.jitter) + randomized * config.jitter;
    Duration::from_secs_f64(blended)
}

/// Serde helper for durations written as integer milliseconds.
pub(crate) mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
