//! # Runtime configuration.
//!
//! [`Config`] centralizes every knob of the poller. All fields are public; the
//! defaults reproduce the presence widget's fixed schedule.
//!
//! ## Sentinel values
//! - `request_timeout = 0s` → no timeout (see [`Config::fetch_timeout`])

use std::time::Duration;

use crate::policies::RetryPolicy;

/// Lanyard REST root.
pub const DEFAULT_BASE_URL: &str = "https://api.lanyard.rest";

/// The Discord user whose presence is shown.
pub const DEFAULT_USER_ID: &str = "1010166973973405727";

/// Global configuration for the poller.
///
/// ## Field semantics
/// - `base_url`, `user_id`: together form the endpoint (see [`Config::endpoint`])
/// - `poll_interval`: period of the interval driver
/// - `manual_retry_delay`: wait between a manual retry and its poll
/// - `request_timeout`: per-request bound (`0s` = unbounded)
/// - `retry`: backoff schedule and ceiling
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `command_capacity`: controller command queue size (min 1)
#[derive(Clone, Debug)]
pub struct Config {
    /// API root, without trailing `/v1`.
    pub base_url: String,

    /// Discord user id to watch.
    pub user_id: String,

    /// Period between driver ticks. The first tick fires immediately.
    pub poll_interval: Duration,

    /// Delay between `manual_retry()` and the poll it schedules.
    pub manual_retry_delay: Duration,

    /// Upper bound for one request.
    ///
    /// - `Duration::ZERO` = no timeout (the request runs until the network stack gives up)
    /// - `> 0` = a slower request fails with `PollError::Timeout`
    pub request_timeout: Duration,

    /// Retry schedule for failed polls.
    pub retry: RetryPolicy,

    /// Capacity of the event bus broadcast channel.
    pub bus_capacity: usize,

    /// Capacity of the controller command queue.
    ///
    /// With the default of `1`, a driver tick that finds a poll already queued is
    /// coalesced instead of piling up behind a slow request.
    pub command_capacity: usize,
}

impl Config {
    /// Returns `{base_url}/v1/users/{user_id}`.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1/users/{}",
            self.base_url.trim_end_matches('/'),
            self.user_id
        )
    }

    /// Returns the per-request timeout as an `Option`.
    ///
    /// - `None` → no timeout
    /// - `Some(d)` → each request is bounded by `d`
    #[inline]
    pub fn fetch_timeout(&self) -> Option<Duration> {
        if self.request_timeout == Duration::ZERO {
            None
        } else {
            Some(self.request_timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns a command queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn command_capacity_clamped(&self) -> usize {
        self.command_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `base_url = https://api.lanyard.rest`, `user_id = 1010166973973405727`
    /// - `poll_interval = 30s`
    /// - `manual_retry_delay = 1s`
    /// - `request_timeout = 10s`
    /// - `retry = RetryPolicy::default()` (2s, 4s, 8s, 16s, 30s, then give up)
    /// - `bus_capacity = 1024`
    /// - `command_capacity = 1`
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            poll_interval: Duration::from_secs(30),
            manual_retry_delay: Duration::from_secs(1),
            request_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
            bus_capacity: 1024,
            command_capacity: 1,
        }
    }
}
