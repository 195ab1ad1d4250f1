use std::time::Duration;

use hs_transport::LinkConfig;

/// Environment variable overriding the default election timeout (milliseconds).
pub const TIMEOUT_ENV: &str = "HS_ELECTION_TIMEOUT_MS";

/// Shortest accepted monitor poll interval.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Configuration for a [`RingNetwork`](crate::RingNetwork).
///
/// All fields have sensible defaults. Use the builder pattern:
///
/// ```rust
/// use std::time::Duration;
/// use hs_protocol::RingConfig;
///
/// let config = RingConfig::new()
///     .timeout(Duration::from_secs(5))
///     .record_trace(true);
/// ```
#[derive(Debug, Clone)]
pub struct RingConfig {
    /// Give up and report a stall after this long without a leader.
    pub(crate) timeout: Duration,
    /// How often the monitor checks the message bound.
    pub(crate) poll_interval: Duration,
    /// Reject equal priorities instead of breaking ties by id.
    pub(crate) strict_priorities: bool,
    /// Fail the run when more messages than the proven bound were sent.
    pub(crate) enforce_message_bound: bool,
    /// Collect every process event into the outcome.
    pub(crate) record_trace: bool,
    /// Settings for every ring link.
    pub(crate) link: LinkConfig,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RingConfig {
    /// Create a new config with defaults.
    ///
    /// If the `HS_ELECTION_TIMEOUT_MS` environment variable holds a number,
    /// it replaces the 30 s default timeout. [`.timeout()`](Self::timeout)
    /// still takes precedence.
    pub fn new() -> Self {
        let timeout = std::env::var(TIMEOUT_ENV)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_secs(30));

        Self {
            timeout,
            poll_interval: Duration::from_millis(10),
            strict_priorities: false,
            enforce_message_bound: true,
            record_trace: false,
            link: LinkConfig::new(),
        }
    }

    /// Set the election timeout (default: 30 s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the monitor poll interval (default: 10 ms, minimum 1 ms).
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// Reject rings with equal priorities (default: off, ties go to the lower id).
    pub fn strict_priorities(mut self, strict: bool) -> Self {
        self.strict_priorities = strict;
        self
    }

    /// Abort when the message count passes `message_bound(N)` (default: on).
    pub fn enforce_message_bound(mut self, enforce: bool) -> Self {
        self.enforce_message_bound = enforce;
        self
    }

    /// Record the full event trace (default: off).
    pub fn record_trace(mut self, record: bool) -> Self {
        self.record_trace = record;
        self
    }

    /// Replace the link settings.
    pub fn link(mut self, link: LinkConfig) -> Self {
        self.link = link;
        self
    }

    pub fn election_timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = RingConfig::new()
            .timeout(Duration::from_millis(250))
            .poll_interval(Duration::from_millis(1))
            .strict_priorities(true)
            .enforce_message_bound(false)
            .record_trace(true);

        assert_eq!(config.election_timeout(), Duration::from_millis(250));
        assert_eq!(config.poll_interval, Duration::from_millis(1));
        assert!(config.strict_priorities);
        assert!(!config.enforce_message_bound);
        assert!(config.record_trace);
    }

    #[test]
    fn zero_poll_interval_is_clamped() {
        let config = RingConfig::new().poll_interval(Duration::ZERO);
        assert_eq!(config.poll_interval, Duration::from_millis(1));

        let config = RingConfig::new().poll_interval(Duration::from_micros(10));
        assert_eq!(config.poll_interval, Duration::from_millis(1));
    }

    #[test]
    fn defaults() {
        let config = RingConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(10));
        assert!(!config.strict_priorities);
        assert!(config.enforce_message_bound);
        assert!(!config.record_trace);
    }
}
