//! # Runtime configuration for the event subsystem.
//!
//! Provides [`EventConfig`] — centralized settings consumed by
//! [`EventManager`](crate::EventManager) at build time.
//!
//! ## Field semantics
//! - `max_events_per_source`: per-source cap inside one batch (min 1; clamped)
//! - `max_events_per_batch`: global cap per batch (min 1; clamped)
//! - `send_initial_delay`: delay before the first send cycle
//! - `send_period`: fixed period between send cycles (min 1s; clamped)
//! - `poll_worker_pool_size`: concurrent poll invocations (min 1; clamped)
//! - `send_worker_pool_size`: concurrent in-flight sends (min 1; clamped)
//! - `min_polling_interval`: floor for poller intervals; requests below it
//!   are silently raised, never rejected
//!
//! All fields are public for flexibility. Prefer the accessor helpers to
//! avoid sprinkling clamp logic across the codebase.

use std::time::Duration;

/// Configuration for event collection, buffering, and forwarding.
///
/// Defines:
/// - **Batch capacity**: per-source and total caps (overflow drops + counts)
/// - **Send cadence**: initial delay and fixed period of the sender task
/// - **Worker pools**: how many polls and sends may run concurrently
/// - **Polling floor**: minimum accepted poller interval
#[derive(Clone, Debug)]
pub struct EventConfig {
    /// Maximum events retained per [`EventSource`](crate::EventSource) in
    /// one batch. Appends beyond the cap are dropped and counted.
    pub max_events_per_source: usize,

    /// Maximum events retained per batch across all sources. Once reached,
    /// every further append for the batch is dropped and counted,
    /// regardless of source.
    pub max_events_per_batch: usize,

    /// Delay before the first batch send after [`EventManager::start`](crate::EventManager::start).
    pub send_initial_delay: Duration,

    /// Fixed period between send cycles. Ticks are anchored to the start
    /// time (fixed-rate), so a slow send does not shift the cadence.
    pub send_period: Duration,

    /// Number of poll invocations that may run concurrently. Pollers are
    /// multiplexed over this pool; the pool size is independent of how many
    /// pollers are registered.
    pub poll_worker_pool_size: usize,

    /// Number of batch sends that may be in flight concurrently. When every
    /// worker is busy at a tick, that send cycle is skipped with a warning.
    pub send_worker_pool_size: usize,

    /// Minimum accepted polling interval. Registration requests below this
    /// floor are clamped up to it (logged, not rejected).
    pub min_polling_interval: Duration,
}

impl EventConfig {
    /// Per-source batch cap, clamped to a minimum of 1.
    #[inline]
    pub fn max_per_source_clamped(&self) -> usize {
        self.max_events_per_source.max(1)
    }

    /// Total batch cap, clamped to a minimum of 1.
    #[inline]
    pub fn max_total_clamped(&self) -> usize {
        self.max_events_per_batch.max(1)
    }

    /// Send period, clamped to a minimum of one second.
    #[inline]
    pub fn send_period_clamped(&self) -> Duration {
        self.send_period.max(Duration::from_secs(1))
    }

    /// Poll-pool permit count, clamped to a minimum of 1.
    #[inline]
    pub fn poll_permits(&self) -> usize {
        self.poll_worker_pool_size.max(1)
    }

    /// Send-pool permit count, clamped to a minimum of 1.
    #[inline]
    pub fn send_permits(&self) -> usize {
        self.send_worker_pool_size.max(1)
    }

    /// Raises `requested` to [`min_polling_interval`](Self::min_polling_interval)
    /// when it falls below the floor.
    #[inline]
    pub fn clamp_polling_interval(&self, requested: Duration) -> Duration {
        requested.max(self.min_polling_interval)
    }
}

impl Default for EventConfig {
    /// Default configuration (production defaults of the original agent):
    ///
    /// - `max_events_per_source = 200`
    /// - `max_events_per_batch = 400`
    /// - `send_initial_delay = 30s`
    /// - `send_period = 30s`
    /// - `poll_worker_pool_size = 3`
    /// - `send_worker_pool_size = 2`
    /// - `min_polling_interval = 60s`
    fn default() -> Self {
        Self {
            max_events_per_source: 200,
            max_events_per_batch: 400,
            send_initial_delay: Duration::from_secs(30),
            send_period: Duration::from_secs(30),
            poll_worker_pool_size: 3,
            send_worker_pool_size: 2,
            min_polling_interval: Duration::from_secs(60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_caps_are_clamped() {
        let cfg = EventConfig {
            max_events_per_source: 0,
            max_events_per_batch: 0,
            poll_worker_pool_size: 0,
            send_worker_pool_size: 0,
            send_period: Duration::ZERO,
            ..EventConfig::default()
        };
        assert_eq!(cfg.max_per_source_clamped(), 1);
        assert_eq!(cfg.max_total_clamped(), 1);
        assert_eq!(cfg.poll_permits(), 1);
        assert_eq!(cfg.send_permits(), 1);
        assert_eq!(cfg.send_period_clamped(), Duration::from_secs(1));
    }

    #[test]
    fn polling_interval_is_raised_to_floor() {
        let cfg = EventConfig::default();
        assert_eq!(
            cfg.clamp_polling_interval(Duration::from_secs(5)),
            Duration::from_secs(60)
        );
        assert_eq!(
            cfg.clamp_polling_interval(Duration::from_secs(90)),
            Duration::from_secs(90)
        );
    }
}
