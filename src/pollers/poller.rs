//! # Poller abstraction.
//!
//! An [`EventPoller`] is a callback object that, when invoked periodically
//! by the registry's poll workers, produces zero or more [`Event`]s — for
//! example by tailing a log file for new lines since the last invocation.
//! The common handle type is [`PollerRef`], an `Arc<dyn EventPoller>`
//! suitable for sharing across the runtime.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PollError;
use crate::events::Event;

/// Shared handle to a poller.
pub type PollerRef = Arc<dyn EventPoller>;

/// # A periodically invoked event producer.
///
/// Invocations for one subscription run sequentially — the poll loop awaits
/// each `poll()` before the next tick is honored — so implementations may
/// keep interior state (file offsets, cursors) behind a mutex without
/// worrying about overlapping calls from the same subscription.
///
/// Returning `Err` is logged by the worker and does **not** cancel the
/// schedule; the next tick still runs.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use eventpipe::{Event, EventPoller, PollError, Severity};
///
/// struct Heartbeat;
///
/// #[async_trait]
/// impl EventPoller for Heartbeat {
///     fn event_type(&self) -> &str { "heartbeat" }
///
///     async fn poll(&self) -> Result<Vec<Event>, PollError> {
///         Ok(vec![Event::new("heartbeat", Severity::Info, "alive", "internal")])
///     }
/// }
/// ```
#[async_trait]
pub trait EventPoller: Send + Sync + 'static {
    /// Returns the declared event-type name this poller produces.
    fn event_type(&self) -> &str;

    /// Produces the events observed since the previous invocation.
    ///
    /// Must not block on anything unbounded; a slow poll occupies one of the
    /// shared pool's permits for its whole duration.
    async fn poll(&self) -> Result<Vec<Event>, PollError>;
}
