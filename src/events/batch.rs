//! # EventBatch: a capacity-bounded accumulator with drop accounting.
//!
//! The live batch collects events from many concurrent appenders between
//! send cycles. Capacity is enforced twice — per source and in total — and
//! exceeding either cap **drops the event and counts the drop** instead of
//! blocking or failing. This is the subsystem's deliberate backpressure
//! policy: degrade by dropping with accounting, never by blocking the
//! collection path.
//!
//! ## Drop policy
//! On `append`:
//! 1. If the batch-wide total has reached `max_total`, drop and count
//!    against the event's source (the total cap dominates — even a source
//!    under its own cap gets nothing in).
//! 2. Otherwise, if the source's sequence already holds `max_per_source`
//!    events, drop and count.
//! 3. Otherwise, append and bump the total.
//!
//! ## Invariants
//! - `total == sum(len of each per-source sequence)`
//! - `total <= max_total`
//! - `len(per-source sequence) <= max_per_source`, for every source
//!
//! ## Lifecycle
//! A batch is "open" while it sits in the manager's live slot and "closed"
//! once the swap moves it out. Closing is ownership transfer: only the send
//! worker ever holds a closed batch, so post-close appends cannot be
//! expressed. [`EventBatch::into_parts`] then yields the retained events and
//! the per-source drop counts, non-destructively of each other.
//!
//! ## Concurrency
//! The manager's readers-writer lock only excludes appends from racing the
//! swap; appends run **concurrently with each other** on the read side, so
//! the batch guards its own bookkeeping with an internal mutex. The critical
//! section is a couple of map operations and is never held across `.await`.

use std::collections::HashMap;
use std::sync::Mutex;

use super::event::Event;
use super::source::EventSource;

/// Per-source and per-batch drop tallies, keyed by [`EventSource`].
pub type DroppedBySource = HashMap<EventSource, u64>;

/// Internal bookkeeping, guarded by [`EventBatch::state`].
#[derive(Debug, Default)]
struct BatchState {
    events_by_source: HashMap<EventSource, Vec<Event>>,
    dropped_by_source: DroppedBySource,
    total: usize,
}

/// A bounded accumulator of events awaiting transmission.
///
/// ## Example
/// ```rust
/// use eventpipe::{Event, EventBatch, EventSource, Resource, Severity};
///
/// let batch = EventBatch::new(2, 10);
/// let res = Resource::new(1, "web-01", "ApacheServer");
/// let src = EventSource::new("/var/log/httpd/error_log", "logEntry", &res);
///
/// for n in 0..3 {
///     let ev = Event::new("logEntry", Severity::Error, format!("oops {n}"), "/var/log/httpd/error_log");
///     batch.append(ev, src.clone());
/// }
///
/// assert_eq!(batch.len(), 2);          // per-source cap
/// assert_eq!(batch.dropped_total(), 1); // third append dropped, counted
/// ```
#[derive(Debug)]
pub struct EventBatch {
    state: Mutex<BatchState>,
    max_per_source: usize,
    max_total: usize,
}

impl EventBatch {
    /// Creates an empty open batch with the given caps.
    ///
    /// Caps of zero are treated as one; a batch that can hold nothing would
    /// silently discard all telemetry.
    pub fn new(max_per_source: usize, max_total: usize) -> Self {
        Self {
            state: Mutex::new(BatchState::default()),
            max_per_source: max_per_source.max(1),
            max_total: max_total.max(1),
        }
    }

    /// Appends `event` under `source`, or drops it with accounting.
    ///
    /// Infallible by contract: overflow increments the source's drop counter
    /// and returns. Total cap is checked before the per-source cap.
    pub fn append(&self, event: Event, source: EventSource) {
        let mut guard = self.state.lock().expect("batch state poisoned");
        // Reborrow through the guard once so the field borrows below split.
        let state = &mut *guard;

        if state.total >= self.max_total {
            *state.dropped_by_source.entry(source).or_insert(0) += 1;
            return;
        }

        let seq = state.events_by_source.entry(source.clone()).or_default();
        if seq.len() >= self.max_per_source {
            *state.dropped_by_source.entry(source).or_insert(0) += 1;
            return;
        }

        seq.push(event);
        state.total += 1;
    }

    /// Number of events currently retained across all sources.
    pub fn len(&self) -> usize {
        self.state.lock().expect("batch state poisoned").total
    }

    /// True when no events are retained.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total drops across all sources so far.
    pub fn dropped_total(&self) -> u64 {
        self.state
            .lock()
            .expect("batch state poisoned")
            .dropped_by_source
            .values()
            .sum()
    }

    /// Closes the batch, yielding retained events and drop counts.
    ///
    /// Consumes the batch; callable only once the swap has moved it out of
    /// the live slot, which is what "closed" means here.
    pub fn into_parts(self) -> (HashMap<EventSource, Vec<Event>>, DroppedBySource) {
        let state = self.state.into_inner().expect("batch state poisoned");
        (state.events_by_source, state.dropped_by_source)
    }
}
