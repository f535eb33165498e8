//! # Transport seam: handing a closed batch to the remote collector.
//!
//! The agent-to-server communication layer lives outside this crate; the
//! pipeline only needs a way to forward a swapped-out batch. The contract is
//! best-effort: a failure is logged by the send worker and the batch is
//! lost — no retry, no requeue, no acknowledgment.
//!
//! Configuring **no** transport is a supported mode: an agent with nowhere
//! to send to may still run with event collection enabled, and each swapped
//! batch is silently discarded.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::events::{Event, EventSource};

/// Forwards closed batches to the remote collector.
///
/// `send` receives the batch's retained events keyed by source; drop
/// accounting has already been reported out-of-band by the send worker and
/// is not part of the wire payload.
#[async_trait]
pub trait EventTransport: Send + Sync + 'static {
    /// Delivers one closed batch. Best-effort; errors are terminal.
    async fn send(
        &self,
        events_by_source: HashMap<EventSource, Vec<Event>>,
    ) -> Result<(), TransportError>;
}
