//! # EventManager: orchestrates collection, buffering, and forwarding.
//!
//! The [`EventManager`] owns the live [`EventBatch`], the poller registry,
//! the fixed-rate sender task, and the worker-pool semaphores. It is built
//! explicitly via [`EventManager::builder`] and passed around as an
//! `Arc` — there is no process-wide singleton; the embedding agent owns
//! init/teardown.
//!
//! ## High-level architecture
//! ```text
//! Resource adapters                             Remote collector
//!   │ EventContext::publish                           ▲
//!   ▼                                                 │ EventTransport::send
//! ┌──────────────────────────────────────────────┐    │
//! │ EventManager                                 │    │
//! │  - live EventBatch  (RwLock, fair)           │  send worker (spawned
//! │  - PollerRegistry   (key → poll loop)        │  per tick, semaphore-
//! │  - sender loop      (fixed-rate ticks)       │  gated)
//! │  - poll semaphore   (pool of N permits)      │    │
//! └──────────────────────────────────────────────┘    │
//!   ▲                                                 │
//!   │ append (read side)          swap (write side) ──┘
//!   poll loops (one per subscription, multiplexed over the pool)
//! ```
//!
//! ## Locking discipline
//! The live-batch slot is a `tokio::sync::RwLock`, which is fair: a burst of
//! concurrent appenders cannot starve the periodic swap. `append` takes the
//! read side (appends run in parallel; the batch's own bookkeeping is
//! independently thread-safe), `swap_batch` the write side, so a swap waits
//! for in-flight appends and no append starts until the fresh batch is
//! installed. No event is ever split across two batches or lost to a race
//! between "pick a batch" and "batch gets replaced". Network I/O happens
//! only after a batch has been swapped out, never under the lock.
//!
//! ## Lifecycle
//! ```text
//! builder().build() ──► new ──start()──► running ──shutdown()──► shutdown
//! ```
//! Non-reentrant: re-starting after shutdown is unsupported. Appends outside
//! `running` are debug-logged no-ops — in-flight poll tasks may race the
//! shutdown, and that must stay harmless.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{RwLock, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::EventConfig;
use crate::context::EventContext;
use crate::core::builder::EventManagerBuilder;
use crate::core::registry::PollerRegistry;
use crate::core::sender;
use crate::events::{
    Event, EventBatch, EventDefinitionResolver, EventSource, PollerKey, Resource,
};
use crate::pollers::PollerRef;
use crate::transport::EventTransport;

const STATE_NEW: u8 = 0;
const STATE_RUNNING: u8 = 1;
const STATE_SHUTDOWN: u8 = 2;

/// Orchestrator of the event pipeline.
///
/// See the module docs for the wiring diagram and locking discipline.
pub struct EventManager {
    cfg: EventConfig,
    resolver: Arc<dyn EventDefinitionResolver>,
    transport: Option<Arc<dyn EventTransport>>,
    batch: RwLock<EventBatch>,
    registry: Arc<PollerRegistry>,
    runtime_token: CancellationToken,
    poll_sem: Arc<Semaphore>,
    send_sem: Arc<Semaphore>,
    state: AtomicU8,
    sender: Mutex<Option<JoinHandle<()>>>,
}

impl EventManager {
    /// Starts building a manager with the given config and resolver.
    ///
    /// The resolver is the required seam to the host's resource-type
    /// metadata; the transport is optional (see [`EventManagerBuilder`]).
    pub fn builder(
        cfg: EventConfig,
        resolver: impl EventDefinitionResolver,
    ) -> EventManagerBuilder {
        EventManagerBuilder::new(cfg, Arc::new(resolver))
    }

    pub(crate) fn new_internal(
        cfg: EventConfig,
        resolver: Arc<dyn EventDefinitionResolver>,
        transport: Option<Arc<dyn EventTransport>>,
    ) -> Self {
        let batch = EventBatch::new(cfg.max_per_source_clamped(), cfg.max_total_clamped());
        let poll_sem = Arc::new(Semaphore::new(cfg.poll_permits()));
        let send_sem = Arc::new(Semaphore::new(cfg.send_permits()));
        Self {
            cfg,
            resolver,
            transport,
            batch: RwLock::new(batch),
            registry: PollerRegistry::new(),
            runtime_token: CancellationToken::new(),
            poll_sem,
            send_sem,
            state: AtomicU8::new(STATE_NEW),
            sender: Mutex::new(None),
        }
    }

    /// Transitions `new → running` and spawns the fixed-rate sender loop.
    ///
    /// A second call (or a call after shutdown) warns and no-ops.
    pub fn start(self: &Arc<Self>) {
        if self
            .state
            .compare_exchange(STATE_NEW, STATE_RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("start() called on a manager that is not in the new state; ignoring");
            return;
        }

        let manager = Arc::clone(self);
        let token = self.runtime_token.clone();
        let handle = tokio::spawn(sender::sender_loop(manager, token));
        *self.sender.lock().expect("sender slot poisoned") = Some(handle);
        debug!(
            max_per_source = self.cfg.max_per_source_clamped(),
            max_total = self.cfg.max_total_clamped(),
            send_period = ?self.cfg.send_period_clamped(),
            "event manager started",
        );
    }

    /// Transitions `running → shutdown` and drains in-flight work.
    ///
    /// Cancels the runtime token, waits for every poll loop to finish its
    /// current invocation, then waits for the sender loop (which in turn
    /// drains in-flight sends). Terminal; a second call no-ops.
    pub async fn shutdown(&self) {
        if self
            .state
            .compare_exchange(
                STATE_RUNNING,
                STATE_SHUTDOWN,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            debug!("shutdown() called on a manager that is not running; ignoring");
            return;
        }

        self.runtime_token.cancel();
        self.registry.cancel_all().await;

        let handle = self.sender.lock().expect("sender slot poisoned").take();
        if let Some(handle) = handle {
            if handle.await.is_err() {
                warn!("sender loop panicked during shutdown");
            }
        }
        debug!("event manager shut down");
    }

    /// True while the manager accepts appends and registrations.
    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::Acquire) == STATE_RUNNING
    }

    /// Creates the per-resource collection facade for `resource`.
    pub fn context(self: &Arc<Self>, resource: Resource) -> EventContext {
        EventContext::new(Arc::clone(self), resource)
    }

    /// Appends a set of events emitted by `resource` to the live batch.
    ///
    /// Every event is resolved against the declared schema individually; a
    /// failed resolution skips only that event (warned, never raised).
    /// Holds the read side of the batch lock for the whole set, so a set
    /// never straddles a swap.
    pub(crate) async fn append(&self, events: Vec<Event>, resource: &Resource) {
        if !self.is_running() {
            debug!(
                resource = %resource.name,
                count = events.len(),
                "append outside running state; dropping",
            );
            return;
        }

        let batch = self.batch.read().await;
        for event in events {
            if self
                .resolver
                .resolve(&event.event_type, &resource.resource_type)
                .is_none()
            {
                warn!(
                    resource = %resource.name,
                    event_type = %event.event_type,
                    resource_type = %resource.resource_type,
                    "event type not declared for resource type; skipping event",
                );
                continue;
            }
            let source = EventSource::new(
                event.source_location.clone(),
                event.event_type.clone(),
                resource,
            );
            batch.append(event, source);
        }
    }

    /// Swaps the live batch for a fresh empty one, returning the old batch.
    ///
    /// The only operation that takes the write side of the batch lock. The
    /// returned batch is closed by ownership: nothing else can reach it.
    pub(crate) async fn swap_batch(&self) -> EventBatch {
        let fresh = EventBatch::new(
            self.cfg.max_per_source_clamped(),
            self.cfg.max_total_clamped(),
        );
        let mut slot = self.batch.write().await;
        std::mem::replace(&mut *slot, fresh)
    }

    /// Reports drop accounting and forwards a closed batch.
    ///
    /// Drops are logged as one structured warning per overflowing source, a
    /// side channel rather than in-band synthetic events. Transport failure
    /// is logged and the batch is lost; with no transport configured the
    /// batch is discarded silently.
    pub(crate) async fn send_batch(&self, batch: EventBatch) {
        let (events_by_source, dropped_by_source) = batch.into_parts();

        for (source, count) in &dropped_by_source {
            warn!(
                source = %source,
                dropped = count,
                max_per_source = self.cfg.max_per_source_clamped(),
                max_total = self.cfg.max_total_clamped(),
                "events dropped due to batch capacity limits",
            );
        }

        let total: usize = events_by_source.values().map(Vec::len).sum();
        if total == 0 {
            return;
        }

        match &self.transport {
            Some(transport) => {
                if let Err(e) = transport.send(events_by_source).await {
                    warn!(
                        label = e.as_label(),
                        error = %e,
                        lost = total,
                        "failed to forward event batch; batch lost",
                    );
                }
            }
            None => debug!(discarded = total, "no transport configured; discarding batch"),
        }
    }

    /// Registers a poller subscription. Outside `running`, warns and no-ops.
    pub(crate) async fn register_poller(
        self: &Arc<Self>,
        key: PollerKey,
        poller: PollerRef,
        resource: Resource,
        interval: Duration,
    ) {
        if !self.is_running() {
            warn!(?key, "register_poller outside running state; ignoring");
            return;
        }
        self.registry()
            .register(Arc::clone(self), key, poller, resource, interval)
            .await;
    }

    /// Removes a poller subscription; idempotent.
    pub(crate) async fn unregister_poller(&self, key: &PollerKey) {
        self.registry.unregister(key).await;
    }

    pub(crate) fn cfg(&self) -> &EventConfig {
        &self.cfg
    }

    pub(crate) fn resolver(&self) -> &dyn EventDefinitionResolver {
        self.resolver.as_ref()
    }

    pub(crate) fn registry(&self) -> &Arc<PollerRegistry> {
        &self.registry
    }

    pub(crate) fn runtime_token(&self) -> &CancellationToken {
        &self.runtime_token
    }

    pub(crate) fn poll_semaphore(&self) -> &Arc<Semaphore> {
        &self.poll_sem
    }

    pub(crate) fn send_semaphore(&self) -> &Arc<Semaphore> {
        &self.send_sem
    }
}
