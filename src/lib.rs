//! # eventpipe
//!
//! **eventpipe** is a bounded, concurrent event collection and batched
//! forwarding pipeline for monitoring agents.
//!
//! It collects discrete events (log-file lines, state-change notifications)
//! from many monitored resources concurrently, buffers them with strict
//! per-source and global caps, and periodically ships accumulated batches to
//! a remote collector — guaranteeing lossy-but-bounded memory use and never
//! blocking the collection path on network I/O. The crate is a library-level
//! subsystem designed to be embedded in a larger agent process.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ EventContext │   │ EventContext │   │ EventContext │
//!     │ (resource 1) │   │ (resource 2) │   │ (resource 3) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ publish /        │                  │
//!            │ register_poller  │                  │
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  EventManager (pipeline orchestrator)                             │
//! │  - live EventBatch  (fair RwLock: appends read, swap writes)      │
//! │  - PollerRegistry   (PollerKey → cancellable poll loop)           │
//! │  - poll semaphore   (pollers multiplexed over N permits)          │
//! │  - sender loop      (fixed-rate; spawns semaphore-gated senders)  │
//! └──────┬──────────────────────┬─────────────────────────┬──────────┘
//!        ▼                      ▼                          ▼
//!   poll loop #1           poll loop #2              send worker
//!   tick → poll()          tick → poll()         swap batch → forward
//!        │                      │                          │
//!        └──────► append ◄──────┘                          ▼
//!            (read side of the batch lock)         EventTransport::send
//! ```
//!
//! ### Data flow
//! ```text
//! adapter code ──► EventContext::publish ───────┐
//!                                               ├──► EventManager::append
//! poll loop ──► EventPoller::poll() ── events ──┘         │
//!                                                         ▼
//!                                             live EventBatch (capped,
//!                                             drops counted per source)
//!                                                         │ every send_period
//!                                                         ▼
//!                                          swap (write lock) ─► send_batch
//!                                                         │
//!                              transport configured? ─────┤
//!                                        yes: forward     │  no: discard
//! ```
//!
//! ## Guarantees
//! | Concern            | Policy                                                          |
//! |--------------------|-----------------------------------------------------------------|
//! | **Memory**         | Per-source and per-batch caps; overflow drops with accounting.  |
//! | **Collection path**| Never blocks on network I/O; only brief lock/mutex waits.       |
//! | **Swap atomicity** | Every event lands in exactly one batch, never split or lost.    |
//! | **Failures**       | Background failures are logged, never raised, never retried.    |
//! | **Shutdown**       | Graceful drain: in-flight polls and sends run to completion.    |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use eventpipe::{
//!     Event, EventConfig, EventManager, PollError, PollerFn, Resource, Severity, StaticResolver,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // The host agent supplies the declared-event-type schema.
//!     let resolver = StaticResolver::new()
//!         .declare("PostgresServer", "logEntry")
//!         .declare("PostgresServer", "replicationLag");
//!
//!     // No transport configured: batches are collected, then discarded.
//!     let manager = EventManager::builder(EventConfig::default(), resolver).build();
//!     manager.start();
//!
//!     let ctx = manager.context(Resource::new(1, "postgres-main", "PostgresServer"));
//!
//!     // Push an event directly...
//!     ctx.publish(Event::new(
//!         "logEntry",
//!         Severity::Error,
//!         "FATAL: connection limit reached",
//!         "/var/log/postgresql/postgresql.log",
//!     ))
//!     .await?;
//!
//!     // ...or poll for them on a fixed period.
//!     let poller = PollerFn::arc("replicationLag", || async {
//!         Ok::<_, PollError>(Vec::new()) // nothing new this cycle
//!     });
//!     ctx.register_poller(poller, Duration::from_secs(60), None).await?;
//!
//!     manager.shutdown().await;
//!     Ok(())
//! }
//! ```
mod config;
mod context;
mod core;
mod error;
mod events;
mod pollers;
mod transport;

// ---- Public re-exports ----

pub use config::EventConfig;
pub use context::EventContext;
pub use core::{EventManager, EventManagerBuilder};
pub use error::{EventError, PollError, TransportError};
pub use events::{
    DroppedBySource, Event, EventBatch, EventDefinition, EventDefinitionResolver, EventSource,
    PollerKey, Resource, Severity, StaticResolver,
};
pub use pollers::{EventPoller, PollerFn, PollerRef};
pub use transport::EventTransport;
