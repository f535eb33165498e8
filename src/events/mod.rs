//! Event data model: records, identities, declarations, and the batch.
//!
//! This module groups everything that flows through the pipeline:
//!
//! ## Contents
//! - [`Event`], [`Severity`] — the immutable telemetry record
//! - [`Resource`], [`EventSource`], [`PollerKey`] — identities
//! - [`EventDefinition`], [`EventDefinitionResolver`], [`StaticResolver`] —
//!   the declared-type schema seam
//! - [`EventBatch`], [`DroppedBySource`] — the bounded accumulator
//!
//! See `core/mod.rs` for how these are wired into the running pipeline.

mod batch;
mod definition;
mod event;
mod source;

pub use batch::{DroppedBySource, EventBatch};
pub use definition::{EventDefinition, EventDefinitionResolver, StaticResolver};
pub use event::{Event, Severity};
pub use source::{EventSource, PollerKey, Resource};
