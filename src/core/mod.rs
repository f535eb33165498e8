//! Runtime core: orchestration and lifecycle.
//!
//! The public API from this module is [`EventManager`] (plus its builder),
//! which owns the live batch, the poller registry, and the sender task.
//!
//! Internal modules:
//! - [`manager`]: the orchestrator — append/swap/send and lifecycle;
//! - [`registry`]: polling subscriptions and their poll loops;
//! - [`sender`]: the fixed-rate swap-and-send loop;
//! - [`builder`]: explicit construction (no ambient singletons).

mod builder;
mod manager;
mod registry;
mod sender;

pub use builder::EventManagerBuilder;
pub use manager::EventManager;
