//! Poller abstractions: the [`EventPoller`] trait and a function-backed
//! implementation, [`PollerFn`].

mod poller;
mod poller_fn;

pub use poller::{EventPoller, PollerRef};
pub use poller_fn::PollerFn;
