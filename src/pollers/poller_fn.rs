//! # Function-backed poller (`PollerFn`)
//!
//! [`PollerFn`] wraps a closure `F: Fn() -> Fut`, producing a fresh future
//! per invocation. This avoids shared mutable state by default; pollers that
//! need a cursor (file offset, last-seen id) capture an `Arc<Mutex<...>>`
//! explicitly inside the closure.
//!
//! ## Example
//! ```rust
//! use eventpipe::{Event, PollError, PollerFn, PollerRef, Severity};
//!
//! let p: PollerRef = PollerFn::arc("heartbeat", || async {
//!     Ok::<_, PollError>(vec![Event::new("heartbeat", Severity::Info, "alive", "internal")])
//! });
//!
//! assert_eq!(p.event_type(), "heartbeat");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PollError;
use crate::events::Event;

use super::poller::EventPoller;

/// Function-backed poller implementation.
///
/// Wraps a closure that *creates* a new future per invocation.
#[derive(Debug)]
pub struct PollerFn<F> {
    event_type: Cow<'static, str>,
    f: F,
}

impl<F> PollerFn<F> {
    /// Creates a new function-backed poller.
    ///
    /// Prefer [`PollerFn::arc`] when you immediately need a
    /// [`PollerRef`](crate::PollerRef).
    pub fn new(event_type: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            event_type: event_type.into(),
            f,
        }
    }

    /// Creates the poller and returns it as a shared handle.
    pub fn arc(event_type: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(event_type, f))
    }
}

#[async_trait]
impl<F, Fut> EventPoller for PollerFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<Vec<Event>, PollError>> + Send + 'static,
{
    fn event_type(&self) -> &str {
        &self.event_type
    }

    async fn poll(&self) -> Result<Vec<Event>, PollError> {
        (self.f)().await
    }
}
