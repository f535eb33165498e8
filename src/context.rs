//! # EventContext: the per-resource collection facade.
//!
//! The only surface resource-adapter code should use to emit events or
//! arrange polling. A context is bound to one [`Resource`] and obtained from
//! [`EventManager::context`].
//!
//! ## Rules
//! - `publish` validates **every** event's type against the declared schema
//!   before forwarding **any** of them; a batched publish is all-or-nothing
//!   at the validation step.
//! - Polling intervals below the configured minimum are clamped up with a
//!   warning, never rejected.
//! - `unregister_poller` is idempotent; unknown registrations are a logged
//!   no-op.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use eventpipe::{
//!     Event, EventConfig, EventManager, PollError, PollerFn, Resource, Severity, StaticResolver,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = StaticResolver::new().declare("FileSystem", "mountChanged");
//! let manager = EventManager::builder(EventConfig::default(), resolver).build();
//! manager.start();
//!
//! let ctx = manager.context(Resource::new(1, "fs-root", "FileSystem"));
//!
//! // Direct publish:
//! ctx.publish(Event::new("mountChanged", Severity::Info, "remounted ro", "/")).await?;
//!
//! // Recurring poll:
//! let poller = PollerFn::arc("mountChanged", || async { Ok::<_, PollError>(Vec::new()) });
//! ctx.register_poller(poller, Duration::from_secs(120), Some("/")).await?;
//! ctx.unregister_poller("mountChanged", Some("/")).await;
//!
//! manager.shutdown().await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::core::EventManager;
use crate::error::EventError;
use crate::events::{Event, PollerKey, Resource};
use crate::pollers::PollerRef;

/// Per-resource facade over the event pipeline.
///
/// Cheap to clone; all clones feed the same manager.
#[derive(Clone)]
pub struct EventContext {
    manager: Arc<EventManager>,
    resource: Resource,
}

impl EventContext {
    pub(crate) fn new(manager: Arc<EventManager>, resource: Resource) -> Self {
        Self { manager, resource }
    }

    /// The resource this context is bound to.
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Publishes a single event.
    ///
    /// Fails with [`EventError::UnknownEventType`] when the event's type is
    /// not declared for this resource's type; on failure the live batch is
    /// left untouched.
    pub async fn publish(&self, event: Event) -> Result<(), EventError> {
        self.publish_all(vec![event]).await
    }

    /// Publishes a set of events in one call.
    ///
    /// Validates every event before forwarding any; an empty set is rejected
    /// with [`EventError::NoEvents`].
    pub async fn publish_all(&self, events: Vec<Event>) -> Result<(), EventError> {
        if events.is_empty() {
            return Err(EventError::NoEvents);
        }
        for event in &events {
            self.validate_event_type(&event.event_type)?;
        }
        self.manager.append(events, &self.resource).await;
        Ok(())
    }

    /// Registers `poller` for recurring invocation every `interval`.
    ///
    /// Fails with [`EventError::UnknownEventType`] when the poller's event
    /// type is not declared for this resource's type. Intervals below the
    /// configured minimum are silently raised to it (warned, not rejected).
    /// `source_location` scopes the subscription; re-registering an existing
    /// key replaces it (unregister first to be tidy).
    pub async fn register_poller(
        &self,
        poller: PollerRef,
        interval: Duration,
        source_location: Option<&str>,
    ) -> Result<(), EventError> {
        self.validate_event_type(poller.event_type())?;

        let clamped = self.manager.cfg().clamp_polling_interval(interval);
        if clamped != interval {
            warn!(
                resource = %self.resource.name,
                event_type = poller.event_type(),
                requested = ?interval,
                effective = ?clamped,
                "polling interval below configured minimum; raised",
            );
        }

        let key = PollerKey::new(self.resource.id, poller.event_type(), source_location);
        self.manager
            .register_poller(key, poller, self.resource.clone(), clamped)
            .await;
        Ok(())
    }

    /// Removes the subscription for `(event_type, source_location)`.
    ///
    /// Idempotent: unregistering a poller that is not registered is a silent
    /// no-op.
    pub async fn unregister_poller(&self, event_type: &str, source_location: Option<&str>) {
        let key = PollerKey::new(self.resource.id, event_type, source_location);
        self.manager.unregister_poller(&key).await;
    }

    fn validate_event_type(&self, event_type: &str) -> Result<(), EventError> {
        if self
            .manager
            .resolver()
            .resolve(event_type, &self.resource.resource_type)
            .is_none()
        {
            return Err(EventError::UnknownEventType {
                event_type: event_type.to_string(),
                resource_type: self.resource.resource_type.to_string(),
            });
        }
        Ok(())
    }
}
