//! # Identities: resources, event sources, and poller subscription keys.
//!
//! - [`Resource`] — the monitored resource a facade is bound to.
//! - [`EventSource`] — "where a particular class of event comes from" within
//!   one resource; the per-source accounting key inside a batch.
//! - [`PollerKey`] — identifies one polling subscription in the registry.
//!
//! ## Rules
//! - `EventSource` equality and hashing are exact over all fields.
//! - `PollerKey` equality is exact (locations equal, or both absent), but
//!   its hash **folds the source location to lowercase**. Exact-equal keys
//!   still hash equally, so the `Hash`/`Eq` contract holds.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A monitored resource, as seen by the event subsystem.
///
/// The surrounding agent owns discovery and the full resource model; the
/// event core only needs a stable id, a display name, and the resource-type
/// name under which event definitions are declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resource {
    /// Stable resource id assigned by the host agent.
    pub id: u32,
    /// Display name, used in logs.
    pub name: Arc<str>,
    /// Resource-type name; the schema key for event-definition lookup.
    pub resource_type: Arc<str>,
}

impl Resource {
    /// Creates a resource identity.
    pub fn new(id: u32, name: impl Into<Arc<str>>, resource_type: impl Into<Arc<str>>) -> Self {
        Self {
            id,
            name: name.into(),
            resource_type: resource_type.into(),
        }
    }
}

/// Identity of a unique `(source location, event type, resource)` triple.
///
/// Constructed by [`EventManager`](crate::EventManager) when an event is
/// first accepted for a given source; used as the map key for per-source
/// counting inside a batch, and lives exactly as long as the batch that
/// references it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventSource {
    /// Adapter-defined location within the resource.
    pub location: Arc<str>,
    /// Declared event-type name.
    pub event_type: Arc<str>,
    /// Id of the emitting resource.
    pub resource_id: u32,
    /// Name of the emitting resource, for log readability.
    pub resource_name: Arc<str>,
}

impl EventSource {
    /// Creates the source identity for `event_type` at `location` on `resource`.
    pub fn new(
        location: impl Into<Arc<str>>,
        event_type: impl Into<Arc<str>>,
        resource: &Resource,
    ) -> Self {
        Self {
            location: location.into(),
            event_type: event_type.into(),
            resource_id: resource.id,
            resource_name: resource.name.clone(),
        }
    }
}

impl std::fmt::Display for EventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}[{}]@{}",
            self.event_type, self.location, self.resource_name
        )
    }
}

/// Identity of one polling subscription: `(resource id, event type, location)`.
///
/// The optional location distinguishes multiple pollers for the same event
/// type on one resource (e.g. one per watched log file). A poller registered
/// without a location covers events that carry their own locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerKey {
    /// Id of the resource the poller is bound to.
    pub resource_id: u32,
    /// Declared event-type name the poller produces.
    pub event_type: Arc<str>,
    /// Optional source location the subscription is scoped to.
    pub source_location: Option<Arc<str>>,
}

impl PollerKey {
    /// Creates a subscription key.
    pub fn new(
        resource_id: u32,
        event_type: impl Into<Arc<str>>,
        source_location: Option<&str>,
    ) -> Self {
        Self {
            resource_id,
            event_type: event_type.into(),
            source_location: source_location.map(Arc::from),
        }
    }
}

// The hash folds the location's case while equality compares it exactly:
// keys differing only in location case land in the same bucket yet remain
// distinct entries. Inherited from the original subsystem's key semantics.
impl Hash for PollerKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.resource_id.hash(state);
        self.event_type.hash(state);
        match &self.source_location {
            Some(loc) => {
                1u8.hash(state);
                loc.to_lowercase().hash(state);
            }
            None => 0u8.hash(state),
        }
    }
}
