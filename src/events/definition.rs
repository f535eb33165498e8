//! # Event-type declarations and their lookup seam.
//!
//! A resource type declares which event types its resources may emit. That
//! schema lives in the (external) resource metadata subsystem; the event
//! core only needs to ask "is this event type declared for this resource
//! type?", which the [`EventDefinitionResolver`] trait abstracts as a pure
//! synchronous query.
//!
//! [`StaticResolver`] is a map-backed implementation for embedders with a
//! fixed schema, and the workhorse of this crate's tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A declared event type for some resource type: name plus display metadata.
///
/// Looked up, never constructed, by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDefinition {
    /// Event-type name, matched against [`Event::event_type`](crate::Event::event_type).
    pub name: Arc<str>,
    /// Optional human-readable description.
    pub description: Option<Arc<str>>,
}

impl EventDefinition {
    /// Creates a definition with no description.
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

/// Resolves an event-type name against a resource type's declared schema.
///
/// Supplied by the host environment. Must be cheap and non-blocking: it is
/// consulted on every publish and on every appended poll result.
pub trait EventDefinitionResolver: Send + Sync + 'static {
    /// Returns the matching definition, or `None` for an undeclared type.
    fn resolve(&self, event_type: &str, resource_type: &str) -> Option<EventDefinition>;
}

/// Map-backed resolver over a fixed `resource type -> declared event types`
/// schema.
///
/// ## Example
/// ```rust
/// use eventpipe::{EventDefinitionResolver, StaticResolver};
///
/// let resolver = StaticResolver::new()
///     .declare("PostgresServer", "logEntry")
///     .declare("PostgresServer", "replicationLag");
///
/// assert!(resolver.resolve("logEntry", "PostgresServer").is_some());
/// assert!(resolver.resolve("logEntry", "FileSystem").is_none());
/// ```
#[derive(Debug, Default)]
pub struct StaticResolver {
    schema: HashMap<Arc<str>, HashSet<Arc<str>>>,
}

impl StaticResolver {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `event_type` as legal for `resource_type`.
    pub fn declare(
        mut self,
        resource_type: impl Into<Arc<str>>,
        event_type: impl Into<Arc<str>>,
    ) -> Self {
        self.schema
            .entry(resource_type.into())
            .or_default()
            .insert(event_type.into());
        self
    }
}

impl EventDefinitionResolver for StaticResolver {
    fn resolve(&self, event_type: &str, resource_type: &str) -> Option<EventDefinition> {
        self.schema
            .get(resource_type)?
            .get(event_type)
            .map(|name| EventDefinition {
                name: name.clone(),
                description: None,
            })
    }
}
