//! # The event record and its severity scale.
//!
//! An [`Event`] is a discrete, immutable telemetry record emitted by a
//! monitored resource: a log-file line, a state-change notification, and so
//! on. Events are produced by resource-adapter code, validated against the
//! resource type's declared event definitions, and buffered in the live
//! [`EventBatch`](crate::EventBatch) until the next send cycle.
//!
//! ## Rules
//! - Events are **never mutated** after creation.
//! - An event is owned by whichever batch currently holds it.
//! - `source_location` is an adapter-defined string identifying where within
//!   the resource the event originated (e.g. a log file path).
//!
//! ## Example
//! ```rust
//! use eventpipe::{Event, Severity};
//!
//! let ev = Event::new("logEntry", Severity::Warning, "disk above 90%", "/var/log/messages");
//! assert_eq!(ev.event_type.as_ref(), "logEntry");
//! assert_eq!(ev.severity, Severity::Warning);
//! ```

use std::sync::Arc;
use std::time::SystemTime;

/// Severity of an [`Event`], ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Diagnostic detail, normally uninteresting.
    Debug,
    /// Routine informational notice.
    Info,
    /// Something unexpected that does not impair the resource.
    Warning,
    /// A failure affecting part of the resource.
    Error,
    /// A failure rendering the resource unusable.
    Fatal,
}

impl Severity {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

/// A discrete, immutable telemetry record.
///
/// Fields are public and cheap to clone (`Arc<str>` payloads); construct via
/// [`Event::new`] for a wall-clock timestamp or [`Event::at`] to backdate
/// (pollers that parse timestamped log lines use the latter).
#[derive(Debug, Clone)]
pub struct Event {
    /// Name of a declared [`EventDefinition`](crate::EventDefinition) for
    /// the emitting resource's type.
    pub event_type: Arc<str>,
    /// When the event occurred.
    pub timestamp: SystemTime,
    /// Severity classification.
    pub severity: Severity,
    /// Human-readable payload.
    pub detail: Arc<str>,
    /// Where within the resource the event originated.
    pub source_location: Arc<str>,
}

impl Event {
    /// Creates an event timestamped with the current wall clock.
    pub fn new(
        event_type: impl Into<Arc<str>>,
        severity: Severity,
        detail: impl Into<Arc<str>>,
        source_location: impl Into<Arc<str>>,
    ) -> Self {
        Self::at(
            event_type,
            SystemTime::now(),
            severity,
            detail,
            source_location,
        )
    }

    /// Creates an event with an explicit timestamp.
    pub fn at(
        event_type: impl Into<Arc<str>>,
        timestamp: SystemTime,
        severity: Severity,
        detail: impl Into<Arc<str>>,
        source_location: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp,
            severity,
            detail: detail.into(),
            source_location: source_location.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
        assert_eq!(Severity::Fatal.as_label(), "fatal");
    }

    #[test]
    fn backdated_event_keeps_timestamp() {
        let then = SystemTime::UNIX_EPOCH;
        let ev = Event::at("logEntry", then, Severity::Info, "boot", "/var/log/boot.log");
        assert_eq!(ev.timestamp, then);
    }
}
