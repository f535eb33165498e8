//! Error types used by the eventpipe runtime and its collaborators.
//!
//! This module defines three error enums, one per failure plane:
//!
//! - [`EventError`] — synchronous API-misuse errors raised to callers of the
//!   per-resource facade ([`EventContext`](crate::EventContext)).
//! - [`PollError`] — failures returned by poll callbacks; terminal at the
//!   poll worker (logged, never propagated, never cancels the schedule).
//! - [`TransportError`] — failures reported by the batch transport; terminal
//!   inside the send worker (logged, never propagated, never retried).
//!
//! All types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics. Capacity overflow is deliberately **not** an error
//! anywhere in this crate: it is represented purely as drop-counter
//! increments on the live batch.

use thiserror::Error;

/// # Errors raised synchronously to facade callers.
///
/// These represent misuse of the collection API by resource-adapter code,
/// such as publishing an event whose type is not declared for the owning
/// resource's type. They are never raised from background workers.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// The event type is not declared for the resource's type.
    #[error("event type [{event_type}] is not declared for resource type [{resource_type}]")]
    UnknownEventType {
        /// The undeclared event type name.
        event_type: String,
        /// The resource type whose schema was consulted.
        resource_type: String,
    },

    /// A batched publish was called with an empty set of events.
    #[error("publish called with no events")]
    NoEvents,
}

impl EventError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventpipe::EventError;
    ///
    /// let err = EventError::NoEvents;
    /// assert_eq!(err.as_label(), "no_events");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            EventError::UnknownEventType { .. } => "unknown_event_type",
            EventError::NoEvents => "no_events",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            EventError::UnknownEventType {
                event_type,
                resource_type,
            } => format!("unknown event type [{event_type}] for resource type [{resource_type}]"),
            EventError::NoEvents => "no events supplied".to_string(),
        }
    }
}

/// # Errors produced by poll callback execution.
///
/// A poller returning `Err` is logged by the poll worker and the next
/// scheduled tick still runs; one misbehaving poller must never abort
/// collection for co-scheduled pollers.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PollError {
    /// Poll invocation failed; the subscription stays scheduled.
    #[error("poll failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },
}

impl PollError {
    /// Builds a failure from any displayable error.
    pub fn fail(error: impl std::fmt::Display) -> Self {
        PollError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PollError::Fail { .. } => "poll_failed",
        }
    }
}

/// # Errors reported by the batch transport.
///
/// Caught entirely within the send worker: logged, not retried, and the
/// batch is discarded (lost-on-failure is the accepted policy — telemetry
/// loss must never cascade into collection-path failure).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TransportError {
    /// The remote collector rejected or failed to receive the batch.
    #[error("batch send failed: {error}")]
    SendFailed {
        /// The underlying error message.
        error: String,
    },
}

impl TransportError {
    /// Builds a send failure from any displayable error.
    pub fn send_failed(error: impl std::fmt::Display) -> Self {
        TransportError::SendFailed {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TransportError::SendFailed { .. } => "batch_send_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        let err = EventError::UnknownEventType {
            event_type: "logEntry".into(),
            resource_type: "FileSystem".into(),
        };
        assert_eq!(err.as_label(), "unknown_event_type");
        assert!(err.as_message().contains("logEntry"));
        assert_eq!(PollError::fail("boom").as_label(), "poll_failed");
        assert_eq!(
            TransportError::send_failed("conn reset").as_label(),
            "batch_send_failed"
        );
    }
}
