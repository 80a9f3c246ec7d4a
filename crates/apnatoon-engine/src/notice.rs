//! Flattened domain events for hosts.

use apnatoon_core::event::DomainEvent;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A domain event in a context-independent shape, ready to show as a
/// transient notice or to forward to a host's own telemetry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Event type name, e.g. `story.translation_failed`.
    pub event_type: String,
    /// Story (or draft) the event is about.
    pub subject_id: String,
    /// Serialized event payload.
    pub payload: serde_json::Value,
    /// Correlation ID shared by the events of one operation.
    pub correlation_id: Uuid,
    /// Timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
}

impl Notice {
    /// Whether this notice reports a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.event_type.ends_with("failed")
    }
}

pub(crate) fn to_notice(event: &dyn DomainEvent) -> Notice {
    let meta = event.metadata();
    Notice {
        event_id: meta.event_id,
        event_type: event.event_type().to_owned(),
        subject_id: meta.subject_id.clone(),
        payload: event.to_payload(),
        correlation_id: meta.correlation_id,
        occurred_at: meta.occurred_at,
    }
}
