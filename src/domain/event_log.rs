//! Append-only log of domain events.
//!
//! The recorder keeps events in insertion order and never mutates a stored
//! entry. With [`EventRetention::MaxEntries`] the oldest entries are evicted
//! once the log is full; the survivors keep their relative order.
//!
//! Every recorded event is also forwarded to an [`EventSink`], which lets the
//! log be mirrored to structured logging or another external consumer.

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::entities::{DomainEvent, EventKind};

/// How many events the recorder keeps in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventRetention {
    Unbounded,
    MaxEntries(NonZeroUsize),
}

impl EventRetention {
    fn limit(&self) -> Option<usize> {
        match self {
            EventRetention::Unbounded => None,
            EventRetention::MaxEntries(n) => Some(n.get()),
        }
    }
}

/// Receives a copy of every recorded event.
#[cfg_attr(test, mockall::automock)]
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &DomainEvent);
}

/// Emits events as structured `tracing` records.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn publish(&self, event: &DomainEvent) {
        tracing::info!(
            target: "shortlink_registry::events",
            kind = %event.kind,
            metadata = %event.metadata,
            "{}",
            event.message
        );
    }
}

/// Append-only, read-only-from-outside event history.
pub struct EventRecorder {
    entries: RwLock<VecDeque<DomainEvent>>,
    retention: EventRetention,
    sink: Option<Arc<dyn EventSink>>,
}

impl EventRecorder {
    pub fn new(retention: EventRetention) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            retention,
            sink: None,
        }
    }

    /// Forwards every future event to `sink` as well.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn retention(&self) -> EventRetention {
        self.retention
    }

    /// Appends one event and returns a copy of it.
    pub fn record(
        &self,
        kind: EventKind,
        message: impl Into<String>,
        metadata: Value,
        timestamp: DateTime<Utc>,
    ) -> DomainEvent {
        let event = DomainEvent::new(kind, message, metadata, timestamp);

        {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            if let Some(limit) = self.retention.limit() {
                while entries.len() >= limit {
                    entries.pop_front();
                }
            }
            entries.push_back(event.clone());
        }

        if let Some(sink) = &self.sink {
            sink.publish(&event);
        }

        event
    }

    /// Snapshot of the retained history, oldest first.
    pub fn all(&self) -> Vec<DomainEvent> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventRecorder {
    fn default() -> Self {
        Self::new(EventRetention::Unbounded)
    }
}

impl std::fmt::Debug for EventRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRecorder")
            .field("len", &self.len())
            .field("retention", &self.retention)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_access(recorder: &EventRecorder, short_id: &str) -> DomainEvent {
        recorder.record(
            EventKind::Access,
            "Accessed shortlink",
            json!({ "short_id": short_id }),
            Utc::now(),
        )
    }

    #[test]
    fn test_record_appends_in_order() {
        let recorder = EventRecorder::default();
        recorder.record(
            EventKind::Create,
            "Created shortlink",
            json!({ "short_id": "a" }),
            Utc::now(),
        );
        record_access(&recorder, "a");
        record_access(&recorder, "b");

        let all = recorder.all();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].kind, EventKind::Create);
        assert_eq!(all[1].metadata["short_id"], "a");
        assert_eq!(all[2].metadata["short_id"], "b");
    }

    #[test]
    fn test_all_is_idempotent_without_writes() {
        let recorder = EventRecorder::default();
        record_access(&recorder, "a");

        assert_eq!(recorder.all(), recorder.all());
    }

    #[test]
    fn test_bounded_retention_evicts_oldest_first() {
        let recorder = EventRecorder::new(EventRetention::MaxEntries(NonZeroUsize::new(2).unwrap()));
        for id in ["a", "b", "c", "d"] {
            record_access(&recorder, id);
        }

        let ids: Vec<_> = recorder
            .all()
            .iter()
            .map(|e| e.metadata["short_id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["c", "d"]);
    }

    #[test]
    fn test_unbounded_retention_keeps_everything() {
        let recorder = EventRecorder::new(EventRetention::Unbounded);
        for i in 0..1_000 {
            record_access(&recorder, &i.to_string());
        }
        assert_eq!(recorder.len(), 1_000);
    }

    #[test]
    fn test_every_event_reaches_sink() {
        let mut sink = MockEventSink::new();
        sink.expect_publish()
            .withf(|event| event.kind == EventKind::Access && event.metadata["short_id"] == "xyz")
            .times(2)
            .return_const(());

        let recorder = EventRecorder::default().with_sink(Arc::new(sink));
        record_access(&recorder, "xyz");
        record_access(&recorder, "xyz");
    }

    #[test]
    fn test_sink_sees_evicted_events_too() {
        let mut sink = MockEventSink::new();
        sink.expect_publish().times(3).return_const(());

        let recorder = EventRecorder::new(EventRetention::MaxEntries(NonZeroUsize::MIN))
            .with_sink(Arc::new(sink));
        for id in ["a", "b", "c"] {
            record_access(&recorder, id);
        }

        assert_eq!(recorder.len(), 1);
    }
}
