//! Domain event entity recorded for audit and display.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Kind of state change an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Create,
    Access,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Create => "CREATE",
            EventKind::Access => "ACCESS",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable record of a registry state change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainEvent {
    pub kind: EventKind,
    pub message: String,
    pub metadata: Value,
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent {
    pub fn new(
        kind: EventKind,
        message: impl Into<String>,
        metadata: Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            metadata,
            timestamp,
        }
    }
}

impl fmt::Display for DomainEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} - {} {}",
            self.timestamp.to_rfc3339(),
            self.kind,
            self.message,
            self.metadata
        )
    }
}
