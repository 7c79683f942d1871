//! Query parameters for the event log endpoint.

use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

use crate::domain::entities::{DomainEvent, EventKind};

/// Filters for `GET /api/events`.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    /// `CREATE` or `ACCESS`, case-insensitive.
    #[serde(default)]
    pub kind: Option<String>,

    /// Return only the newest `limit` matching events.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<usize>,
}

impl EventsQuery {
    /// Parses the `kind` filter.
    pub fn kind_filter(&self) -> Result<Option<EventKind>, String> {
        match self.kind.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(kind) if kind.eq_ignore_ascii_case("create") => Ok(Some(EventKind::Create)),
            Some(kind) if kind.eq_ignore_ascii_case("access") => Ok(Some(EventKind::Access)),
            Some(other) => Err(format!("Unknown event kind '{}'", other)),
        }
    }

    /// Applies the filters, keeping chronological order.
    pub fn apply(&self, events: Vec<DomainEvent>, kind: Option<EventKind>) -> Vec<DomainEvent> {
        let mut events: Vec<DomainEvent> = events
            .into_iter()
            .filter(|e| kind.is_none_or(|k| e.kind == k))
            .collect();

        if let Some(limit) = self.limit {
            let skip = events.len().saturating_sub(limit);
            events.drain(..skip);
        }
        events
    }
}
