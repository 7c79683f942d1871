//! Handler for the event log.

use axum::{
    Json,
    extract::{Query, State},
};
use serde_json::json;

use crate::api::dto::events::EventsQuery;
use crate::domain::entities::DomainEvent;
use crate::error::AppError;
use crate::state::AppState;

/// Returns recorded events, oldest first.
///
/// # Endpoint
///
/// `GET /api/events?kind=ACCESS&limit=50`
///
/// Both query parameters are optional. `limit` keeps the newest matching
/// events.
///
/// # Errors
///
/// Returns 400 for an unknown `kind`.
pub async fn events_handler(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<DomainEvent>>, AppError> {
    let kind = query
        .kind_filter()
        .map_err(|message| AppError::bad_request(message, json!({ "kind": query.kind })))?;

    Ok(Json(query.apply(state.registry.events(), kind)))
}
