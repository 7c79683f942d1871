//! API route configuration.

use crate::api::handlers::{
    events_handler, get_link_handler, list_links_handler, record_access_handler,
    shorten_handler, shorten_single_handler, validate_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All routes mounted under `/api`.
///
/// # Endpoints
///
/// - `POST /shorten`              - Create a batch of links (validity in minutes)
/// - `POST /shorten/single`       - Create one link (validity in days)
/// - `POST /validate`             - Validate a batch without creating anything
/// - `GET  /links`                - List links in creation order
/// - `GET  /links/{code}`         - Look up a link
/// - `POST /links/{code}/access`  - Record one access
/// - `GET  /events`               - Event log
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/shorten/single", post(shorten_single_handler))
        .route("/validate", post(validate_handler))
        .route("/links", get(list_links_handler))
        .route("/links/{code}", get(get_link_handler))
        .route("/links/{code}/access", post(record_access_handler))
        .route("/events", get(events_handler))
}
