//! Handlers for link lookup and access accounting.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::link::{AccessResponse, LinkResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Lists all links in creation order.
///
/// # Endpoint
///
/// `GET /api/links`
pub async fn list_links_handler(State(state): State<AppState>) -> Json<Vec<LinkResponse>> {
    let now = state.registry.now();
    let links = state
        .registry
        .list()
        .into_iter()
        .map(|link| {
            let short_url = state.short_url(&link.short_id);
            LinkResponse::from_link(link, short_url, now)
        })
        .collect();

    Json(links)
}

/// Looks up one link without counting an access.
///
/// # Endpoint
///
/// `GET /api/links/{code}`
///
/// # Errors
///
/// - 404 if no link has this identifier
/// - 410 if the link is expired and expiry is enforced
pub async fn get_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.registry.resolve(&code)?;
    let short_url = state.short_url(&link.short_id);

    Ok(Json(LinkResponse::from_link(
        link,
        short_url,
        state.registry.now(),
    )))
}

/// Records one access to a link.
///
/// # Endpoint
///
/// `POST /api/links/{code}/access`
///
/// # Response
///
/// ```json
/// { "short_id": "abc12", "access_count": 3 }
/// ```
///
/// # Errors
///
/// Returns 404 if no link has this identifier; nothing is recorded.
pub async fn record_access_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AccessResponse>, AppError> {
    let link = state.registry.record_access(&code)?;
    Ok(Json(link.into()))
}
