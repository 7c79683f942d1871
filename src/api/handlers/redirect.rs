//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short identifier to its target URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Resolve the identifier (honours the expiry policy)
/// 2. Build the `Location` header from the target URL
/// 3. Record one access, which also appends an `ACCESS` event
/// 4. Return 307 Temporary Redirect
///
/// # Errors
///
/// - 404 if no link has this identifier
/// - 410 if the link is expired and expiry is enforced
/// - 500 if the stored target cannot be sent as a header; no access is
///   recorded
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let link = state.registry.resolve(&code)?;

    let location = HeaderValue::from_str(&link.target_url).map_err(|e| {
        AppError::internal(
            "Target URL is not a valid Location header",
            json!({ "short_id": link.short_id, "reason": e.to_string() }),
        )
    })?;

    let link = state.registry.record_access(&link.short_id)?;

    debug!(short_id = %code, access_count = link.access_count, "Redirecting");

    Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]))
}
