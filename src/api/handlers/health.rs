//! Handler for health check endpoint.

use axum::{Json, extract::State};

use crate::api::dto::health::HealthResponse;
use crate::application::services::ExpiryPolicy;
use crate::state::AppState;

/// Returns liveness and registry counters.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "links": 12,
///   "events": 40,
///   "expiry_policy": "advisory"
/// }
/// ```
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let expiry_policy = match state.registry.expiry_policy() {
        ExpiryPolicy::Advisory => "advisory",
        ExpiryPolicy::Enforced => "enforced",
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        links: state.registry.len(),
        events: state.registry.event_count(),
        expiry_policy: expiry_policy.to_string(),
    })
}
