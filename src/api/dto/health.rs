//! DTOs for health check endpoint.

use serde::Serialize;

/// Liveness response with registry counters.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub links: usize,
    pub events: usize,
    pub expiry_policy: String,
}
