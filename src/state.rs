//! Shared application state injected into all handlers.

use std::sync::Arc;

use crate::application::services::LinkRegistry;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<LinkRegistry>,
    /// Public origin without trailing slash, e.g. `https://s.example.com`.
    pub base_url: String,
}

impl AppState {
    pub fn new(registry: Arc<LinkRegistry>, base_url: impl Into<String>) -> Self {
        Self {
            registry,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Full short URL for an identifier.
    pub fn short_url(&self, short_id: &str) -> String {
        format!("{}/{}", self.base_url, short_id)
    }
}
