//! DTOs for link lookup and access accounting.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::Link;

/// Link as returned by the API.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub short_id: String,
    pub target_url: String,
    pub short_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub access_count: u64,
    /// Whether `expires_at` has passed at response time.
    pub expired: bool,
}

impl LinkResponse {
    pub fn from_link(link: Link, short_url: String, now: DateTime<Utc>) -> Self {
        let expired = link.is_expired_at(now);
        Self {
            short_id: link.short_id,
            target_url: link.target_url,
            short_url,
            created_at: link.created_at,
            expires_at: link.expires_at,
            access_count: link.access_count,
            expired,
        }
    }
}

/// Response of `POST /api/links/{code}/access`.
#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub short_id: String,
    pub access_count: u64,
}

impl From<Link> for AccessResponse {
    fn from(link: Link) -> Self {
        Self {
            short_id: link.short_id,
            access_count: link.access_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_link_response_marks_expiry() {
        let now = Utc::now();
        let link = Link::new(
            "abc12".to_string(),
            "https://example.com".to_string(),
            now - Duration::minutes(10),
            now - Duration::minutes(1),
        );

        let response = LinkResponse::from_link(link, "http://s/abc12".to_string(), now);

        assert!(response.expired);
        assert_eq!(response.short_url, "http://s/abc12");
        assert_eq!(response.access_count, 0);
    }
}
