//! DTOs for the link creation and batch validation endpoints.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::LazyLock;
use validator::Validate;

use crate::application::services::{BatchReport, CreationRequest};
use crate::error::ErrorInfo;

/// Characters allowed in a caller-supplied shortcode.
static SHORTCODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("shortcode pattern is valid"));

/// Request to shorten one or more URLs.
///
/// The batch is checked as a whole by the registry's batch validator, so
/// the items carry raw form values rather than validated types.
#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    #[serde(default)]
    pub urls: Vec<UrlItem>,
}

/// One row of a batch: raw URL, validity in minutes and optional shortcode.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UrlItem {
    #[serde(default)]
    pub url: String,

    /// Accepts either a JSON number or a string, as typed by the caller.
    #[serde(default, deserialize_with = "number_or_string")]
    pub validity_minutes: Option<String>,

    #[serde(default)]
    pub shortcode: Option<String>,
}

impl From<UrlItem> for CreationRequest {
    fn from(item: UrlItem) -> Self {
        CreationRequest {
            url: item.url,
            validity: item.validity_minutes,
            shortcode: item.shortcode,
        }
    }
}

impl ShortenRequest {
    pub fn into_creation_requests(self) -> Vec<CreationRequest> {
        self.urls.into_iter().map(CreationRequest::from).collect()
    }
}

fn number_or_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    }))
}

/// Response containing batch processing results.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub summary: BatchSummary,
    pub items: Vec<ShortenResultItem>,
}

/// Individual result for a URL in the batch.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ShortenResultItem {
    Success {
        url: String,
        short_id: String,
        short_url: String,
        expires_at: chrono::DateTime<chrono::Utc>,
    },
    Error {
        url: String,
        error: ErrorInfo,
    },
}

/// Summary statistics for batch processing.
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

/// Response of `POST /api/validate`.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub max_batch_size: usize,
    #[serde(flatten)]
    pub report: BatchReport,
}

/// Request to shorten a single URL, with validity in days.
#[derive(Debug, Deserialize, Validate)]
pub struct SingleShortenRequest {
    #[validate(url(message = "Invalid URL"))]
    pub url: String,

    #[validate(range(min = 1, message = "Enter positive number"))]
    pub validity_days: Option<i64>,

    #[validate(length(min = 1, max = 10, message = "Shortcode must be 1-10 characters"))]
    #[validate(regex(
        path = "*SHORTCODE_REGEX",
        message = "Shortcode can only contain letters, digits, '-' and '_'"
    ))]
    pub shortcode: Option<String>,
}

impl SingleShortenRequest {
    /// Treats a blank shortcode as absent.
    pub fn normalize(mut self) -> Self {
        if self
            .shortcode
            .as_deref()
            .is_some_and(|code| code.trim().is_empty())
        {
            self.shortcode = None;
        }
        self
    }
}
