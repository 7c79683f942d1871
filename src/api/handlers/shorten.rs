//! Handlers for link creation and batch validation.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::json;
use validator::Validate;

use crate::api::dto::link::LinkResponse;
use crate::api::dto::shorten::{
    BatchSummary, ShortenRequest, ShortenResponse, ShortenResultItem, SingleShortenRequest,
    ValidateResponse,
};
use crate::application::services::{BatchOutcome, BatchReport};
use crate::domain::entities::{NewLink, Validity, ValidityUnit};
use crate::error::AppError;
use crate::state::AppState;

/// Creates short links for a batch of URLs.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "urls": [
///     { "url": "https://example.com", "validity_minutes": 10, "shortcode": "promo" },
///     { "url": "https://rust-lang.org" }
///   ]
/// }
/// ```
///
/// `validity_minutes` and `shortcode` are optional; blank values count as
/// absent.
///
/// # Batch Processing
///
/// The whole batch is validated first. If any row is invalid, nothing is
/// registered and the response is 400 with the per-row report in
/// `error.details`. Otherwise each row is registered in order; a row whose
/// shortcode is taken by an existing link fails on its own.
///
/// # Response
///
/// ```json
/// {
///   "summary": { "total": 2, "successful": 2, "failed": 0 },
///   "items": [
///     {
///       "url": "https://example.com",
///       "short_id": "promo",
///       "short_url": "http://localhost:3000/promo",
///       "expires_at": "2026-03-01T12:10:00Z"
///     }
///   ]
/// }
/// ```
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    let requests = payload.into_creation_requests();

    let results = match state
        .registry
        .create_batch(&requests, ValidityUnit::Minutes)
    {
        BatchOutcome::Rejected(report) => return Err(rejected(report)),
        BatchOutcome::Processed(results) => results,
    };

    let total = results.len();
    let mut items = Vec::with_capacity(total);
    let mut successful = 0;
    let mut failed = 0;

    for item in results {
        match item.result {
            Ok(link) => {
                successful += 1;
                items.push(ShortenResultItem::Success {
                    url: link.target_url,
                    short_url: state.short_url(&link.short_id),
                    short_id: link.short_id,
                    expires_at: link.expires_at,
                });
            }
            Err(err) => {
                failed += 1;
                items.push(ShortenResultItem::Error {
                    url: item.request.url,
                    error: err.to_error_info(),
                });
            }
        }
    }

    Ok(Json(ShortenResponse {
        summary: BatchSummary {
            total,
            successful,
            failed,
        },
        items,
    }))
}

/// Creates one short link with validity in days.
///
/// # Endpoint
///
/// `POST /api/shorten/single`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com", "validity_days": 7, "shortcode": "docs" }
/// ```
///
/// # Errors
///
/// - 400 if the URL, validity or shortcode is malformed
/// - 409 if the shortcode is already registered
/// - 503 if no free identifier could be generated
pub async fn shorten_single_handler(
    State(state): State<AppState>,
    Json(payload): Json<SingleShortenRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    let payload = payload.normalize();
    payload.validate()?;

    let mut new_link = NewLink::new(payload.url);
    if let Some(days) = payload.validity_days {
        let validity = Validity::days(days).ok_or_else(|| {
            AppError::bad_request("Enter positive number", json!({ "validity_days": days }))
        })?;
        new_link = new_link.with_validity(validity);
    }
    if let Some(code) = payload.shortcode {
        new_link = new_link.with_preferred_code(code);
    }

    let link = state.registry.create(new_link)?;
    let short_url = state.short_url(&link.short_id);

    Ok((
        StatusCode::CREATED,
        Json(LinkResponse::from_link(link, short_url, state.registry.now())),
    ))
}

/// Validates a batch without registering anything.
///
/// # Endpoint
///
/// `POST /api/validate`
///
/// Always 200; `all_valid` tells whether `POST /api/shorten` would accept
/// the same body.
pub async fn validate_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Json<ValidateResponse> {
    let requests = payload.into_creation_requests();
    let report = state.registry.validate(&requests, ValidityUnit::Minutes);

    Json(ValidateResponse {
        max_batch_size: state.registry.max_batch_size(),
        report,
    })
}

/// Turns a failed validation report into a 400 carrying the report.
fn rejected(report: BatchReport) -> AppError {
    let message = match &report.batch_error {
        Some(err) => err.to_string(),
        None => format!(
            "{} of {} URLs are invalid",
            report.invalid_items(),
            report.items.len()
        ),
    };

    match serde_json::to_value(&report) {
        Ok(details) => AppError::bad_request(message, details),
        Err(e) => AppError::internal(
            "Failed to serialize validation report",
            json!({ "reason": e.to_string() }),
        ),
    }
}
