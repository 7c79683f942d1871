//! Batch validation for link creation requests.
//!
//! A batch is checked as a unit: URL and shortcode uniqueness are evaluated
//! across all items, and every item gets its own field-level error set so a
//! caller can show all problems at once. Validation is a pure function of the
//! batch, the validity unit and the creation instant; uniqueness against already-registered identifiers is checked later
//! by [`crate::application::services::LinkRegistry`].

use std::collections::HashSet;
use std::num::IntErrorKind;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use url::Url;

use crate::domain::entities::{NewLink, Validity, ValidityUnit};
use crate::utils::code_generator::validate_preferred_code;

/// Default upper bound on the number of items in one batch.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 5;

/// One proposed link, as submitted by a caller.
///
/// Optional fields hold the raw text the caller typed; empty or
/// whitespace-only values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreationRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcode: Option<String>,
}

impl CreationRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_validity(mut self, validity: impl Into<String>) -> Self {
        self.validity = Some(validity.into());
        self
    }

    pub fn with_shortcode(mut self, shortcode: impl Into<String>) -> Self {
        self.shortcode = Some(shortcode.into());
        self
    }

    fn validity_text(&self) -> Option<&str> {
        non_blank(self.validity.as_deref())
    }

    fn shortcode_text(&self) -> Option<&str> {
        non_blank(self.shortcode.as_deref())
    }

    /// Converts an item that passed validation into registry input.
    fn to_new_link(&self, unit: ValidityUnit) -> NewLink {
        NewLink {
            url: self.url.clone(),
            validity: self
                .validity_text()
                .and_then(|raw| parse_validity(raw).ok())
                .and_then(|amount| Validity::new(amount, unit)),
            preferred_code: self.shortcode_text().map(str::to_string),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A single field-level problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("URL required")]
    UrlRequired,
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Duplicate URL")]
    DuplicateUrl,
    #[error("Enter positive number")]
    NonPositiveValidity,
    #[error("Validity is out of range")]
    ValidityOutOfRange,
    #[error("{0}")]
    InvalidShortcode(&'static str),
    #[error("Duplicate shortcode")]
    DuplicateShortcode,
}

impl FieldError {
    pub fn code(&self) -> &'static str {
        match self {
            FieldError::UrlRequired => "url_required",
            FieldError::InvalidUrl => "invalid_url",
            FieldError::DuplicateUrl => "duplicate_url",
            FieldError::NonPositiveValidity => "non_positive_validity",
            FieldError::ValidityOutOfRange => "validity_out_of_range",
            FieldError::InvalidShortcode(_) => "invalid_shortcode",
            FieldError::DuplicateShortcode => "duplicate_shortcode",
        }
    }
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Repr<'a> {
            code: &'a str,
            message: String,
        }

        Repr {
            code: self.code(),
            message: self.to_string(),
        }
        .serialize(serializer)
    }
}

/// Errors attached to one batch item, at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcode: Option<FieldError>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.validity.is_none() && self.shortcode.is_none()
    }
}

/// A batch item annotated with its errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedItem {
    pub request: CreationRequest,
    pub errors: FieldErrors,
}

/// Problems with the batch as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    #[error("At least one URL is required")]
    Empty,
    #[error("Maximum {max} URLs at once.")]
    TooLarge { size: usize, max: usize },
}

impl Serialize for BatchError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of validating a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub all_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_error: Option<BatchError>,
    pub items: Vec<ValidatedItem>,
}

impl BatchReport {
    /// Registry input for every item, or `None` if the batch was not valid.
    pub fn accepted(&self, unit: ValidityUnit) -> Option<Vec<NewLink>> {
        self.all_valid.then(|| {
            self.items
                .iter()
                .map(|item| item.request.to_new_link(unit))
                .collect()
        })
    }

    /// Number of items carrying at least one field error.
    pub fn invalid_items(&self) -> usize {
        self.items.iter().filter(|i| !i.errors.is_empty()).count()
    }
}

/// Stateless validator for batches of creation requests.
#[derive(Debug, Clone, Copy)]
pub struct BatchValidator {
    max_size: usize,
}

impl BatchValidator {
    pub fn new(max_size: usize) -> Self {
        Self { max_size }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Validates `batch` as a unit, reading validity amounts in `unit` and
    /// computing expiry from `at`.
    ///
    /// # Rules
    ///
    /// - Size: 1 to `max_size` items, checked before any item is inspected
    /// - `url`: required, absolute, free of control characters, not repeated
    ///   earlier in the batch (exact string comparison, the first occurrence
    ///   wins)
    /// - `validity`: if present, a positive integer whose expiry from `at`
    ///   is a representable timestamp
    /// - `shortcode`: if present, well-formed and not repeated earlier in
    ///   the batch
    pub fn validate(
        &self,
        batch: &[CreationRequest],
        unit: ValidityUnit,
        at: DateTime<Utc>,
    ) -> BatchReport {
        let batch_error = if batch.is_empty() {
            Some(BatchError::Empty)
        } else if batch.len() > self.max_size {
            Some(BatchError::TooLarge {
                size: batch.len(),
                max: self.max_size,
            })
        } else {
            None
        };

        if let Some(error) = batch_error {
            return BatchReport {
                all_valid: false,
                batch_error: Some(error),
                items: batch
                    .iter()
                    .map(|request| ValidatedItem {
                        request: request.clone(),
                        errors: FieldErrors::default(),
                    })
                    .collect(),
            };
        }

        let mut urls: HashSet<&str> = HashSet::new();
        let mut shortcodes: HashSet<&str> = HashSet::new();

        let items: Vec<ValidatedItem> = batch
            .iter()
            .map(|request| {
                let mut errors = FieldErrors::default();

                match check_url(&request.url) {
                    Err(e) => errors.url = Some(e),
                    Ok(()) if !urls.insert(request.url.as_str()) => {
                        errors.url = Some(FieldError::DuplicateUrl)
                    }
                    Ok(()) => {}
                }

                if let Some(raw) = request.validity_text() {
                    errors.validity = check_validity(raw, unit, at).err();
                }

                if let Some(code) = request.shortcode_text() {
                    if let Err(reason) = validate_preferred_code(code) {
                        errors.shortcode = Some(FieldError::InvalidShortcode(reason));
                    } else if !shortcodes.insert(code) {
                        errors.shortcode = Some(FieldError::DuplicateShortcode);
                    }
                }

                ValidatedItem {
                    request: request.clone(),
                    errors,
                }
            })
            .collect();

        BatchReport {
            all_valid: items.iter().all(|i| i.errors.is_empty()),
            batch_error: None,
            items,
        }
    }
}

impl Default for BatchValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BATCH_SIZE)
    }
}

/// Checks that `url` is present and parses as an absolute URL.
///
/// The URL is stored as typed, so control characters are rejected even
/// though the parser would strip them: they cannot go into a `Location`
/// header.
pub(crate) fn check_url(url: &str) -> Result<(), FieldError> {
    if url.trim().is_empty() {
        return Err(FieldError::UrlRequired);
    }
    if url.chars().any(char::is_control) {
        return Err(FieldError::InvalidUrl);
    }
    Url::parse(url).map(|_| ()).map_err(|_| FieldError::InvalidUrl)
}

fn parse_validity(raw: &str) -> Result<i64, FieldError> {
    match raw.trim().parse::<i64>() {
        Ok(amount) if amount > 0 => Ok(amount),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Err(FieldError::ValidityOutOfRange),
        _ => Err(FieldError::NonPositiveValidity),
    }
}

fn check_validity(raw: &str, unit: ValidityUnit, at: DateTime<Utc>) -> Result<(), FieldError> {
    let validity =
        Validity::new(parse_validity(raw)?, unit).ok_or(FieldError::NonPositiveValidity)?;
    validity
        .to_duration()
        .and_then(|d| at.checked_add_signed(d))
        .map(|_| ())
        .ok_or(FieldError::ValidityOutOfRange)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        "2026-03-01T12:00:00Z".parse().unwrap()
    }

    fn check(batch: &[CreationRequest]) -> BatchReport {
        BatchValidator::default().validate(batch, ValidityUnit::Minutes, now())
    }

    #[test]
    fn test_valid_single_item() {
        let report = check(&[CreationRequest::new("https://example.com")]);

        assert!(report.all_valid);
        assert!(report.batch_error.is_none());
        assert!(report.items[0].errors.is_empty());
    }

    #[test]
    fn test_duplicate_url_flags_only_later_item() {
        let report = check(&[
            CreationRequest::new("https://a.com"),
            CreationRequest::new("https://a.com"),
        ]);

        assert!(!report.all_valid);
        assert!(report.items[0].errors.is_empty());
        assert_eq!(report.items[1].errors.url, Some(FieldError::DuplicateUrl));
        assert_eq!(report.invalid_items(), 1);
    }

    #[test]
    fn test_duplicate_url_comparison_is_case_sensitive() {
        let report = check(&[
            CreationRequest::new("https://a.com/Path"),
            CreationRequest::new("https://a.com/path"),
        ]);

        assert!(report.all_valid);
    }

    #[test]
    fn test_third_duplicate_is_flagged_as_well() {
        let report = check(&[
            CreationRequest::new("https://a.com"),
            CreationRequest::new("https://b.com"),
            CreationRequest::new("https://a.com"),
            CreationRequest::new("https://a.com"),
        ]);

        assert!(report.items[0].errors.is_empty());
        assert!(report.items[1].errors.is_empty());
        assert_eq!(report.items[2].errors.url, Some(FieldError::DuplicateUrl));
        assert_eq!(report.items[3].errors.url, Some(FieldError::DuplicateUrl));
    }

    #[test]
    fn test_missing_and_malformed_urls() {
        let report = check(&[
            CreationRequest::new(""),
            CreationRequest::new("   "),
            CreationRequest::new("not-a-url"),
            CreationRequest::new("example.com/path"),
        ]);

        assert_eq!(report.items[0].errors.url, Some(FieldError::UrlRequired));
        assert_eq!(report.items[1].errors.url, Some(FieldError::UrlRequired));
        assert_eq!(report.items[2].errors.url, Some(FieldError::InvalidUrl));
        assert_eq!(report.items[3].errors.url, Some(FieldError::InvalidUrl));
    }

    #[test]
    fn test_invalid_url_does_not_count_towards_duplicates() {
        let report = check(&[
            CreationRequest::new("bad url"),
            CreationRequest::new("bad url"),
        ]);

        assert_eq!(report.items[0].errors.url, Some(FieldError::InvalidUrl));
        assert_eq!(report.items[1].errors.url, Some(FieldError::InvalidUrl));
    }

    #[test]
    fn test_validity_must_be_positive_integer() {
        let report = check(&[
            CreationRequest::new("https://a.com").with_validity("10"),
            CreationRequest::new("https://b.com").with_validity("0"),
            CreationRequest::new("https://c.com").with_validity("-3"),
            CreationRequest::new("https://d.com").with_validity("1.5"),
            CreationRequest::new("https://e.com").with_validity("abc"),
        ]);

        assert!(report.items[0].errors.is_empty());
        for item in &report.items[1..] {
            assert_eq!(item.errors.validity, Some(FieldError::NonPositiveValidity));
        }
    }

    #[test]
    fn test_validity_has_no_upper_bound() {
        let report = check(&[CreationRequest::new("https://a.com").with_validity("99999999")]);
        assert!(report.all_valid);
    }

    #[test]
    fn test_validity_beyond_timestamp_range_is_out_of_range() {
        let report = check(&[
            CreationRequest::new("https://a.com").with_validity("5"),
            CreationRequest::new("https://b.com").with_validity("9999999999999999"),
            CreationRequest::new("https://c.com").with_validity("99999999999999999999"),
        ]);

        assert!(!report.all_valid);
        assert!(report.items[0].errors.is_empty());
        assert_eq!(
            report.items[1].errors.validity,
            Some(FieldError::ValidityOutOfRange)
        );
        assert_eq!(
            report.items[2].errors.validity,
            Some(FieldError::ValidityOutOfRange)
        );
        assert_eq!(
            report.items[2].errors.validity.unwrap().to_string(),
            "Validity is out of range"
        );
    }

    #[test]
    fn test_day_validity_overflows_sooner_than_minutes() {
        let amount = "100000000000";
        let batch = [CreationRequest::new("https://a.com").with_validity(amount)];

        let minutes = BatchValidator::default().validate(&batch, ValidityUnit::Minutes, now());
        let days = BatchValidator::default().validate(&batch, ValidityUnit::Days, now());

        assert!(minutes.all_valid);
        assert_eq!(
            days.items[0].errors.validity,
            Some(FieldError::ValidityOutOfRange)
        );
    }

    #[test]
    fn test_urls_with_control_characters_are_invalid() {
        let report = check(&[
            CreationRequest::new("https://example.com/a\nb"),
            CreationRequest::new("https://example.com/\tx"),
            CreationRequest::new("https://example.com/\r"),
        ]);

        assert!(!report.all_valid);
        for item in &report.items {
            assert_eq!(item.errors.url, Some(FieldError::InvalidUrl));
        }
    }

    #[test]
    fn test_blank_optional_fields_are_absent() {
        let report = check(&[CreationRequest::new("https://a.com")
            .with_validity("  ")
            .with_shortcode("")]);

        assert!(report.all_valid);
        let links = report.accepted(ValidityUnit::Minutes).unwrap();
        assert_eq!(links[0].validity, None);
        assert_eq!(links[0].preferred_code, None);
    }

    #[test]
    fn test_duplicate_shortcode_in_batch() {
        let report = check(&[
            CreationRequest::new("https://a.com").with_shortcode("promo"),
            CreationRequest::new("https://b.com").with_shortcode("promo"),
        ]);

        assert!(!report.all_valid);
        assert!(report.items[0].errors.is_empty());
        assert_eq!(
            report.items[1].errors.shortcode,
            Some(FieldError::DuplicateShortcode)
        );
    }

    #[test]
    fn test_malformed_shortcode() {
        let report = check(&[
            CreationRequest::new("https://a.com").with_shortcode("has space"),
            CreationRequest::new("https://b.com").with_shortcode("api"),
        ]);

        assert!(matches!(
            report.items[0].errors.shortcode,
            Some(FieldError::InvalidShortcode(_))
        ));
        assert!(matches!(
            report.items[1].errors.shortcode,
            Some(FieldError::InvalidShortcode(_))
        ));
    }

    #[test]
    fn test_item_can_carry_errors_on_every_field() {
        let report = check(&[
            CreationRequest::new("https://a.com").with_shortcode("x"),
            CreationRequest::new("https://a.com")
                .with_validity("0")
                .with_shortcode("x"),
        ]);

        let errors = &report.items[1].errors;
        assert_eq!(errors.url, Some(FieldError::DuplicateUrl));
        assert_eq!(errors.validity, Some(FieldError::NonPositiveValidity));
        assert_eq!(errors.shortcode, Some(FieldError::DuplicateShortcode));
    }

    #[test]
    fn test_oversized_batch_rejected_without_inspecting_items() {
        let batch: Vec<_> = (0..6).map(|_| CreationRequest::new("")).collect();
        let report = check(&batch);

        assert!(!report.all_valid);
        assert_eq!(
            report.batch_error,
            Some(BatchError::TooLarge { size: 6, max: 5 })
        );
        assert_eq!(report.items.len(), 6);
        assert!(report.items.iter().all(|i| i.errors.is_empty()));
    }

    #[test]
    fn test_empty_batch_rejected() {
        let report = check(&[]);
        assert!(!report.all_valid);
        assert_eq!(report.batch_error, Some(BatchError::Empty));
    }

    #[test]
    fn test_custom_max_size() {
        let batch = vec![
            CreationRequest::new("https://a.com"),
            CreationRequest::new("https://b.com"),
        ];

        assert!(BatchValidator::new(2).validate(&batch, ValidityUnit::Minutes, now()).all_valid);
        assert!(!BatchValidator::new(1).validate(&batch, ValidityUnit::Minutes, now()).all_valid);
    }

    #[test]
    fn test_accepted_converts_with_unit() {
        let report = check(&[CreationRequest::new("https://a.com")
            .with_validity(" 7 ")
            .with_shortcode(" go ")]);

        let links = report.accepted(ValidityUnit::Days).unwrap();
        assert_eq!(links[0].validity, Validity::days(7));
        assert_eq!(links[0].preferred_code.as_deref(), Some("go"));
    }

    #[test]
    fn test_accepted_is_none_for_invalid_batch() {
        let report = check(&[CreationRequest::new("nope")]);
        assert!(report.accepted(ValidityUnit::Minutes).is_none());
    }

    #[test]
    fn test_report_serialization() {
        let report = check(&[
            CreationRequest::new("https://a.com"),
            CreationRequest::new("https://a.com"),
        ]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["all_valid"], false);
        assert!(json.get("batch_error").is_none());
        assert_eq!(json["items"][1]["errors"]["url"]["code"], "duplicate_url");
        assert_eq!(json["items"][1]["errors"]["url"]["message"], "Duplicate URL");
        assert_eq!(json["items"][0]["errors"], serde_json::json!({}));
    }

    #[test]
    fn test_batch_error_serializes_as_message() {
        let json = serde_json::to_value(BatchError::TooLarge { size: 6, max: 5 }).unwrap();
        assert_eq!(json, "Maximum 5 URLs at once.");
    }
}
