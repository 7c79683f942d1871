//! Link registry: the source of truth for short links.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::application::services::batch_validator::{
    BatchReport, BatchValidator, CreationRequest, FieldError, check_url,
};
use crate::config::Config;
use crate::domain::entities::{DomainEvent, EventKind, Link, NewLink, Validity, ValidityUnit};
use crate::domain::event_log::{EventRecorder, EventSink};
use crate::error::AppError;
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::code_generator::{CodeGenerator, validate_preferred_code};

/// Whether `resolve` honours `expires_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryPolicy {
    /// Expiry is stored and reported but never blocks resolution.
    #[default]
    Advisory,
    /// Resolving a link at or past its expiry fails with [`AppError::Gone`].
    Enforced,
}

/// Result of one item in a processed batch.
#[derive(Debug)]
pub struct BatchItemResult {
    pub request: CreationRequest,
    pub result: Result<Link, AppError>,
}

/// Outcome of [`LinkRegistry::create_batch`].
#[derive(Debug)]
pub enum BatchOutcome {
    /// Validation failed; nothing was registered.
    Rejected(BatchReport),
    /// Every item was attempted, in order.
    Processed(Vec<BatchItemResult>),
}

struct RegistryState {
    links: Vec<Link>,
    index: HashMap<String, usize>,
    generator: CodeGenerator,
}

impl RegistryState {
    fn get(&self, short_id: &str) -> Option<&Link> {
        self.index.get(short_id).map(|&i| &self.links[i])
    }

    fn get_mut(&mut self, short_id: &str) -> Option<&mut Link> {
        self.index.get(short_id).map(|&i| &mut self.links[i])
    }
}

/// Maps short identifiers to link records.
///
/// All mutations run under one lock, so identifier uniqueness is checked
/// against the key set at the moment of insertion and access counts are
/// incremented atomically. Events are recorded while the lock is held, which
/// keeps the event order identical to the mutation order.
pub struct LinkRegistry {
    state: Mutex<RegistryState>,
    events: EventRecorder,
    validator: BatchValidator,
    clock: Arc<dyn Clock>,
    default_validity: Validity,
    expiry_policy: ExpiryPolicy,
}

impl LinkRegistry {
    /// Creates an empty registry with the default settings.
    pub fn new(generator: CodeGenerator, events: EventRecorder) -> Self {
        Self {
            state: Mutex::new(RegistryState {
                links: Vec::new(),
                index: HashMap::new(),
                generator,
            }),
            events,
            validator: BatchValidator::default(),
            clock: Arc::new(SystemClock),
            default_validity: Validity::default(),
            expiry_policy: ExpiryPolicy::default(),
        }
    }

    /// Builds a registry from service configuration.
    pub fn from_config(config: &Config, generator: CodeGenerator, sink: Arc<dyn EventSink>) -> Self {
        let events = EventRecorder::new(config.event_retention).with_sink(sink);
        let expiry_policy = if config.enforce_expiry {
            ExpiryPolicy::Enforced
        } else {
            ExpiryPolicy::Advisory
        };

        let mut registry = Self::new(generator, events)
            .with_max_batch_size(config.max_batch_size)
            .with_expiry_policy(expiry_policy);
        if let Some(validity) = Validity::minutes(config.default_validity_minutes) {
            registry = registry.with_default_validity(validity);
        }
        registry
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_default_validity(mut self, validity: Validity) -> Self {
        self.default_validity = validity;
        self
    }

    pub fn with_expiry_policy(mut self, policy: ExpiryPolicy) -> Self {
        self.expiry_policy = policy;
        self
    }

    pub fn with_max_batch_size(mut self, max_size: usize) -> Self {
        self.validator = BatchValidator::new(max_size);
        self
    }

    pub fn expiry_policy(&self) -> ExpiryPolicy {
        self.expiry_policy
    }

    pub fn default_validity(&self) -> Validity {
        self.default_validity
    }

    pub fn max_batch_size(&self) -> usize {
        self.validator.max_size()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new link.
    ///
    /// The identifier is the preferred code if one is given, otherwise a
    /// freshly generated one. `expires_at` is `now + validity`, falling back
    /// to the default validity.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the URL or preferred code is malformed,
    ///   or the validity overflows the timestamp range
    /// - [`AppError::Conflict`] if the preferred code is already registered
    /// - [`AppError::Exhausted`] if no free identifier was found
    pub fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        if let Err(e) = check_url(&new_link.url) {
            return Err(AppError::bad_request(
                e.to_string(),
                json!({ "url": new_link.url }),
            ));
        }
        if let Some(code) = &new_link.preferred_code {
            validate_preferred_code(code)
                .map_err(|reason| AppError::bad_request(reason, json!({ "shortcode": code })))?;
        }

        let validity = new_link.validity.unwrap_or(self.default_validity);

        let mut state = self.lock();
        let created_at = self.clock.now();
        let expires_at = validity
            .to_duration()
            .and_then(|d| created_at.checked_add_signed(d))
            .ok_or_else(|| {
                AppError::bad_request(
                    FieldError::ValidityOutOfRange.to_string(),
                    json!({ "validity": validity.amount(), "unit": validity.unit() }),
                )
            })?;

        let short_id = match new_link.preferred_code {
            Some(code) => {
                if state.index.contains_key(&code) {
                    return Err(AppError::conflict(
                        "Shortcode already in use",
                        json!({ "shortcode": code }),
                    ));
                }
                code
            }
            None => {
                let RegistryState {
                    index, generator, ..
                } = &mut *state;
                generator.generate(|candidate| index.contains_key(candidate))?
            }
        };

        let link = Link::new(short_id.clone(), new_link.url, created_at, expires_at);
        let position = state.links.len();
        state.links.push(link.clone());
        state.index.insert(short_id, position);

        self.events.record(
            EventKind::Create,
            "Created shortlink",
            json!({
                "url": link.target_url,
                "short_id": link.short_id,
                "expires_at": link.expires_at,
            }),
            created_at,
        );
        drop(state);

        tracing::info!(
            short_id = %link.short_id,
            url = %link.target_url,
            expires_at = %link.expires_at,
            "Short link created"
        );

        Ok(link)
    }

    /// Looks up a link without touching its access count.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if no link has this identifier
    /// - [`AppError::Gone`] if the link is expired and expiry is enforced
    pub fn resolve(&self, short_id: &str) -> Result<Link, AppError> {
        let state = self.lock();
        let link = state.get(short_id).ok_or_else(|| not_found(short_id))?;

        if self.expiry_policy == ExpiryPolicy::Enforced && link.is_expired_at(self.clock.now()) {
            return Err(AppError::gone(
                "Short link has expired",
                json!({ "short_id": short_id, "expires_at": link.expires_at }),
            ));
        }

        Ok(link.clone())
    }

    /// Increments the access count of a link by one.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this identifier; the
    /// registry and event log are left untouched.
    pub fn record_access(&self, short_id: &str) -> Result<Link, AppError> {
        let mut state = self.lock();
        let now = self.clock.now();
        let link = state.get_mut(short_id).ok_or_else(|| not_found(short_id))?;

        link.access_count += 1;
        let updated = link.clone();

        self.events.record(
            EventKind::Access,
            "Accessed shortlink",
            json!({ "short_id": short_id }),
            now,
        );
        drop(state);

        tracing::debug!(short_id, access_count = updated.access_count, "Short link accessed");

        Ok(updated)
    }

    /// Snapshot of all links in creation order.
    pub fn list(&self) -> Vec<Link> {
        self.lock().links.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the event log, oldest first.
    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.all()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Validates a batch without registering anything.
    pub fn validate(&self, batch: &[CreationRequest], unit: ValidityUnit) -> BatchReport {
        self.validator.validate(batch, unit, self.clock.now())
    }

    /// Validates a batch and, if it is valid, registers each item in order.
    ///
    /// Validity amounts are read in `unit`. A registry error on one item
    /// (such as a preferred code that is already taken) is reported for that
    /// item and does not stop the others.
    pub fn create_batch(&self, batch: &[CreationRequest], unit: ValidityUnit) -> BatchOutcome {
        let report = self.validate(batch, unit);

        let Some(new_links) = report.accepted(unit) else {
            tracing::debug!(
                total = batch.len(),
                invalid = report.invalid_items(),
                "Batch rejected by validation"
            );
            return BatchOutcome::Rejected(report);
        };

        let results: Vec<BatchItemResult> = batch
            .iter()
            .zip(new_links)
            .map(|(request, new_link)| BatchItemResult {
                request: request.clone(),
                result: self.create(new_link),
            })
            .collect();

        let failed = results.iter().filter(|r| r.result.is_err()).count();
        tracing::info!(
            total = results.len(),
            created = results.len() - failed,
            failed,
            "Batch processed"
        );

        BatchOutcome::Processed(results)
    }
}

impl std::fmt::Debug for LinkRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkRegistry")
            .field("links", &self.len())
            .field("events", &self.events)
            .field("default_validity", &self.default_validity)
            .field("expiry_policy", &self.expiry_policy)
            .finish_non_exhaustive()
    }
}

fn not_found(short_id: &str) -> AppError {
    AppError::not_found("Short link not found", json!({ "short_id": short_id }))
}
