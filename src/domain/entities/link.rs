//! Link entity representing a registered short identifier.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default validity of a link: 30 days.
pub const DEFAULT_VALIDITY_MINUTES: i64 = 30 * 24 * 60;

/// A registered short link.
///
/// `short_id`, `target_url`, `created_at` and `expires_at` never change after
/// creation. `access_count` only grows, one step per recorded access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub short_id: String,
    pub target_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub access_count: u64,
}

impl Link {
    /// Creates a fresh link with no recorded accesses.
    pub fn new(
        short_id: String,
        target_url: String,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            short_id,
            target_url,
            created_at,
            expires_at,
            access_count: 0,
        }
    }

    /// Returns true if `now` is at or past the expiry time.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Span between creation and expiry.
    pub fn validity(&self) -> TimeDelta {
        self.expires_at - self.created_at
    }
}

/// Unit in which a caller expresses a validity period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidityUnit {
    #[default]
    Minutes,
    Days,
}

impl ValidityUnit {
    fn minutes_per_unit(self) -> i64 {
        match self {
            ValidityUnit::Minutes => 1,
            ValidityUnit::Days => 24 * 60,
        }
    }
}

impl fmt::Display for ValidityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidityUnit::Minutes => f.write_str("minutes"),
            ValidityUnit::Days => f.write_str("days"),
        }
    }
}

/// A positive validity period in a given unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validity {
    amount: i64,
    unit: ValidityUnit,
}

impl Validity {
    /// Returns `None` unless `amount` is strictly positive.
    pub fn new(amount: i64, unit: ValidityUnit) -> Option<Self> {
        (amount > 0).then_some(Self { amount, unit })
    }

    pub fn minutes(amount: i64) -> Option<Self> {
        Self::new(amount, ValidityUnit::Minutes)
    }

    pub fn days(amount: i64) -> Option<Self> {
        Self::new(amount, ValidityUnit::Days)
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn unit(&self) -> ValidityUnit {
        self.unit
    }

    /// Converts to a duration, or `None` if it does not fit.
    pub fn to_duration(self) -> Option<TimeDelta> {
        self.amount
            .checked_mul(self.unit.minutes_per_unit())
            .and_then(TimeDelta::try_minutes)
    }
}

impl Default for Validity {
    /// 30 days, expressed in minutes.
    fn default() -> Self {
        Self {
            amount: DEFAULT_VALIDITY_MINUTES,
            unit: ValidityUnit::Minutes,
        }
    }
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.unit)
    }
}

/// Input for registering one link.
///
/// `validity: None` means the registry default; `preferred_code: None` means
/// a generated identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub url: String,
    pub validity: Option<Validity>,
    pub preferred_code: Option<String>,
}

impl NewLink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            validity: None,
            preferred_code: None,
        }
    }

    pub fn with_validity(mut self, validity: Validity) -> Self {
        self.validity = Some(validity);
        self
    }

    pub fn with_preferred_code(mut self, code: impl Into<String>) -> Self {
        self.preferred_code = Some(code.into());
        self
    }
}
