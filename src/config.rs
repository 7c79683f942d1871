//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the registry
//! is built. Every variable is optional:
//!
//! ```bash
//! export LISTEN="0.0.0.0:3000"
//! export BASE_URL="https://s.example.com"
//! export DEFAULT_VALIDITY_MINUTES="43200"
//! export SHORT_ID_LENGTH="5"
//! export SHORT_ID_ALPHABET="0123456789abcdefghijklmnopqrstuvwxyz"
//! export MAX_GENERATION_ATTEMPTS="10"
//! export MAX_BATCH_SIZE="5"
//! export EVENT_RETENTION="10000"   # or "unbounded"
//! export ENFORCE_EXPIRY="false"
//! ```
//!
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::env;
use std::num::NonZeroUsize;

use crate::application::services::batch_validator::DEFAULT_MAX_BATCH_SIZE;
use crate::domain::entities::DEFAULT_VALIDITY_MINUTES;
use crate::domain::event_log::EventRetention;
use crate::utils::code_generator::{
    CodeGenerator, DEFAULT_ALPHABET, DEFAULT_CODE_LENGTH, DEFAULT_MAX_ATTEMPTS,
};

/// Default number of events kept in memory.
const DEFAULT_EVENT_RETENTION: usize = 10_000;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    /// Public origin used to build short URLs, without trailing slash.
    pub base_url: String,
    pub log_level: String,
    pub log_format: String,
    /// Validity applied when a request does not specify one.
    pub default_validity_minutes: i64,
    pub short_id_length: usize,
    pub short_id_alphabet: String,
    /// Candidates drawn per generated identifier before giving up.
    pub max_generation_attempts: usize,
    pub max_batch_size: usize,
    pub event_retention: EventRetention,
    /// When true, resolving an expired link fails with 410 Gone.
    pub enforce_expiry: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            base_url: "http://localhost:3000".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            default_validity_minutes: DEFAULT_VALIDITY_MINUTES,
            short_id_length: DEFAULT_CODE_LENGTH,
            short_id_alphabet: DEFAULT_ALPHABET.to_string(),
            max_generation_attempts: DEFAULT_MAX_ATTEMPTS,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            event_retention: EventRetention::MaxEntries(
                NonZeroUsize::new(DEFAULT_EVENT_RETENTION).unwrap_or(NonZeroUsize::MIN),
            ),
            enforce_expiry: false,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Unparseable numeric values fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `EVENT_RETENTION` is neither a positive integer
    /// nor `unbounded`.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let listen_addr = env::var("LISTEN").unwrap_or(defaults.listen_addr);
        let base_url = env::var("BASE_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);
        let log_level = env::var("RUST_LOG").unwrap_or(defaults.log_level);
        let log_format = env::var("LOG_FORMAT").unwrap_or(defaults.log_format);

        let default_validity_minutes = parse_env("DEFAULT_VALIDITY_MINUTES")
            .unwrap_or(defaults.default_validity_minutes);
        let short_id_length = parse_env("SHORT_ID_LENGTH").unwrap_or(defaults.short_id_length);
        let short_id_alphabet =
            env::var("SHORT_ID_ALPHABET").unwrap_or(defaults.short_id_alphabet);
        let max_generation_attempts =
            parse_env("MAX_GENERATION_ATTEMPTS").unwrap_or(defaults.max_generation_attempts);
        let max_batch_size = parse_env("MAX_BATCH_SIZE").unwrap_or(defaults.max_batch_size);

        let event_retention = match env::var("EVENT_RETENTION") {
            Ok(raw) => parse_retention(&raw)
                .with_context(|| format!("Invalid EVENT_RETENTION value '{}'", raw))?,
            Err(_) => defaults.event_retention,
        };

        let enforce_expiry = env::var("ENFORCE_EXPIRY")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        Ok(Self {
            listen_addr,
            base_url,
            log_level,
            log_format,
            default_validity_minutes,
            short_id_length,
            short_id_alphabet,
            max_generation_attempts,
            max_batch_size,
            event_retention,
            enforce_expiry,
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is outside its allowed range.
    pub fn validate(&self) -> Result<()> {
        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            anyhow::bail!(
                "BASE_URL must start with 'http://' or 'https://', got '{}'",
                self.base_url
            );
        }

        if self.default_validity_minutes <= 0 {
            anyhow::bail!(
                "DEFAULT_VALIDITY_MINUTES must be greater than 0, got {}",
                self.default_validity_minutes
            );
        }

        if !(1..=32).contains(&self.short_id_length) {
            anyhow::bail!(
                "SHORT_ID_LENGTH must be between 1 and 32, got {}",
                self.short_id_length
            );
        }

        let unique: HashSet<char> = self.short_id_alphabet.chars().collect();
        if unique.len() < 2 || unique.len() != self.short_id_alphabet.chars().count() {
            anyhow::bail!("SHORT_ID_ALPHABET must contain at least 2 distinct characters");
        }
        if !self.short_id_alphabet.chars().all(|c| c.is_ascii_alphanumeric()) {
            anyhow::bail!("SHORT_ID_ALPHABET may only contain ASCII letters and digits");
        }

        if !(1..=10_000).contains(&self.max_generation_attempts) {
            anyhow::bail!(
                "MAX_GENERATION_ATTEMPTS must be between 1 and 10000, got {}",
                self.max_generation_attempts
            );
        }

        if !(1..=100).contains(&self.max_batch_size) {
            anyhow::bail!(
                "MAX_BATCH_SIZE must be between 1 and 100, got {}",
                self.max_batch_size
            );
        }

        Ok(())
    }

    /// Identifier generator seeded from OS entropy with the configured shape.
    pub fn code_generator(&self) -> CodeGenerator {
        self.shape_generator(CodeGenerator::from_entropy())
    }

    /// Deterministic identifier generator with the configured shape.
    pub fn seeded_code_generator(&self, seed: u64) -> CodeGenerator {
        self.shape_generator(CodeGenerator::seeded(seed))
    }

    fn shape_generator(&self, generator: CodeGenerator) -> CodeGenerator {
        generator
            .with_alphabet(&self.short_id_alphabet)
            .with_length(self.short_id_length)
            .with_max_attempts(self.max_generation_attempts)
    }

    /// Prints configuration summary.
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Base URL: {}", self.base_url);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
        tracing::info!("  Default validity: {} minutes", self.default_validity_minutes);
        tracing::info!(
            "  Short IDs: {} chars over {} symbols ({} attempts)",
            self.short_id_length,
            self.short_id_alphabet.chars().count(),
            self.max_generation_attempts
        );
        tracing::info!("  Max batch size: {}", self.max_batch_size);
        match self.event_retention {
            EventRetention::Unbounded => tracing::info!("  Event retention: unbounded"),
            EventRetention::MaxEntries(n) => tracing::info!("  Event retention: {} entries", n),
        }
        tracing::info!(
            "  Expiry: {}",
            if self.enforce_expiry { "enforced" } else { "advisory" }
        );
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Parses `unbounded` or a positive entry count.
fn parse_retention(raw: &str) -> Option<EventRetention> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("unbounded") {
        return Some(EventRetention::Unbounded);
    }
    raw.parse::<NonZeroUsize>()
        .ok()
        .map(EventRetention::MaxEntries)
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if a variable is malformed or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
