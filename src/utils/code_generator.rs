//! Short identifier generation and preferred-shortcode rules.
//!
//! Identifiers are fixed-length strings drawn uniformly from a configurable
//! alphabet (base-36 by default). Randomness comes from a [`RandomSource`] so
//! collision and exhaustion behaviour can be driven deterministically.

use crate::error::AppError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

/// Default identifier length.
pub const DEFAULT_CODE_LENGTH: usize = 5;

/// Default alphabet: digits followed by lowercase ASCII letters.
pub const DEFAULT_ALPHABET: &str = "0123456789abcdefghijklmnopqrstuvwxyz";

/// Default number of candidates drawn before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Upper bound on the length of a caller-supplied shortcode.
pub const MAX_PREFERRED_CODE_LENGTH: usize = 10;

/// Codes that would shadow HTTP routes and can never be registered.
pub const RESERVED_CODES: &[&str] = &["api", "health"];

/// Source of uniformly distributed indices.
#[cfg_attr(test, mockall::automock)]
pub trait RandomSource: Send {
    /// Returns an index in `0..bound`. `bound` is always non-zero.
    fn next_index(&mut self, bound: usize) -> usize;
}

impl RandomSource for StdRng {
    fn next_index(&mut self, bound: usize) -> usize {
        self.random_range(0..bound)
    }
}

/// Draws collision-free short identifiers.
pub struct CodeGenerator {
    alphabet: Vec<char>,
    length: usize,
    max_attempts: usize,
    source: Box<dyn RandomSource>,
}

impl CodeGenerator {
    /// Creates a generator with the default alphabet, length and attempt cap.
    pub fn new(source: Box<dyn RandomSource>) -> Self {
        Self {
            alphabet: DEFAULT_ALPHABET.chars().collect(),
            length: DEFAULT_CODE_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            source,
        }
    }

    /// Generator seeded from operating-system entropy.
    pub fn from_entropy() -> Self {
        Self::new(Box::new(StdRng::from_os_rng()))
    }

    /// Deterministic generator, for tests and reproducible demos.
    pub fn seeded(seed: u64) -> Self {
        Self::new(Box::new(StdRng::seed_from_u64(seed)))
    }

    pub fn with_alphabet(mut self, alphabet: &str) -> Self {
        self.alphabet = alphabet.chars().collect();
        self
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of distinct identifiers this generator can produce.
    ///
    /// Saturates at `u128::MAX` for very large spaces.
    pub fn capacity(&self) -> u128 {
        (self.alphabet.len() as u128)
            .checked_pow(self.length as u32)
            .unwrap_or(u128::MAX)
    }

    /// Draws one candidate, without any uniqueness check.
    fn candidate(&mut self) -> String {
        let bound = self.alphabet.len();
        (0..self.length)
            .map(|_| self.alphabet[self.source.next_index(bound)])
            .collect()
    }

    /// Returns a fresh identifier for which `is_taken` is false.
    ///
    /// Reserved route segments are always treated as taken. The predicate
    /// must reflect the key set at the moment of insertion, so callers hold
    /// the registry lock across generation and insert.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Exhausted`] once `max_attempts` candidates have
    /// all collided.
    pub fn generate(&mut self, is_taken: impl Fn(&str) -> bool) -> Result<String, AppError> {
        if self.alphabet.is_empty() || self.length == 0 {
            return Err(AppError::internal(
                "Identifier generator is misconfigured",
                json!({ "alphabet_len": self.alphabet.len(), "length": self.length }),
            ));
        }

        for attempt in 1..=self.max_attempts {
            let code = self.candidate();

            if !is_reserved(&code) && !is_taken(&code) {
                return Ok(code);
            }

            tracing::debug!(attempt, code = %code, "Short identifier collision, retrying");
        }

        Err(AppError::exhausted(
            "Failed to generate a unique short identifier",
            json!({
                "attempts": self.max_attempts,
                "capacity": self.capacity().to_string(),
            }),
        ))
    }
}

impl std::fmt::Debug for CodeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeGenerator")
            .field("alphabet", &self.alphabet.iter().collect::<String>())
            .field("length", &self.length)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

pub fn is_reserved(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}

/// Validates the format of a caller-supplied shortcode.
///
/// # Rules
///
/// - Length: 1-10 characters
/// - Allowed characters: ASCII letters, digits, `-` and `_`
/// - Cannot be a reserved route segment
///
/// Uniqueness is not checked here; see
/// [`crate::application::services::BatchValidator`] and
/// [`crate::application::services::LinkRegistry`].
pub fn validate_preferred_code(code: &str) -> Result<(), &'static str> {
    if code.is_empty() || code.chars().count() > MAX_PREFERRED_CODE_LENGTH {
        return Err("Shortcode must be 1-10 characters");
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err("Shortcode can only contain letters, digits, '-' and '_'");
    }

    if is_reserved(code) {
        return Err("This shortcode is reserved");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Source that replays a fixed sequence of indices, cycling when exhausted.
    fn scripted(indices: Vec<usize>) -> MockRandomSource {
        let mut source = MockRandomSource::new();
        let mut position = 0;
        source.expect_next_index().returning(move |bound| {
            let index = indices[position % indices.len()] % bound;
            position += 1;
            index
        });
        source
    }

    #[test]
    fn test_generate_code_has_default_length_and_alphabet() {
        let mut generator = CodeGenerator::seeded(7);
        let code = generator.generate(|_| false).unwrap();

        assert_eq!(code.len(), DEFAULT_CODE_LENGTH);
        assert!(code.chars().all(|c| DEFAULT_ALPHABET.contains(c)));
    }

    #[test]
    fn test_seeded_generators_are_reproducible() {
        let mut first = CodeGenerator::seeded(42);
        let mut second = CodeGenerator::seeded(42);

        for _ in 0..20 {
            assert_eq!(
                first.generate(|_| false).unwrap(),
                second.generate(|_| false).unwrap()
            );
        }
    }

    #[test]
    fn test_generate_skips_taken_candidates() {
        // "aaaaa" is drawn first and taken, "bbbbb" second.
        let mut generator = CodeGenerator::new(Box::new(scripted(vec![
            10, 10, 10, 10, 10, 11, 11, 11, 11, 11,
        ])))
        .with_max_attempts(3);

        let code = generator.generate(|c| c == "aaaaa").unwrap();
        assert_eq!(code, "bbbbb");
    }

    #[test]
    fn test_generate_gives_up_after_max_attempts() {
        let mut generator =
            CodeGenerator::new(Box::new(scripted(vec![0]))).with_max_attempts(4);

        let err = generator.generate(|c| c == "00000").unwrap_err();
        assert!(matches!(err, AppError::Exhausted { .. }));
        assert_eq!(err.details()["attempts"], 4);
    }

    #[test]
    fn test_generate_exhausts_tiny_space() {
        let mut generator = CodeGenerator::seeded(1)
            .with_alphabet("ab")
            .with_length(1)
            .with_max_attempts(50);
        let taken: HashSet<String> = ["a".to_string(), "b".to_string()].into();

        let result = generator.generate(|c| taken.contains(c));
        assert!(matches!(result, Err(AppError::Exhausted { .. })));
    }

    #[test]
    fn test_generate_never_returns_reserved_code() {
        let mut generator = CodeGenerator::new(Box::new(scripted(vec![
            // "api" in the default alphabet, then "abc"
            10, 25, 18, 10, 11, 12,
        ])))
        .with_length(3);

        assert_eq!(generator.generate(|_| false).unwrap(), "abc");
    }

    #[test]
    fn test_generate_rejects_empty_alphabet() {
        let mut generator = CodeGenerator::seeded(1).with_alphabet("");
        assert!(matches!(
            generator.generate(|_| false),
            Err(AppError::Internal { .. })
        ));
    }

    #[test]
    fn test_generate_produces_distinct_codes_against_growing_set() {
        let mut generator = CodeGenerator::seeded(99);
        let mut seen = HashSet::new();

        for _ in 0..500 {
            let code = generator.generate(|c| seen.contains(c)).unwrap();
            assert!(seen.insert(code));
        }
    }

    #[test]
    fn test_capacity() {
        assert_eq!(CodeGenerator::seeded(0).capacity(), 36u128.pow(5));
        assert_eq!(
            CodeGenerator::seeded(0)
                .with_alphabet("ab")
                .with_length(3)
                .capacity(),
            8
        );
    }

    #[test]
    fn test_validate_preferred_code_accepts_allowed_characters() {
        assert!(validate_preferred_code("my-link_1").is_ok());
        assert!(validate_preferred_code("ABC").is_ok());
        assert!(validate_preferred_code("x").is_ok());
        assert!(validate_preferred_code("abcdefghij").is_ok());
    }

    #[test]
    fn test_validate_preferred_code_rejects_bad_input() {
        assert!(validate_preferred_code("").is_err());
        assert!(validate_preferred_code("abcdefghijk").is_err());
        assert!(validate_preferred_code("my code").is_err());
        assert!(validate_preferred_code("promo@1").is_err());
        assert!(validate_preferred_code("café").is_err());
    }

    #[test]
    fn test_validate_preferred_code_rejects_reserved() {
        for &reserved in RESERVED_CODES {
            assert_eq!(
                validate_preferred_code(reserved),
                Err("This shortcode is reserved"),
                "Reserved code '{}' should be invalid",
                reserved
            );
        }
    }
}
