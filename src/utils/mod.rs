//! Utility building blocks shared by the registry and its surfaces.
//!
//! - [`code_generator`] - Short identifier generation and shortcode rules
//! - [`clock`] - Injectable time source

pub mod clock;
pub mod code_generator;
