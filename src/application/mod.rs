//! Application layer services implementing the registry rules.
//!
//! Services coordinate identifier generation, validation and event recording
//! and expose a clean API for the HTTP handlers and the CLI.
//!
//! # Available Services
//!
//! - [`services::link_registry::LinkRegistry`] - Link creation, resolution and access accounting
//! - [`services::batch_validator::BatchValidator`] - Whole-batch validation of creation requests

pub mod services;
