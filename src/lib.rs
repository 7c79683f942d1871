//! # Shortlink Registry
//!
//! An in-memory short-link registry with batch validation, access accounting
//! and an append-only event log, served over HTTP with Axum.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Entities and the event log
//! - **Application Layer** ([`application`]) - Link registry and batch validator
//! - **API Layer** ([`api`]) - REST handlers, DTOs and middleware
//! - **Utilities** ([`utils`]) - Identifier generation and the clock seam
//!
//! ## Features
//!
//! - Random fixed-length identifiers or caller-chosen shortcodes
//! - Whole-batch validation before anything is registered
//! - Exact access counting under concurrency
//! - `CREATE` / `ACCESS` audit events with configurable retention
//!
//! ## Quick Start
//!
//! ```bash
//! cargo run                      # HTTP service on 0.0.0.0:3000
//! cargo run --bin shortlink      # interactive terminal client
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        BatchOutcome, BatchValidator, CreationRequest, ExpiryPolicy, LinkRegistry,
    };
    pub use crate::domain::entities::{DomainEvent, EventKind, Link, NewLink, Validity, ValidityUnit};
    pub use crate::domain::event_log::{EventRecorder, EventRetention};
    pub use crate::error::AppError;
    pub use crate::state::AppState;
    pub use crate::utils::code_generator::CodeGenerator;
}
