//! Domain layer containing business entities and the event log.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`event_log`] - Append-only audit history with retention and sinks
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on the HTTP or CLI surfaces
//! - Registry rules live in services (see [`crate::application::services`])

pub mod entities;
pub mod event_log;
