//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization; the single-link
//! request is additionally checked with `validator`.

pub mod events;
pub mod health;
pub mod link;
pub mod shorten;
