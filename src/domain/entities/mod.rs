//! Core domain entities.
//!
//! # Entity Types
//!
//! - [`Link`] - A registered short link with expiry and access count
//! - [`DomainEvent`] - An immutable `CREATE` / `ACCESS` audit record
//!
//! `NewLink` is the creation input; [`Validity`] and [`ValidityUnit`] express
//! how long a new link stays current.

pub mod event;
pub mod link;

pub use event::{DomainEvent, EventKind};
pub use link::{DEFAULT_VALIDITY_MINUTES, Link, NewLink, Validity, ValidityUnit};
