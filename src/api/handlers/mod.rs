//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod events;
pub mod health;
pub mod links;
pub mod redirect;
pub mod shorten;

pub use events::events_handler;
pub use health::health_handler;
pub use links::{get_link_handler, list_links_handler, record_access_handler};
pub use redirect::redirect_handler;
pub use shorten::{shorten_handler, shorten_single_handler, validate_handler};
