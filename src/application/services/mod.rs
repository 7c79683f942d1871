//! Business logic services for the application layer.

pub mod batch_validator;
pub mod link_registry;

pub use batch_validator::{
    BatchError, BatchReport, BatchValidator, CreationRequest, FieldError, FieldErrors,
    ValidatedItem,
};
pub use link_registry::{BatchItemResult, BatchOutcome, ExpiryPolicy, LinkRegistry};
