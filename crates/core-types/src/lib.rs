//! # Core Types
//!
//! The shared vocabulary of the service: the persisted `Record`, the request
//! schema used to create or patch one, and the validation aggregate produced
//! when a request body does not match that schema.
//!
//! As the bottom layer it depends on no other workspace crate.

pub mod enums;
pub mod error;
pub mod structs;
pub mod validation;

// Re-export the core types to provide a clean public API.
pub use enums::RandomPolicy;
pub use error::CoreError;
pub use structs::{NewRecord, Project, Record, RecordRequest};
pub use validation::{FieldError, Schema, ValidationErrors};
