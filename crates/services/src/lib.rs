//! # Services
//!
//! The layer between the HTTP routes / scheduled jobs and the repository.
//! Storage faults stop here: every operation logs what went wrong and hands
//! its caller a plain sentinel (`None` or `false`) instead of an error.

pub mod record;

pub use record::RecordService;
