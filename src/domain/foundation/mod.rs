//! Foundation module - Shared domain primitives.
//!
//! Contains value objects and error types that form the vocabulary of the
//! trade approvals domain.

mod errors;
mod store_path;
mod timestamp;

pub use errors::{ErrorCode, ValidationError};
pub use store_path::StorePath;
pub use timestamp::Timestamp;
