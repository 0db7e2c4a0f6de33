//! Validation of the console forms and the crate's error types.

pub mod document;
pub mod error;
pub mod rules;

pub use document::validate_document;
pub use error::*;
pub use rules::*;
