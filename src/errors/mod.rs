//! # Error Handling
//!
//! Every failure the controller can observe is one variant of [`Error`].
//! The API client raises, the controller classifies, and the adapter turns
//! whatever is left into a `FAILED` response.

pub mod types;

pub use types::{Error, Result};
