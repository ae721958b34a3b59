//! # oolong-core
//!
//! Shared building blocks for Oolong: the common error type and the
//! dataset/year helpers every processor needs.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{extract_year, Year};
