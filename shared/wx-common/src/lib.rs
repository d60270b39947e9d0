//! Message Gateway Common Library
//!
//! Account contexts plus the typed request and reply messages exchanged
//! between the platform and application handlers.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
