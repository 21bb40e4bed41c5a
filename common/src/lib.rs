//! Common types and utilities for the CMS aggregate
//!
//! Shared error handling, decimal aliases and the domain model used by the
//! loan account service and its collaborators.

pub mod error;
pub mod model;
pub mod decimal;

/// Re-export important types
pub use error::{CmsStatusCode, Error, Result, ErrorExt};
pub use decimal::*;
