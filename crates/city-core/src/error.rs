//! Kernel-wide base error type.
//!
//! Component crates define their own error enums and wrap `CoreError` as one
//! variant where they need to surface configuration or registry problems.

use thiserror::Error;

use crate::CitizenId;

/// The top-level error type for `city-core` and a common base for sub-crates.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("citizen {0} not found")]
    CitizenNotFound(CitizenId),

    #[error("citizen id {0} is already registered")]
    DuplicateCitizen(CitizenId),

    #[error("citizen id {0} cannot be registered")]
    InvalidCitizenId(CitizenId),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `city-*` crates.
pub type CoreResult<T> = Result<T, CoreError>;
