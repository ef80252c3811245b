use city_core::{CitizenId, MemoryId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MemoryError {
    #[error("memory operation on unknown owner {0}")]
    InvalidOwner(CitizenId),

    #[error("memory {0} already exists")]
    DuplicateMemory(MemoryId),
}

pub type MemoryResult<T> = Result<T, MemoryError>;
