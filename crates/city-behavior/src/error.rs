use city_memory::MemoryError;
use city_social::SocialError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BehaviorError {
    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    Social(#[from] SocialError),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
