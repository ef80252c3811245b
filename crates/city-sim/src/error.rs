use city_behavior::BehaviorError;
use city_core::{CitizenId, CoreError};
use city_memory::MemoryError;
use city_social::SocialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("citizen id {0} is already registered")]
    DuplicateCitizen(CitizenId),

    #[error("citizen {0} not found")]
    CitizenNotFound(CitizenId),

    #[error("citizen id {0} cannot be registered")]
    InvalidCitizenId(CitizenId),

    #[error("memory store error: {0}")]
    Memory(#[from] MemoryError),

    #[error("social graph error: {0}")]
    Social(#[from] SocialError),

    #[error("behavior error: {0}")]
    Behavior(#[from] BehaviorError),

    #[error("oracle runtime error: {0}")]
    Runtime(String),
}

impl From<CoreError> for SimError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::CitizenNotFound(id)  => SimError::CitizenNotFound(id),
            CoreError::DuplicateCitizen(id) => SimError::DuplicateCitizen(id),
            CoreError::InvalidCitizenId(id) => SimError::InvalidCitizenId(id),
            CoreError::Config(msg)          => SimError::Config(msg),
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
