use city_core::CitizenId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SocialError {
    #[error("citizen {0} cannot interact with itself")]
    SelfInteraction(CitizenId),

    #[error("social graph operation on unknown citizen {0}")]
    InvalidOwner(CitizenId),
}

pub type SocialResult<T> = Result<T, SocialError>;
