//! Navigation error type.

use thiserror::Error;

use city_core::{CitizenId, Position};

/// Errors produced by a [`Navigator`](crate::Navigator).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavError {
    #[error("{citizen} cannot reach {target}")]
    Unreachable { citizen: CitizenId, target: Position },

    #[error("no route from {from} to {to}")]
    NoRoute { from: Position, to: Position },
}

pub type NavResult<T> = Result<T, NavError>;
