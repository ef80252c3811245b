//! The decision oracle contract.

use std::future::Future;

use thiserror::Error;

use crate::action::OracleReply;
use crate::context::DecisionContext;

/// Why a decision could not be obtained.  Every variant degrades the
/// affected citizen to `Idle` for the tick; none of them abort the tick.
#[derive(Clone, Debug, Error, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    #[error("oracle did not answer within {0} ms")]
    Timeout(u64),

    #[error("oracle failure: {0}")]
    Failure(String),

    #[error("malformed oracle reply: {0}")]
    Malformed(String),

    #[error("oracle call cancelled")]
    Cancelled,
}

pub type OracleResult<T> = Result<T, OracleError>;

/// External decision-making service.
///
/// The kernel treats the oracle as a pure function with latency and failure:
/// it gets a self-contained [`DecisionContext`] and answers with a reply that
/// is validated before anything changes.  The kernel wraps every call in its
/// own timeout and may drop the future at any `.await` point (cancellation),
/// so implementations must not rely on running to completion.
///
/// # Example
///
/// ```rust,ignore
/// struct AlwaysRest;
///
/// impl DecisionOracle for AlwaysRest {
///     async fn decide(&self, _ctx: DecisionContext) -> OracleResult<OracleReply> {
///         Ok(OracleReply::Rest { duration: 2 })
///     }
/// }
/// ```
pub trait DecisionOracle: Send + Sync + 'static {
    fn decide(&self, ctx: DecisionContext) -> impl Future<Output = OracleResult<OracleReply>> + Send;
}
