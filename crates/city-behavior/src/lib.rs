//! `city-behavior` — the per-citizen decision state machine.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                              |
//! |-------------|-----------------------------------------------------------------------|
//! | [`state`]   | `BehaviorState`, `DecisionTrigger`, `IdleReason`, `StateLabel`        |
//! | [`action`]  | `ActionKind`, `OracleReply`, `Action`, `RawDecision` (serde)          |
//! | [`context`] | `DecisionContext`, `CitizenView`, `NeighborView`, `ContextSources`    |
//! | [`oracle`]  | `DecisionOracle` trait, `OracleError`                                 |
//! | [`engine`]  | `BehaviorEngine`, `Resolution`, `Effect`, `Step`, `Situation`         |
//! | [`stubs`]   | `FixedOracle`, `ScriptedOracle`, `ScheduleFollowingOracle`            |
//! | [`error`]   | `BehaviorError`, `BehaviorResult<T>`                                  |
//!
//! # Design notes
//!
//! The tick loop in `city-sim` drives the engine in phases:
//!
//! 1. **Evaluate** (parallel, read-only): `BehaviorEngine::evaluate` per
//!    citizen.  Most citizens settle here without an oracle call.
//! 2. **Decide** (async fan-out): contexts are assembled for the citizens that
//!    entered `Deciding` and sent to the `DecisionOracle` with a deadline.
//! 3. **Resolve** (sequential): `BehaviorEngine::resolve` validates each reply
//!    and plans effects; the population manager commits them.
//!
//! The engine holds no per-citizen state; states live in an arena owned by
//! the population manager.

pub mod action;
pub mod context;
pub mod engine;
pub mod error;
pub mod oracle;
pub mod state;
pub mod stubs;

#[cfg(test)]
mod tests;

pub use action::{Action, ActionKind, OracleReply};
#[cfg(feature = "serde")]
pub use action::RawDecision;
pub use context::{CitizenView, ContextSources, DecisionContext, NeighborView};
pub use engine::{BehaviorEngine, Decision, Effect, Movement, Resolution, Situation, Step};
pub use error::{BehaviorError, BehaviorResult};
pub use oracle::{DecisionOracle, OracleError, OracleResult};
pub use state::{BehaviorState, DecisionTrigger, IdleReason, StateLabel};
pub use stubs::{FixedOracle, ScheduleFollowingOracle, ScriptedOracle};
