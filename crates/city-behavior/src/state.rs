//! Per-citizen behavior state.
//!
//! ```text
//!              boundary / interrupt              valid reply
//!  Scheduled ───────────────────────▶ Deciding ─────────────▶ Acting
//!      ▲                                 │                      │
//!      │  next boundary                  │ failure, timeout,    │ now >= until
//!      └──────────────── Idle ◀──────────┘ malformed, cancel    │
//!      └─────────────────────────────────────────────────────────┘
//! ```
//!
//! `Deciding` only exists while an oracle call is in flight inside one tick;
//! every citizen leaves the tick in one of the other three states.

use std::fmt;

use city_core::{CitizenId, Tick};
use city_schedule::Activity;

use crate::action::{Action, ActionKind};
use crate::OracleError;

// ── DecisionTrigger ───────────────────────────────────────────────────────────

/// Why a citizen started deciding.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecisionTrigger {
    /// The current schedule window ended or a new one began.
    ScheduleBoundary,
    /// Another active citizen is standing on the same tile.
    Proximity(CitizenId),
}

impl DecisionTrigger {
    pub fn as_str(self) -> &'static str {
        match self {
            DecisionTrigger::ScheduleBoundary => "schedule_boundary",
            DecisionTrigger::Proximity(_)     => "proximity",
        }
    }
}

// ── IdleReason ────────────────────────────────────────────────────────────────

/// Why a citizen fell back to `Idle`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IdleReason {
    OracleTimeout,
    OracleFailure,
    MalformedReply,
    Cancelled,
    /// The navigation port could not place or route the citizen.
    Unreachable,
    /// A memory or relationship write for the chosen action was rejected.
    EffectRejected,
}

impl IdleReason {
    pub fn as_str(self) -> &'static str {
        match self {
            IdleReason::OracleTimeout  => "oracle_timeout",
            IdleReason::OracleFailure  => "oracle_failure",
            IdleReason::MalformedReply => "malformed_reply",
            IdleReason::Cancelled      => "cancelled",
            IdleReason::Unreachable    => "unreachable",
            IdleReason::EffectRejected => "effect_rejected",
        }
    }
}

impl From<&OracleError> for IdleReason {
    fn from(err: &OracleError) -> Self {
        match err {
            OracleError::Timeout(_)   => IdleReason::OracleTimeout,
            OracleError::Failure(_)   => IdleReason::OracleFailure,
            OracleError::Malformed(_) => IdleReason::MalformedReply,
            OracleError::Cancelled    => IdleReason::Cancelled,
        }
    }
}

// ── BehaviorState ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BehaviorState {
    /// Following the schedule; `activity` is `None` during free time.
    Scheduled { activity: Option<Activity> },
    /// Waiting on the oracle.
    Deciding { since: Tick, trigger: DecisionTrigger },
    /// Carrying out a validated action until `until` (exclusive).
    Acting { action: Action, started: Tick, until: Tick },
    /// Fallback after a failed decision.
    Idle { since: Tick, reason: IdleReason },
}

impl Default for BehaviorState {
    fn default() -> Self {
        BehaviorState::Scheduled { activity: None }
    }
}

impl BehaviorState {
    pub fn label(&self) -> StateLabel {
        match self {
            BehaviorState::Scheduled { .. } => StateLabel::Scheduled,
            BehaviorState::Deciding { .. }  => StateLabel::Deciding,
            BehaviorState::Acting { .. }    => StateLabel::Acting,
            BehaviorState::Idle { .. }      => StateLabel::Idle,
        }
    }

    #[inline]
    pub fn is_deciding(&self) -> bool {
        matches!(self, BehaviorState::Deciding { .. })
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, BehaviorState::Idle { .. })
    }

    /// Kind of the action in progress, if acting.
    pub fn action_kind(&self) -> Option<ActionKind> {
        match self {
            BehaviorState::Acting { action, .. } => Some(action.kind()),
            _ => None,
        }
    }
}

impl fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BehaviorState::Scheduled { activity: Some(a) } => write!(f, "scheduled({a})"),
            BehaviorState::Scheduled { activity: None }    => f.write_str("scheduled(free)"),
            BehaviorState::Deciding { trigger, .. }        => write!(f, "deciding({})", trigger.as_str()),
            BehaviorState::Acting { action, until, .. }    => write!(f, "acting({} until {until})", action.kind()),
            BehaviorState::Idle { reason, .. }             => write!(f, "idle({})", reason.as_str()),
        }
    }
}

/// Payload-free state tag, for counting and reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateLabel {
    Scheduled,
    Deciding,
    Acting,
    Idle,
}

impl StateLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            StateLabel::Scheduled => "scheduled",
            StateLabel::Deciding  => "deciding",
            StateLabel::Acting    => "acting",
            StateLabel::Idle      => "idle",
        }
    }
}
