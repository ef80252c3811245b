//! Per-tick counters and per-citizen output rows.

use city_behavior::{ActionKind, OracleError, StateLabel};
use city_citizen::{CitizenStatus, Profession};
use city_core::{CitizenId, HouseholdId, Phase, Position, Tick};
use city_schedule::Activity;

// ── TickSummary ───────────────────────────────────────────────────────────────

/// What happened during one `Sim::step`.
///
/// Delivered to [`SimObserver::on_tick_end`](crate::SimObserver::on_tick_end)
/// and returned by `step`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickSummary {
    pub tick:                Tick,
    pub day:                 u64,
    pub phase:               Phase,
    /// Active citizens when the tick started.
    pub active:              u32,
    /// Citizens that went through reconciliation.  Equals `active`.
    pub processed:           u32,
    /// Actions started this tick, indexed by `ActionKind::index`.
    pub actions:             [u32; 6],
    /// Oracle calls issued.
    pub decisions:           u32,
    /// Calls that produced no usable reply, malformed replies included.
    pub oracle_failures:     u32,
    pub oracle_timeouts:     u32,
    /// The malformed share of `oracle_failures`.
    pub malformed:           u32,
    pub cancellations:       u32,
    pub navigation_failures: u32,
    /// Effects dropped because a participant was unknown or inactive.
    pub effect_rejections:   u32,
    /// Active citizens in `Idle` after reconciliation.
    pub idle:                u32,
    pub memories_written:    u32,
    pub memories_evicted:    u32,
    pub interactions:        u32,
}

impl TickSummary {
    pub(crate) fn new(tick: Tick, day: u64, phase: Phase, active: usize) -> Self {
        Self {
            tick,
            day,
            phase,
            active:              active as u32,
            processed:           0,
            actions:             [0; 6],
            decisions:           0,
            oracle_failures:     0,
            oracle_timeouts:     0,
            malformed:           0,
            cancellations:       0,
            navigation_failures: 0,
            effect_rejections:   0,
            idle:                0,
            memories_written:    0,
            memories_evicted:    0,
            interactions:        0,
        }
    }

    #[inline]
    pub fn actions(&self, kind: ActionKind) -> u32 {
        self.actions[kind.index()]
    }

    pub fn actions_started(&self) -> u32 {
        self.actions.iter().sum()
    }

    /// Every call that left its citizen `Idle`.
    pub fn oracle_errors(&self) -> u32 {
        self.oracle_failures + self.oracle_timeouts + self.cancellations
    }

    pub(crate) fn count_error(&mut self, err: &OracleError) {
        match err {
            OracleError::Timeout(_)   => self.oracle_timeouts += 1,
            OracleError::Failure(_)   => self.oracle_failures += 1,
            OracleError::Malformed(_) => {
                self.malformed += 1;
                self.oracle_failures += 1;
            }
            OracleError::Cancelled    => self.cancellations += 1,
        }
    }
}

// ── CitizenRecord ─────────────────────────────────────────────────────────────

/// Flat per-citizen row handed to snapshot observers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CitizenRecord {
    pub tick:       Tick,
    pub id:         CitizenId,
    pub name:       String,
    pub status:     CitizenStatus,
    pub position:   Position,
    pub state:      StateLabel,
    /// Current action while `Acting`.
    pub action:     Option<ActionKind>,
    /// What the schedule intends at `tick`.
    pub activity:   Option<Activity>,
    pub household:  HouseholdId,
    pub profession: Profession,
}
