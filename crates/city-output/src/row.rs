//! Flat rows written by output backends.

use city_behavior::ActionKind;
use city_citizen::CitizenStatus;
use city_sim::{CitizenRecord, TickSummary};

/// One citizen at a snapshot tick.  Optional fields are empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitizenSnapshotRow {
    pub citizen_id: u32,
    pub tick:       u64,
    pub name:       String,
    pub status:     &'static str,
    pub x:          i32,
    pub y:          i32,
    pub state:      &'static str,
    pub action:     &'static str,
    pub activity:   &'static str,
    /// `u32::MAX` for citizens without a household.
    pub household:  u32,
    pub profession: &'static str,
}

impl From<&CitizenRecord> for CitizenSnapshotRow {
    fn from(r: &CitizenRecord) -> Self {
        Self {
            citizen_id: r.id.0,
            tick:       r.tick.0,
            name:       r.name.clone(),
            status:     match r.status {
                CitizenStatus::Active   => "active",
                CitizenStatus::Inactive => "inactive",
            },
            x:          r.position.x,
            y:          r.position.y,
            state:      r.state.as_str(),
            action:     r.action.map_or("", ActionKind::as_str),
            activity:   r.activity.map_or("", |a| a.as_str()),
            household:  r.household.0,
            profession: r.profession.as_str(),
        }
    }
}

/// Counters for one tick.  `actions` follows `ActionKind::ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:                u64,
    pub day:                 u64,
    pub phase:               &'static str,
    pub active:              u32,
    pub processed:           u32,
    pub decisions:           u32,
    pub actions:             [u32; 6],
    pub oracle_failures:     u32,
    pub oracle_timeouts:     u32,
    pub malformed:           u32,
    pub cancellations:       u32,
    pub navigation_failures: u32,
    pub effect_rejections:   u32,
    pub idle:                u32,
    pub memories_written:    u32,
    pub memories_evicted:    u32,
    pub interactions:        u32,
}

impl From<&TickSummary> for TickSummaryRow {
    fn from(s: &TickSummary) -> Self {
        Self {
            tick:                s.tick.0,
            day:                 s.day,
            phase:               s.phase.as_str(),
            active:              s.active,
            processed:           s.processed,
            decisions:           s.decisions,
            actions:             s.actions,
            oracle_failures:     s.oracle_failures,
            oracle_timeouts:     s.oracle_timeouts,
            malformed:           s.malformed,
            cancellations:       s.cancellations,
            navigation_failures: s.navigation_failures,
            effect_rejections:   s.effect_rejections,
            idle:                s.idle,
            memories_written:    s.memories_written,
            memories_evicted:    s.memories_evicted,
            interactions:        s.interactions,
        }
    }
}
