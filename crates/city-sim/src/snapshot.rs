//! Persistence boundary: everything needed to resume a run exactly.

use city_behavior::BehaviorState;
use city_citizen::{Citizen, CitizenStatus};
use city_core::{KernelConfig, MemoryId, Position, Tick};
use city_memory::MemoryEntry;
use city_social::RelationshipEdge;

/// One registered citizen and its arena slots.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CitizenSnapshot {
    pub citizen:        Citizen,
    pub status:         CitizenStatus,
    pub position:       Position,
    pub state:          BehaviorState,
    pub last_decision:  Option<Tick>,
    pub last_interrupt: Option<Tick>,
}

/// Kernel state at a tick boundary.
///
/// Produced by `Sim::snapshot` and consumed by `SimBuilder::from_snapshot`.
/// The encoding is left to the application (any serde format with the
/// `serde` feature).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KernelSnapshot {
    pub config:         KernelConfig,
    pub tick:           Tick,
    /// Ascending id.
    pub citizens:       Vec<CitizenSnapshot>,
    /// Ascending owner, then creation order.
    pub memories:       Vec<MemoryEntry>,
    pub next_memory_id: MemoryId,
    /// Sorted by pair.
    pub edges:          Vec<RelationshipEdge>,
}

impl KernelSnapshot {
    pub fn active_count(&self) -> usize {
        self.citizens.iter().filter(|c| c.status == CitizenStatus::Active).count()
    }
}
