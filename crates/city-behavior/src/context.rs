//! The decision request handed to the oracle.
//!
//! A `DecisionContext` is a self-contained, owned bundle: the oracle call may
//! run on another task, so nothing in it borrows kernel state.

use city_citizen::{Citizen, CitizenRegistry, Demographics, Personality};
use city_core::{CitizenId, Clock, Phase, Position, Tick};
use city_memory::{EntityRef, MemoryEntry, MemoryQuery, MemoryStore};
use city_schedule::Activity;
use city_social::{RelationshipKind, SocialGraph};

use crate::state::{BehaviorState, DecisionTrigger};
use crate::BehaviorResult;

// ── Views ─────────────────────────────────────────────────────────────────────

/// What the oracle may know about the deciding citizen.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CitizenView {
    pub id:           CitizenId,
    pub name:         String,
    pub demographics: Demographics,
    pub personality:  Personality,
    pub home:         Position,
    pub work:         Option<Position>,
    pub position:     Position,
}

impl CitizenView {
    pub fn new(citizen: &Citizen, position: Position) -> Self {
        Self {
            id:           citizen.id,
            name:         citizen.name.clone(),
            demographics: citizen.demographics.clone(),
            personality:  citizen.personality,
            home:         citizen.home,
            work:         citizen.work,
            position,
        }
    }
}

/// One entry of the bounded neighbor snapshot.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NeighborView {
    pub id:           CitizenId,
    pub name:         String,
    /// Standing on the same tile as the deciding citizen.
    pub co_located:   bool,
    /// `None` when the two have never interacted.
    pub affinity:     Option<f32>,
    pub relationship: Option<RelationshipKind>,
}

// ── DecisionContext ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecisionContext {
    pub citizen:   CitizenView,
    /// State before entering `Deciding`.
    pub state:     BehaviorState,
    pub trigger:   DecisionTrigger,
    /// Activity the schedule intends at `tick`.
    pub scheduled: Option<Activity>,
    pub tick:      Tick,
    pub day:       u64,
    pub phase:     Phase,
    /// Top-ranked memories, best first.
    pub memories:  Vec<MemoryEntry>,
    /// Co-located citizens first (ascending id), then strongest ties.
    pub neighbors: Vec<NeighborView>,
}

/// Kernel state a context is assembled from.
#[derive(Copy, Clone)]
pub struct ContextSources<'a> {
    pub clock:    &'a Clock,
    pub registry: &'a CitizenRegistry,
    pub memory:   &'a MemoryStore,
    pub graph:    &'a SocialGraph,
}

impl DecisionContext {
    /// Gather memories and neighbors for `citizen` at the clock's current
    /// tick.
    ///
    /// `co_located` lists the active citizens on the citizen's tile in
    /// ascending id order; it may include the citizen itself.  The snapshot
    /// holds at most `social.neighbor_limit` entries and the memory window at
    /// most `memory.retrieval_limit`.
    pub fn assemble(
        src:        ContextSources<'_>,
        citizen:    &Citizen,
        position:   Position,
        state:      &BehaviorState,
        trigger:    DecisionTrigger,
        co_located: &[CitizenId],
    ) -> BehaviorResult<DecisionContext> {
        let tick = src.clock.current_tick();
        let scheduled = citizen.schedule.activity_at(tick);
        let neighbors = neighbor_snapshot(src, citizen.id, co_located);

        let mut query = MemoryQuery::at(tick)
            .keyword(trigger.as_str())
            .entity(EntityRef::Location(position));
        if let Some(activity) = scheduled {
            query = query.keyword(activity.as_str());
        }
        for n in neighbors.iter().filter(|n| n.co_located) {
            query = query.entity(EntityRef::Citizen(n.id));
        }
        let limit = src.memory.config().retrieval_limit;
        let memories = src.memory.retrieve(citizen.id, &query, limit)?.into_entries();

        Ok(DecisionContext {
            citizen: CitizenView::new(citizen, position),
            state: state.clone(),
            trigger,
            scheduled,
            tick,
            day: src.clock.day_index(),
            phase: src.clock.phase(),
            memories,
            neighbors,
        })
    }

    pub fn neighbor(&self, id: CitizenId) -> Option<&NeighborView> {
        self.neighbors.iter().find(|n| n.id == id)
    }

    /// Co-located neighbors, ascending id.
    pub fn co_located(&self) -> impl Iterator<Item = &NeighborView> + '_ {
        self.neighbors.iter().filter(|n| n.co_located)
    }
}

fn neighbor_snapshot(src: ContextSources<'_>, me: CitizenId, co_located: &[CitizenId]) -> Vec<NeighborView> {
    let social = src.graph.config();
    let limit = social.neighbor_limit;
    let view = |id: CitizenId, near: bool| {
        let edge = src.graph.get_edge(me, id);
        NeighborView {
            id,
            name:         src.registry.get(id).map(|c| c.name.clone()).unwrap_or_default(),
            co_located:   near,
            affinity:     edge.as_ref().map(|e| e.affinity),
            relationship: edge.as_ref().map(|e| e.kind),
        }
    };

    let mut out: Vec<NeighborView> = co_located
        .iter()
        .copied()
        .filter(|&id| id != me)
        .take(limit)
        .map(|id| view(id, true))
        .collect();

    let ties = src.graph.closest(me, limit + out.len(), social.min_neighbor_affinity);
    for other in ties.iter().filter_map(|e| e.other(me)) {
        if out.len() >= limit {
            break;
        }
        if out.iter().all(|n| n.id != other) {
            out.push(view(other, false));
        }
    }
    out
}
