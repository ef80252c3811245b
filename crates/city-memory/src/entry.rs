//! Memory entry types.

use std::collections::BTreeSet;
use std::fmt;

use city_core::{CitizenId, MemoryId, Position, Tick};

// ── MemoryKind ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MemoryKind {
    Observation,
    Conversation,
    Reflection,
}

impl MemoryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MemoryKind::Observation  => "observation",
            MemoryKind::Conversation => "conversation",
            MemoryKind::Reflection   => "reflection",
        }
    }
}

impl fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── EntityRef ─────────────────────────────────────────────────────────────────

/// Something a memory is about.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityRef {
    Citizen(CitizenId),
    Location(Position),
}

// ── Payload ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryPayload {
    pub summary:  String,
    /// Lowercase keywords used by overlap relevance.
    pub keywords: Vec<String>,
}

// ── MemoryDraft ───────────────────────────────────────────────────────────────

/// An entry before the store assigns it an id and owner.
///
/// ```rust
/// use city_core::{CitizenId, Tick};
/// use city_memory::{EntityRef, MemoryDraft, MemoryKind};
///
/// let draft = MemoryDraft::new(MemoryKind::Conversation, Tick(12), "talked about the market")
///     .importance(0.6)
///     .keyword("market")
///     .entity(EntityRef::Citizen(CitizenId(3)));
/// assert_eq!(draft.payload.keywords, vec!["market".to_string()]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryDraft {
    pub tick:       Tick,
    pub kind:       MemoryKind,
    pub payload:    MemoryPayload,
    pub importance: f32,
    pub entities:   BTreeSet<EntityRef>,
}

impl MemoryDraft {
    pub fn new(kind: MemoryKind, tick: Tick, summary: impl Into<String>) -> Self {
        Self {
            tick,
            kind,
            payload: MemoryPayload { summary: summary.into(), keywords: Vec::new() },
            importance: 0.5,
            entities: BTreeSet::new(),
        }
    }

    pub fn importance(mut self, importance: f32) -> Self {
        self.importance = importance;
        self
    }

    pub fn keyword(mut self, keyword: impl AsRef<str>) -> Self {
        self.payload.keywords.push(keyword.as_ref().to_lowercase());
        self
    }

    pub fn entity(mut self, entity: EntityRef) -> Self {
        self.entities.insert(entity);
        self
    }
}

// ── MemoryEntry ───────────────────────────────────────────────────────────────

/// A stored memory.  Only `importance` ever changes after creation, and it
/// only goes down.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryEntry {
    pub id:       MemoryId,
    pub owner:    CitizenId,
    pub tick:     Tick,
    pub kind:     MemoryKind,
    pub payload:  MemoryPayload,
    pub entities: BTreeSet<EntityRef>,
    importance:         f32,
    initial_importance: f32,
}

impl MemoryEntry {
    pub(crate) fn from_draft(id: MemoryId, owner: CitizenId, draft: MemoryDraft) -> Self {
        let importance = clamp_importance(draft.importance);
        Self {
            id,
            owner,
            tick: draft.tick,
            kind: draft.kind,
            payload: draft.payload,
            entities: draft.entities,
            importance,
            initial_importance: importance,
        }
    }

    #[inline]
    pub fn importance(&self) -> f32 {
        self.importance
    }

    #[inline]
    pub fn initial_importance(&self) -> f32 {
        self.initial_importance
    }

    /// Ticks elapsed since creation.
    #[inline]
    pub fn age(&self, now: Tick) -> u64 {
        now.since(self.tick)
    }

    /// Lower importance towards the half-life curve.  Never raises it.
    pub(crate) fn decay(&mut self, now: Tick, half_life_ticks: u64) {
        let halvings = self.age(now) as f64 / half_life_ticks.max(1) as f64;
        let target = (self.initial_importance as f64 * 0.5_f64.powf(halvings)) as f32;
        self.importance = self.importance.min(target);
    }

    /// Eviction order: lowest importance first, then oldest.
    pub(crate) fn eviction_key(&self) -> (f32, Tick, MemoryId) {
        (self.importance, self.tick, self.id)
    }
}

/// Importance is kept in `[0, 1]`; NaN counts as zero.
fn clamp_importance(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}
