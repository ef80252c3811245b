//! Relationship edge types.

use std::fmt;

use city_core::{CitizenId, Tick};

// ── PairKey ───────────────────────────────────────────────────────────────────

/// Canonical unordered pair of distinct citizens, smaller id first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairKey {
    lo: CitizenId,
    hi: CitizenId,
}

impl PairKey {
    /// `None` when `a == b`.
    pub fn new(a: CitizenId, b: CitizenId) -> Option<PairKey> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less    => Some(PairKey { lo: a, hi: b }),
            std::cmp::Ordering::Greater => Some(PairKey { lo: b, hi: a }),
            std::cmp::Ordering::Equal   => None,
        }
    }

    #[inline]
    pub fn lo(self) -> CitizenId {
        self.lo
    }

    #[inline]
    pub fn hi(self) -> CitizenId {
        self.hi
    }

    #[inline]
    pub fn contains(self, id: CitizenId) -> bool {
        self.lo == id || self.hi == id
    }

    /// The member of the pair that is not `id`.
    #[inline]
    pub fn other(self, id: CitizenId) -> Option<CitizenId> {
        if id == self.lo {
            Some(self.hi)
        } else if id == self.hi {
            Some(self.lo)
        } else {
            None
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.lo.0, self.hi.0)
    }
}

// ── RelationshipKind ──────────────────────────────────────────────────────────

/// Affinity at or above which an acquaintance becomes a friend.
pub const FRIEND_THRESHOLD: f32 = 0.5;
/// Affinity at or below which an acquaintance becomes a rival.
pub const RIVAL_THRESHOLD: f32 = -0.3;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RelationshipKind {
    Acquaintance,
    Friend,
    Rival,
    /// Members of the same household.  Never reclassified by affinity.
    Household,
}

impl RelationshipKind {
    pub fn from_affinity(affinity: f32) -> Self {
        if affinity >= FRIEND_THRESHOLD {
            RelationshipKind::Friend
        } else if affinity <= RIVAL_THRESHOLD {
            RelationshipKind::Rival
        } else {
            RelationshipKind::Acquaintance
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipKind::Acquaintance => "acquaintance",
            RelationshipKind::Friend       => "friend",
            RelationshipKind::Rival        => "rival",
            RelationshipKind::Household    => "household",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── InteractionOutcome ────────────────────────────────────────────────────────

/// How an interaction went, from -1 (hostile) to +1 (warm).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InteractionOutcome {
    pub sentiment: f32,
}

impl InteractionOutcome {
    pub fn new(sentiment: f32) -> Self {
        Self { sentiment }
    }

    pub fn positive() -> Self {
        Self::new(1.0)
    }

    pub fn negative() -> Self {
        Self::new(-1.0)
    }

    pub fn neutral() -> Self {
        Self::new(0.0)
    }

    /// Sentiment clamped to `[-1, 1]`; NaN reads as neutral.
    #[inline]
    pub fn clamped(self) -> f32 {
        if self.sentiment.is_nan() { 0.0 } else { self.sentiment.clamp(-1.0, 1.0) }
    }
}

// ── RelationshipEdge ──────────────────────────────────────────────────────────

/// State shared by both directions of one relationship.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelationshipEdge {
    pub pair:              PairKey,
    pub kind:              RelationshipKind,
    /// In `[-1, 1]`.
    pub affinity:          f32,
    pub interactions:      u32,
    pub first_interaction: Tick,
    pub last_interaction:  Tick,
}

impl RelationshipEdge {
    pub(crate) fn new(pair: PairKey, affinity: f32, tick: Tick) -> Self {
        let affinity = affinity.clamp(-1.0, 1.0);
        Self {
            pair,
            kind: RelationshipKind::from_affinity(affinity),
            affinity,
            interactions: 0,
            first_interaction: tick,
            last_interaction: tick,
        }
    }

    /// Shift affinity by `delta`, clamp, and reclassify.
    pub(crate) fn apply(&mut self, delta: f32, tick: Tick) {
        self.affinity = (self.affinity + delta).clamp(-1.0, 1.0);
        self.interactions = self.interactions.saturating_add(1);
        self.last_interaction = tick;
        if self.kind != RelationshipKind::Household {
            self.kind = RelationshipKind::from_affinity(self.affinity);
        }
    }

    /// The other endpoint as seen from `id`.
    #[inline]
    pub fn other(&self, id: CitizenId) -> Option<CitizenId> {
        self.pair.other(id)
    }
}
