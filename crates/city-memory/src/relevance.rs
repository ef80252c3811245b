//! Relevance scoring for retrieval.

use std::collections::BTreeSet;

use city_core::Tick;

use crate::entry::{EntityRef, MemoryEntry};

/// What the caller is trying to remember about.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryQuery {
    /// Reference tick for recency weighting.
    pub now:      Tick,
    pub keywords: Vec<String>,
    pub entities: BTreeSet<EntityRef>,
}

impl MemoryQuery {
    pub fn at(now: Tick) -> Self {
        Self { now, ..Self::default() }
    }

    pub fn keyword(mut self, keyword: impl AsRef<str>) -> Self {
        self.keywords.push(keyword.as_ref().to_lowercase());
        self
    }

    pub fn entity(mut self, entity: EntityRef) -> Self {
        self.entities.insert(entity);
        self
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.entities.is_empty()
    }
}

/// Similarity between a stored entry and a query, in `[0, 1]`.
///
/// Implementations must be pure: the same `(entry, query)` always scores the
/// same, or retrieval stops being idempotent.
pub trait Relevance: Send + Sync {
    fn score(&self, entry: &MemoryEntry, query: &MemoryQuery) -> f32;
}

/// Fraction of query keywords and entities the entry mentions, lifted by a
/// floor so unrelated but important memories can still surface.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OverlapRelevance {
    pub floor: f32,
}

impl Default for OverlapRelevance {
    fn default() -> Self {
        Self { floor: 0.1 }
    }
}

impl Relevance for OverlapRelevance {
    fn score(&self, entry: &MemoryEntry, query: &MemoryQuery) -> f32 {
        if query.is_empty() {
            return 1.0;
        }
        let keyword_hits = query
            .keywords
            .iter()
            .filter(|k| entry.payload.keywords.iter().any(|e| e.eq_ignore_ascii_case(k)))
            .count();
        let entity_hits = query.entities.intersection(&entry.entities).count();
        let total = query.keywords.len() + query.entities.len();
        let overlap = (keyword_hits + entity_hits) as f32 / total as f32;
        let floor = self.floor.clamp(0.0, 1.0);
        floor + (1.0 - floor) * overlap
    }
}

impl<F> Relevance for F
where
    F: Fn(&MemoryEntry, &MemoryQuery) -> f32 + Send + Sync,
{
    fn score(&self, entry: &MemoryEntry, query: &MemoryQuery) -> f32 {
        self(entry, query)
    }
}
