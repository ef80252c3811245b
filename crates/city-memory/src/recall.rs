//! `Recall`: the ranked result of a retrieval.

use crate::entry::MemoryEntry;

/// One retrieved entry with the composite score it was ranked by.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredMemory {
    pub entry: MemoryEntry,
    pub score: f32,
}

/// Ranked, finite retrieval result.
///
/// Holds copies of the entries, so later writes or decay do not change it.
/// [`Recall::iter`] can be called any number of times and always yields the
/// same sequence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Recall {
    ranked: Vec<ScoredMemory>,
}

impl Recall {
    pub(crate) fn new(ranked: Vec<ScoredMemory>) -> Self {
        Self { ranked }
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemoryEntry> + '_ {
        self.ranked.iter().map(|s| &s.entry)
    }

    pub fn scored(&self) -> &[ScoredMemory] {
        &self.ranked
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    pub fn into_entries(self) -> Vec<MemoryEntry> {
        self.ranked.into_iter().map(|s| s.entry).collect()
    }
}

impl<'a> IntoIterator for &'a Recall {
    type Item = &'a MemoryEntry;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, ScoredMemory>, fn(&'a ScoredMemory) -> &'a MemoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        let entry: fn(&'a ScoredMemory) -> &'a MemoryEntry = |s| &s.entry;
        self.ranked.iter().map(entry)
    }
}
