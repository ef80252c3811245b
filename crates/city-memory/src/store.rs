//! `MemoryStore`: per-citizen ledgers behind per-owner locks.
//!
//! # Locking
//!
//! The owner table is an `RwLock<BTreeMap<..>>` that is only write-locked by
//! `register_owner` and `restore`.  Every ledger has its own `RwLock`, so
//! writers with distinct owners never contend; they share a read lock on the
//! owner table just long enough to clone the ledger's `Arc`.
//!
//! # Capacity
//!
//! `record` keeps every owner at or below `capacity`: when a write overflows
//! the ledger, the lowest-importance entry that was already there is evicted
//! (ties: oldest first).  The new entry is always kept.
//!
//! `decay` lowers importance along a half-life curve, then evicts entries
//! below `importance_floor` from owners still above capacity (for example
//! after `set_capacity` shrank the limit).

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use city_core::{CitizenId, MemoryConfig, MemoryId, Tick};
use tracing::{debug, error};

use crate::entry::{MemoryDraft, MemoryEntry};
use crate::recall::{Recall, ScoredMemory};
use crate::relevance::{MemoryQuery, OverlapRelevance, Relevance};
use crate::{MemoryError, MemoryResult};

type Ledger = Vec<MemoryEntry>;

pub struct MemoryStore {
    config:    MemoryConfig,
    relevance: OverlapRelevance,
    owners:    RwLock<BTreeMap<CitizenId, Arc<RwLock<Ledger>>>>,
    next_id:   AtomicU64,
    evicted:   AtomicU64,
}

impl MemoryStore {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            config,
            relevance: OverlapRelevance::default(),
            owners:    RwLock::new(BTreeMap::new()),
            next_id:   AtomicU64::new(0),
            evicted:   AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Change the per-owner capacity.  Existing ledgers are trimmed lazily:
    /// by the next `record` for that owner, or by `decay` for sub-floor
    /// entries.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.config.capacity = capacity.max(1);
    }

    // ── Owners ────────────────────────────────────────────────────────────

    /// Allow writes for `owner`.  Registering twice is a no-op.
    pub fn register_owner(&self, owner: CitizenId) {
        write(&self.owners).entry(owner).or_default();
    }

    pub fn is_owner(&self, owner: CitizenId) -> bool {
        read(&self.owners).contains_key(&owner)
    }

    fn ledger(&self, owner: CitizenId) -> MemoryResult<Arc<RwLock<Ledger>>> {
        read(&self.owners)
            .get(&owner)
            .cloned()
            .ok_or(MemoryError::InvalidOwner(owner))
    }

    // ── Writes ────────────────────────────────────────────────────────────

    /// Append `draft` to `owner`'s ledger and return the new entry's id.
    pub fn record(&self, owner: CitizenId, draft: MemoryDraft) -> MemoryResult<MemoryId> {
        let ledger = self.ledger(owner).inspect_err(|_| {
            error!(citizen = owner.0, "memory write for unknown owner");
        })?;
        let id = MemoryId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut entries = write(&ledger);
        entries.push(MemoryEntry::from_draft(id, owner, draft));

        while entries.len() > self.config.capacity {
            // Only pre-existing entries (all but the last) are candidates.
            let existing = entries.len() - 1;
            let Some(victim) = lowest(&entries[..existing]) else { break };
            let removed = entries.remove(victim);
            self.evicted.fetch_add(1, Ordering::Relaxed);
            debug!(
                citizen = owner.0,
                memory = removed.id.0,
                importance = removed.importance(),
                "memory evicted on write"
            );
        }
        Ok(id)
    }

    /// Apply age-based decay to every entry, then trim over-capacity owners
    /// of sub-floor entries.  Returns how many entries were evicted.
    pub fn decay(&self, now: Tick) -> usize {
        let ledgers: Vec<(CitizenId, Arc<RwLock<Ledger>>)> =
            read(&self.owners).iter().map(|(k, v)| (*k, Arc::clone(v))).collect();

        let mut evicted = 0;
        for (owner, ledger) in ledgers {
            let mut entries = write(&ledger);
            for entry in entries.iter_mut() {
                entry.decay(now, self.config.half_life_ticks);
            }
            while entries.len() > self.config.capacity {
                let floor = self.config.importance_floor;
                let victim = entries
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.importance() < floor)
                    .min_by(|(_, a), (_, b)| cmp_eviction(a, b))
                    .map(|(i, _)| i);
                let Some(victim) = victim else { break };
                let removed = entries.remove(victim);
                evicted += 1;
                debug!(citizen = owner.0, memory = removed.id.0, "memory evicted on decay");
            }
        }
        self.evicted.fetch_add(evicted as u64, Ordering::Relaxed);
        evicted
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// Up to `limit` of `owner`'s entries ranked by
    /// `importance × recency_decay^age × relevance` using keyword/entity
    /// overlap as the relevance measure.
    pub fn retrieve(&self, owner: CitizenId, query: &MemoryQuery, limit: usize) -> MemoryResult<Recall> {
        self.retrieve_with(owner, query, limit, &self.relevance)
    }

    /// Like [`retrieve`](Self::retrieve) with a caller-supplied relevance.
    pub fn retrieve_with(
        &self,
        owner: CitizenId,
        query: &MemoryQuery,
        limit: usize,
        relevance: &dyn Relevance,
    ) -> MemoryResult<Recall> {
        let ledger = self.ledger(owner)?;
        let entries = read(&ledger);
        let decay = self.config.recency_decay as f64;

        let mut scored: Vec<ScoredMemory> = entries
            .iter()
            .map(|e| {
                let recency = decay.powf(e.age(query.now) as f64) as f32;
                let rel = relevance.score(e, query).clamp(0.0, 1.0);
                ScoredMemory { entry: e.clone(), score: e.importance() * recency * rel }
            })
            .collect();
        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(b.entry.tick.cmp(&a.entry.tick))
                .then(b.entry.id.cmp(&a.entry.id))
        });
        scored.truncate(limit);
        Ok(Recall::new(scored))
    }

    /// Entries held for `owner`, 0 for unknown owners.
    pub fn len(&self, owner: CitizenId) -> usize {
        self.ledger(owner).map_or(0, |l| read(&l).len())
    }

    pub fn total_len(&self) -> usize {
        read(&self.owners).values().map(|l| read(l).len()).sum()
    }

    /// Copy of `owner`'s ledger in creation order.
    pub fn entries(&self, owner: CitizenId) -> MemoryResult<Vec<MemoryEntry>> {
        let ledger = self.ledger(owner)?;
        Ok(read(&ledger).clone())
    }

    /// Every entry, ascending owner then creation order.
    pub fn all_entries(&self) -> Vec<MemoryEntry> {
        read(&self.owners)
            .values()
            .flat_map(|l| read(l).clone())
            .collect()
    }

    /// The id the next `record` will allocate.
    pub fn next_id(&self) -> MemoryId {
        MemoryId(self.next_id.load(Ordering::Relaxed))
    }

    /// Total entries evicted since the store was created.
    pub fn evicted_total(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    // ── Snapshot restore ──────────────────────────────────────────────────

    /// Load previously exported entries.  Owners must already be registered.
    /// The id allocator resumes at `next_id` or past the highest restored id,
    /// whichever is larger.
    pub fn restore(&self, entries: Vec<MemoryEntry>, next_id: MemoryId) -> MemoryResult<()> {
        let owners = write(&self.owners);
        let mut highest = next_id.0;
        for entry in entries {
            let ledger = owners.get(&entry.owner).ok_or(MemoryError::InvalidOwner(entry.owner))?;
            let mut ledger = write(ledger);
            if ledger.iter().any(|e| e.id == entry.id) {
                return Err(MemoryError::DuplicateMemory(entry.id));
            }
            highest = highest.max(entry.id.0 + 1);
            let at = ledger.partition_point(|e| e.id < entry.id);
            ledger.insert(at, entry);
        }
        self.next_id.store(highest, Ordering::Relaxed);
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn cmp_eviction(a: &MemoryEntry, b: &MemoryEntry) -> std::cmp::Ordering {
    let (ia, ta, ida) = a.eviction_key();
    let (ib, tb, idb) = b.eviction_key();
    ia.total_cmp(&ib).then(ta.cmp(&tb)).then(ida.cmp(&idb))
}

/// Index of the entry to evict first.
fn lowest(entries: &[MemoryEntry]) -> Option<usize> {
    entries
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| cmp_eviction(a, b))
        .map(|(i, _)| i)
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
