//! `SocialGraph`: symmetric edges in lock-striped shards.
//!
//! Each edge lives in exactly one shard, chosen by hashing its `PairKey`, so
//! two interactions only serialize when they touch pairs in the same stripe.
//! Reads that span the whole graph (`neighbors`, `edges`) lock one shard at a
//! time.

use std::collections::BTreeSet;
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use city_core::{CitizenId, SocialConfig, Tick};
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use tracing::{debug, error};

use crate::edge::{InteractionOutcome, PairKey, RelationshipEdge, RelationshipKind};
use crate::{SocialError, SocialResult};

/// Affinity a household edge starts with.
const HOUSEHOLD_AFFINITY: f32 = 0.6;

type Shard = FxHashMap<PairKey, RelationshipEdge>;

pub struct SocialGraph {
    config:  SocialConfig,
    members: RwLock<FxHashSet<CitizenId>>,
    shards:  Vec<Mutex<Shard>>,
}

impl SocialGraph {
    pub fn new(config: SocialConfig) -> Self {
        let shard_count = config.shard_count.max(1);
        Self {
            config,
            members: RwLock::new(FxHashSet::default()),
            shards:  (0..shard_count).map(|_| Mutex::new(Shard::default())).collect(),
        }
    }

    pub fn config(&self) -> &SocialConfig {
        &self.config
    }

    // ── Membership ────────────────────────────────────────────────────────

    /// Allow `id` to take part in interactions.  Idempotent.
    pub fn register(&self, id: CitizenId) {
        self.members
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
    }

    pub fn is_registered(&self, id: CitizenId) -> bool {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }

    fn pair_of(&self, a: CitizenId, b: CitizenId) -> SocialResult<PairKey> {
        for id in [a, b] {
            if !self.is_registered(id) {
                error!(citizen = id.0, "social graph operation on unknown citizen");
                return Err(SocialError::InvalidOwner(id));
            }
        }
        PairKey::new(a, b).ok_or(SocialError::SelfInteraction(a))
    }

    fn shard(&self, pair: PairKey) -> MutexGuard<'_, Shard> {
        let mut hasher = FxBuildHasher.build_hasher();
        pair.hash(&mut hasher);
        let idx = (hasher.finish() % self.shards.len() as u64) as usize;
        self.shards[idx].lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// The edge between `a` and `b`, regardless of argument order.
    pub fn get_edge(&self, a: CitizenId, b: CitizenId) -> Option<RelationshipEdge> {
        let pair = PairKey::new(a, b)?;
        self.shard(pair).get(&pair).cloned()
    }

    /// Every citizen sharing an edge with `id`.
    pub fn neighbors(&self, id: CitizenId) -> BTreeSet<CitizenId> {
        self.for_each_shard(|shard, out: &mut BTreeSet<CitizenId>| {
            out.extend(shard.keys().filter_map(|p| p.other(id)));
        })
    }

    /// Up to `limit` of `id`'s edges with affinity at least `min_affinity`,
    /// strongest first (ties: lower neighbour id first).
    pub fn closest(&self, id: CitizenId, limit: usize, min_affinity: f32) -> Vec<RelationshipEdge> {
        let mut edges = self.for_each_shard(|shard, out: &mut Vec<RelationshipEdge>| {
            out.extend(
                shard
                    .values()
                    .filter(|e| e.pair.contains(id) && e.affinity >= min_affinity)
                    .cloned(),
            );
        });
        edges.sort_by(|a, b| {
            b.affinity
                .total_cmp(&a.affinity)
                .then(a.other(id).cmp(&b.other(id)))
        });
        edges.truncate(limit);
        edges
    }

    pub fn edge_count(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    /// Copy of every edge, sorted by pair.
    pub fn edges(&self) -> Vec<RelationshipEdge> {
        let mut edges = self.for_each_shard(|shard, out: &mut Vec<RelationshipEdge>| {
            out.extend(shard.values().cloned());
        });
        edges.sort_by_key(|e| e.pair);
        edges
    }

    // ── Writes ────────────────────────────────────────────────────────────

    /// Record one interaction between `a` and `b` at `tick`.
    ///
    /// Creates the edge at the neutral baseline if absent, then moves affinity
    /// by `sentiment × max_affinity_delta`.  Argument order does not matter.
    pub fn record_interaction(
        &self,
        a: CitizenId,
        b: CitizenId,
        outcome: InteractionOutcome,
        tick: Tick,
    ) -> SocialResult<RelationshipEdge> {
        let pair = self.pair_of(a, b)?;
        let delta = outcome.clamped() * self.config.max_affinity_delta;
        let mut shard = self.shard(pair);
        let edge = shard.entry(pair).or_insert_with(|| {
            debug!(pair = %pair, "relationship created");
            RelationshipEdge::new(pair, self.config.neutral_affinity, tick)
        });
        edge.apply(delta, tick);
        Ok(edge.clone())
    }

    /// Mark `a` and `b` as one household.  An existing edge keeps its
    /// affinity and history; a new one starts warm.
    pub fn seed_household(&self, a: CitizenId, b: CitizenId, tick: Tick) -> SocialResult<()> {
        let pair = self.pair_of(a, b)?;
        let mut shard = self.shard(pair);
        let affinity = self.config.neutral_affinity.max(HOUSEHOLD_AFFINITY);
        let edge = shard
            .entry(pair)
            .or_insert_with(|| RelationshipEdge::new(pair, affinity, tick));
        edge.kind = RelationshipKind::Household;
        Ok(())
    }

    /// Load previously exported edges, replacing any existing edge for the
    /// same pair.  Both endpoints must be registered.
    pub fn restore(&self, edges: Vec<RelationshipEdge>) -> SocialResult<()> {
        for mut edge in edges {
            let pair = self.pair_of(edge.pair.lo(), edge.pair.hi())?;
            edge.pair = pair;
            edge.affinity = edge.affinity.clamp(-1.0, 1.0);
            self.shard(pair).insert(pair, edge);
        }
        Ok(())
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn for_each_shard<T: Default>(&self, mut f: impl FnMut(&Shard, &mut T)) -> T {
        let mut out = T::default();
        for shard in &self.shards {
            f(&shard.lock().unwrap_or_else(PoisonError::into_inner), &mut out);
        }
        out
    }
}
