//! Unit tests for city-memory.

use city_core::{CitizenId, MemoryConfig, Tick};

use crate::{MemoryDraft, MemoryKind, MemoryStore};

// ── Helpers ───────────────────────────────────────────────────────────────────

const A: CitizenId = CitizenId(0);
const B: CitizenId = CitizenId(1);

fn store_with(capacity: usize) -> MemoryStore {
    let store = MemoryStore::new(MemoryConfig { capacity, ..MemoryConfig::default() });
    store.register_owner(A);
    store.register_owner(B);
    store
}

fn obs(tick: u64, importance: f32) -> MemoryDraft {
    MemoryDraft::new(MemoryKind::Observation, Tick(tick), format!("saw something at {tick}"))
        .importance(importance)
}

fn importances(store: &MemoryStore, owner: CitizenId) -> Vec<f32> {
    store.entries(owner).unwrap().iter().map(|e| e.importance()).collect()
}

#[cfg(test)]
mod record {
    use super::*;
    use crate::MemoryError;

    #[test]
    fn unknown_owner_is_rejected() {
        let store = store_with(4);
        assert_eq!(store.record(CitizenId(9), obs(0, 0.5)), Err(MemoryError::InvalidOwner(CitizenId(9))));
        assert_eq!(store.total_len(), 0);
    }

    #[test]
    fn ids_are_global_and_monotonic() {
        let store = store_with(4);
        let a = store.record(A, obs(0, 0.5)).unwrap();
        let b = store.record(B, obs(0, 0.5)).unwrap();
        let c = store.record(A, obs(1, 0.5)).unwrap();
        assert!(a < b && b < c);
        assert_eq!(store.len(A), 2);
        assert_eq!(store.len(B), 1);
        assert_eq!(store.next_id(), city_core::MemoryId(3));
    }

    #[test]
    fn importance_is_clamped() {
        let store = store_with(4);
        store.record(A, obs(0, 3.0)).unwrap();
        store.record(A, obs(0, -1.0)).unwrap();
        store.record(A, obs(0, f32::NAN)).unwrap();
        assert_eq!(importances(&store, A), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn overflow_evicts_lowest_existing_entry() {
        let store = store_with(3);
        store.record(A, obs(0, 0.9)).unwrap();
        store.record(A, obs(1, 0.2)).unwrap();
        store.record(A, obs(2, 0.5)).unwrap();
        let new_id = store.record(A, obs(3, 0.1)).unwrap();

        assert_eq!(store.len(A), 3);
        assert_eq!(importances(&store, A), vec![0.9, 0.5, 0.1]);
        assert!(store.entries(A).unwrap().iter().any(|e| e.id == new_id));
        assert_eq!(store.evicted_total(), 1);
    }

    #[test]
    fn eviction_ties_go_to_oldest() {
        let store = store_with(2);
        let first = store.record(A, obs(0, 0.3)).unwrap();
        let second = store.record(A, obs(1, 0.3)).unwrap();
        store.record(A, obs(2, 0.3)).unwrap();
        let ids: Vec<_> = store.entries(A).unwrap().iter().map(|e| e.id).collect();
        assert!(!ids.contains(&first));
        assert!(ids.contains(&second));
    }

    #[test]
    fn owners_do_not_share_capacity() {
        let store = store_with(1);
        store.record(A, obs(0, 0.5)).unwrap();
        store.record(B, obs(0, 0.5)).unwrap();
        assert_eq!(store.total_len(), 2);
    }
}

#[cfg(test)]
mod retrieve {
    use super::*;
    use crate::{EntityRef, MemoryEntry, MemoryQuery};

    #[test]
    fn ranks_by_importance_then_recency() {
        let store = store_with(8);
        store.record(A, obs(0, 0.2)).unwrap();
        store.record(A, obs(0, 0.9)).unwrap();
        store.record(A, obs(0, 0.5)).unwrap();
        let recall = store.retrieve(A, &MemoryQuery::at(Tick(0)), 2).unwrap();
        let got: Vec<f32> = recall.iter().map(|e| e.importance()).collect();
        assert_eq!(got, vec![0.9, 0.5]);
    }

    #[test]
    fn ties_prefer_most_recent() {
        let store = MemoryStore::new(MemoryConfig { recency_decay: 1.0, ..MemoryConfig::default() });
        store.register_owner(A);
        store.record(A, obs(1, 0.5)).unwrap();
        store.record(A, obs(5, 0.5)).unwrap();
        store.record(A, obs(3, 0.5)).unwrap();
        let recall = store.retrieve(A, &MemoryQuery::at(Tick(10)), 3).unwrap();
        let ticks: Vec<u64> = recall.iter().map(|e| e.tick.0).collect();
        assert_eq!(ticks, vec![5, 3, 1]);
    }

    #[test]
    fn recency_discounts_old_memories() {
        let store = store_with(8);
        store.record(A, obs(0, 0.5)).unwrap();
        store.record(A, obs(100, 0.5)).unwrap();
        let recall = store.retrieve(A, &MemoryQuery::at(Tick(100)), 1).unwrap();
        assert_eq!(recall.iter().next().unwrap().tick, Tick(100));
    }

    #[test]
    fn retrieval_is_idempotent_and_restartable() {
        let store = store_with(8);
        for t in 0..6 {
            store.record(A, obs(t, 0.1 * t as f32)).unwrap();
        }
        let q = MemoryQuery::at(Tick(6)).keyword("market");
        let first = store.retrieve(A, &q, 4).unwrap();
        let second = store.retrieve(A, &q, 4).unwrap();
        assert_eq!(first, second);

        let pass1: Vec<_> = first.iter().map(|e| e.id).collect();
        let pass2: Vec<_> = (&first).into_iter().map(|e| e.id).collect();
        assert_eq!(pass1, pass2);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn overlap_relevance_prefers_matching_entries() {
        let store = store_with(8);
        let friend = EntityRef::Citizen(B);
        store.record(A, obs(0, 0.6)).unwrap();
        store
            .record(A, MemoryDraft::new(MemoryKind::Conversation, Tick(0), "chat").importance(0.5).entity(friend))
            .unwrap();
        let q = MemoryQuery::at(Tick(0)).entity(friend);
        let top = store.retrieve(A, &q, 1).unwrap();
        assert_eq!(top.iter().next().unwrap().kind, MemoryKind::Conversation);
    }

    #[test]
    fn custom_relevance_closure() {
        let store = store_with(8);
        store.record(A, obs(0, 0.9)).unwrap();
        store
            .record(A, MemoryDraft::new(MemoryKind::Reflection, Tick(0), "thought").importance(0.1))
            .unwrap();
        let only_reflections =
            |e: &MemoryEntry, _: &MemoryQuery| -> f32 { if e.kind == MemoryKind::Reflection { 1.0 } else { 0.0 } };
        let recall = store.retrieve_with(A, &MemoryQuery::at(Tick(0)), 1, &only_reflections).unwrap();
        assert_eq!(recall.iter().next().unwrap().kind, MemoryKind::Reflection);
    }

    #[test]
    fn does_not_mutate_store() {
        let store = store_with(8);
        store.record(A, obs(0, 0.5)).unwrap();
        let before = store.entries(A).unwrap();
        store.retrieve(A, &MemoryQuery::at(Tick(50)), 10).unwrap();
        assert_eq!(store.entries(A).unwrap(), before);
    }
}

#[cfg(test)]
mod decay {
    use super::*;

    #[test]
    fn half_life_halves_importance() {
        let store = store_with(8);
        store.record(A, obs(0, 0.8)).unwrap();
        let half_life = store.config().half_life_ticks;
        store.decay(Tick(half_life));
        let got = importances(&store, A)[0];
        assert!((got - 0.4).abs() < 1e-5, "got {got}");
        assert!((store.entries(A).unwrap()[0].initial_importance() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn decay_is_monotonic() {
        let store = store_with(8);
        store.record(A, obs(0, 0.9)).unwrap();
        let mut last = 0.9;
        for t in [10, 50, 50, 200, 1_000] {
            store.decay(Tick(t));
            let now = importances(&store, A)[0];
            assert!(now <= last);
            last = now;
        }
        // Decaying at an earlier tick never restores importance.
        store.decay(Tick(5));
        assert!(importances(&store, A)[0] <= last);
    }

    #[test]
    fn evicts_sub_floor_only_when_over_capacity() {
        let mut store = store_with(10);
        for imp in [0.9, 0.01, 0.02, 0.5] {
            store.record(A, obs(0, imp)).unwrap();
        }
        assert_eq!(store.decay(Tick(0)), 0, "within capacity: nothing evicted");

        store.set_capacity(2);
        assert_eq!(store.decay(Tick(0)), 2);
        assert_eq!(importances(&store, A), vec![0.9, 0.5]);
    }

    #[test]
    fn keeps_above_floor_even_when_over_capacity() {
        let mut store = store_with(10);
        for imp in [0.9, 0.8, 0.7] {
            store.record(A, obs(0, imp)).unwrap();
        }
        store.set_capacity(1);
        assert_eq!(store.decay(Tick(0)), 0);
        assert_eq!(store.len(A), 3);
    }
}

#[cfg(test)]
mod restore {
    use super::*;
    use crate::MemoryError;

    #[test]
    fn round_trip_preserves_entries_and_ids() {
        let store = store_with(8);
        store.record(A, obs(0, 0.7)).unwrap();
        store.record(B, obs(1, 0.3)).unwrap();
        store.decay(Tick(40));
        let exported = store.all_entries();
        let next = store.next_id();

        let fresh = store_with(8);
        fresh.restore(exported.clone(), next).unwrap();
        assert_eq!(fresh.all_entries(), exported);
        assert_eq!(fresh.next_id(), next);
        assert_eq!(fresh.record(A, obs(2, 0.5)).unwrap(), next);
    }

    #[test]
    fn entries_export_one_ledger_in_creation_order() {
        let store = store_with(8);
        let first = store.record(A, obs(0, 0.2)).unwrap();
        store.record(B, obs(1, 0.9)).unwrap();
        let second = store.record(A, obs(2, 0.6)).unwrap();

        let ids: Vec<_> = store.entries(A).unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![first, second]);
        assert_eq!(store.entries(CitizenId(9)), Err(MemoryError::InvalidOwner(CitizenId(9))));
    }

    #[test]
    fn unknown_owner_fails() {
        let store = store_with(8);
        store.record(A, obs(0, 0.7)).unwrap();
        let exported = store.all_entries();
        let empty = MemoryStore::new(MemoryConfig::default());
        assert_eq!(
            empty.restore(exported, store.next_id()),
            Err(MemoryError::InvalidOwner(A))
        );
    }
}

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn decay_never_increases_importance(
            importance in 0.0f32..=1.0,
            created in 0u64..500,
            steps in proptest::collection::vec(0u64..2_000, 1..10),
        ) {
            let store = store_with(4);
            store.record(A, obs(created, importance)).unwrap();
            let mut last = importance;
            for now in steps {
                store.decay(Tick(now));
                let current = importances(&store, A)[0];
                prop_assert!(current <= last);
                prop_assert!(current >= 0.0);
                last = current;
            }
        }

        #[test]
        fn store_never_exceeds_capacity(
            capacity in 1usize..6,
            writes in proptest::collection::vec(0.0f32..=1.0, 0..30),
        ) {
            let store = store_with(capacity);
            for (t, imp) in writes.iter().enumerate() {
                store.record(A, obs(t as u64, *imp)).unwrap();
                prop_assert!(store.len(A) <= capacity);
            }
        }
    }
}
