//! `CitizenRegistry`: arena of citizens indexed by `CitizenId`.
//!
//! Slots are allocated monotonically and never reused.  A slot may be empty
//! when citizens were restored with explicit, non-contiguous ids.

use city_core::{CitizenId, CoreError, CoreResult, HouseholdId};
use tracing::debug;

use crate::citizen::{Citizen, CitizenStatus};

#[derive(Clone, Debug, PartialEq)]
struct Slot {
    citizen: Citizen,
    status:  CitizenStatus,
}

/// Largest number of empty slots an explicit id may open above
/// [`CitizenRegistry::next_id`].
pub const MAX_ID_GAP: usize = 1 << 16;

/// Owns every citizen ever created in a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CitizenRegistry {
    slots:  Vec<Option<Slot>>,
    active: usize,
}

impl CitizenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `citizen` under the next free id and return that id.
    ///
    /// Any id already set on `citizen` is overwritten.
    pub fn insert(&mut self, mut citizen: Citizen) -> CitizenId {
        let id = self.next_id();
        citizen.id = id;
        self.slots.push(Some(Slot { citizen, status: CitizenStatus::Active }));
        self.active += 1;
        debug!(citizen = id.0, "citizen registered");
        id
    }

    /// Insert `citizen` under its own `citizen.id` with the given status.
    ///
    /// Fails if the id is the invalid sentinel, already taken, or more than
    /// [`MAX_ID_GAP`] slots past `next_id()`.
    pub fn insert_with_id(&mut self, citizen: Citizen, status: CitizenStatus) -> CoreResult<CitizenId> {
        let id = citizen.id;
        let idx = id.index();
        if !id.is_valid() || idx > self.slots.len() + MAX_ID_GAP {
            return Err(CoreError::InvalidCitizenId(id));
        }
        if idx >= self.slots.len() {
            self.slots.resize_with(idx + 1, || None);
        }
        if self.slots[idx].is_some() {
            return Err(CoreError::DuplicateCitizen(id));
        }
        if status == CitizenStatus::Active {
            self.active += 1;
        }
        self.slots[idx] = Some(Slot { citizen, status });
        Ok(id)
    }

    /// Mark `id` inactive.  Deactivating an inactive citizen is a no-op.
    pub fn deactivate(&mut self, id: CitizenId) -> CoreResult<()> {
        let slot = self.slot_mut(id)?;
        if slot.status == CitizenStatus::Active {
            slot.status = CitizenStatus::Inactive;
            self.active -= 1;
            debug!(citizen = id.0, "citizen deactivated");
        }
        Ok(())
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    pub fn get(&self, id: CitizenId) -> Option<&Citizen> {
        self.slot(id).map(|s| &s.citizen)
    }

    pub fn get_mut(&mut self, id: CitizenId) -> Option<&mut Citizen> {
        self.slot_mut(id).ok().map(|s| &mut s.citizen)
    }

    pub fn status(&self, id: CitizenId) -> Option<CitizenStatus> {
        self.slot(id).map(|s| s.status)
    }

    #[inline]
    pub fn contains(&self, id: CitizenId) -> bool {
        self.slot(id).is_some()
    }

    #[inline]
    pub fn is_active(&self, id: CitizenId) -> bool {
        self.status(id) == Some(CitizenStatus::Active)
    }

    /// The id `insert` would allocate next.  Also the arena length.
    #[inline]
    pub fn next_id(&self) -> CitizenId {
        CitizenId(self.slots.len() as u32)
    }

    /// Arena length (one past the highest id ever allocated).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Registered citizens, active or not.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    // ── Iteration (ascending id) ──────────────────────────────────────────

    pub fn iter(&self) -> impl Iterator<Item = (&Citizen, CitizenStatus)> + '_ {
        self.slots.iter().flatten().map(|s| (&s.citizen, s.status))
    }

    pub fn active_ids(&self) -> Vec<CitizenId> {
        self.iter()
            .filter(|(_, status)| *status == CitizenStatus::Active)
            .map(|(c, _)| c.id)
            .collect()
    }

    /// Registered members of `household`, ascending id.
    pub fn household_members(&self, household: HouseholdId) -> Vec<CitizenId> {
        if !household.is_valid() {
            return Vec::new();
        }
        self.iter()
            .filter(|(c, _)| c.household() == household)
            .map(|(c, _)| c.id)
            .collect()
    }

    /// Number of distinct valid household ids among registered citizens.
    pub fn household_count(&self) -> usize {
        let mut ids: Vec<HouseholdId> = self
            .iter()
            .map(|(c, _)| c.household())
            .filter(|h| h.is_valid())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn slot(&self, id: CitizenId) -> Option<&Slot> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, id: CitizenId) -> CoreResult<&mut Slot> {
        self.slots
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(CoreError::CitizenNotFound(id))
    }
}
