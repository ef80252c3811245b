//! Population reports: employment mix, household count, per-citizen and
//! per-tile profiles.

use std::collections::BTreeMap;

use city_behavior::{BehaviorState, DecisionOracle};
use city_citizen::{CitizenStatus, Demographics, EmploymentStatus, Personality};
use city_core::{CitizenId, HouseholdId, Position, Tick};
use city_nav::Navigator;
use city_social::RelationshipKind;

use crate::{Sim, SimError, SimResult};

/// A relationship as seen from one side.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tie {
    pub other:            CitizenId,
    pub name:             String,
    pub kind:             RelationshipKind,
    pub affinity:         f32,
    pub interactions:     u32,
    pub last_interaction: Tick,
}

/// Everything known about one citizen.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CitizenReport {
    pub id:           CitizenId,
    pub name:         String,
    pub status:       CitizenStatus,
    pub demographics: Demographics,
    pub personality:  Personality,
    pub position:     Position,
    pub state:        BehaviorState,
    /// Other household members, ascending id.
    pub relatives:    Vec<(CitizenId, String)>,
    /// Strongest ties first, at most `social.neighbor_limit`.
    pub ties:         Vec<Tie>,
    pub memories:     usize,
}

/// Who lives on, works on, and currently stands on one tile.  All lists
/// ascend by id.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileReport {
    pub tile:       Position,
    /// Registered citizens whose home is this tile.
    pub residents:  Vec<CitizenId>,
    /// Distinct households among `residents`.
    pub households: Vec<HouseholdId>,
    /// Registered citizens whose workplace or school is this tile.
    pub workers:    Vec<CitizenId>,
    /// Active citizens on the tile right now.
    pub present:    Vec<CitizenId>,
}

impl TileReport {
    pub fn is_empty(&self) -> bool {
        self.residents.is_empty() && self.workers.is_empty() && self.present.is_empty()
    }
}

impl<O: DecisionOracle, N: Navigator> Sim<O, N> {
    /// Active citizens per employment status.
    pub fn employment_breakdown(&self) -> BTreeMap<EmploymentStatus, usize> {
        let mut out = BTreeMap::new();
        for (citizen, status) in self.registry.iter() {
            if status == CitizenStatus::Active {
                *out.entry(citizen.demographics.employment).or_insert(0) += 1;
            }
        }
        out
    }

    /// Distinct households among registered citizens.
    pub fn household_count(&self) -> usize {
        self.registry.household_count()
    }

    pub fn citizen_report(&self, id: CitizenId) -> SimResult<CitizenReport> {
        let citizen = self.registry.get(id).ok_or(SimError::CitizenNotFound(id))?;
        let status = self.registry.status(id).unwrap_or_default();
        let name_of = |other: CitizenId| {
            self.registry.get(other).map(|c| c.name.clone()).unwrap_or_default()
        };

        let relatives = self
            .registry
            .household_members(citizen.household())
            .into_iter()
            .filter(|&other| other != id)
            .map(|other| (other, name_of(other)))
            .collect();

        let social = self.graph.config();
        let ties = self
            .graph
            .closest(id, social.neighbor_limit, social.min_neighbor_affinity)
            .into_iter()
            .filter_map(|edge| {
                let other = edge.other(id)?;
                Some(Tie {
                    other,
                    name:             name_of(other),
                    kind:             edge.kind,
                    affinity:         edge.affinity,
                    interactions:     edge.interactions,
                    last_interaction: edge.last_interaction,
                })
            })
            .collect();

        Ok(CitizenReport {
            id,
            name:         citizen.name.clone(),
            status,
            demographics: citizen.demographics.clone(),
            personality:  citizen.personality,
            position:     self.positions[id.index()],
            state:        self.states[id.index()].clone(),
            relatives,
            ties,
            memories:     self.memory.len(id),
        })
    }

    /// Active citizens standing on `tile`, ascending id.
    pub fn citizens_at(&self, tile: Position) -> Vec<CitizenId> {
        self.registry
            .active_ids()
            .into_iter()
            .filter(|id| self.positions[id.index()] == tile)
            .collect()
    }

    pub fn tile_report(&self, tile: Position) -> TileReport {
        let mut report = TileReport { tile, present: self.citizens_at(tile), ..TileReport::default() };
        for (citizen, _) in self.registry.iter() {
            if citizen.home == tile {
                report.residents.push(citizen.id);
                let household = citizen.household();
                if household.is_valid() && !report.households.contains(&household) {
                    report.households.push(household);
                }
            }
            if citizen.work == Some(tile) {
                report.workers.push(citizen.id);
            }
        }
        report.households.sort();
        report
    }
}
