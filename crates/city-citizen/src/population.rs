//! Seeded generation of a town population.
//!
//! # Usage
//!
//! ```rust
//! use city_citizen::{PopulationBuilder, TownPlan};
//! use city_core::Position;
//!
//! let plan = TownPlan {
//!     residential: (0..20).map(|x| Position::new(x, 0)).collect(),
//!     offices:     vec![Position::new(5, 5)],
//!     ..TownPlan::default()
//! };
//! let population = PopulationBuilder::new(plan)
//!     .target_population(30)
//!     .seed(7)
//!     .build();
//!
//! assert!(population.citizens.len() <= 30);
//! ```
//!
//! Each residential tile houses one household of one or two adults (elders
//! are retired), plus a child or teen with probability 0.35.  Working-age
//! adults draw from a shuffled pool of job slots; once the pool is empty
//! the rest are unemployed.  Children draw from school slots.

use std::iter::Cycle;
use std::{array, slice};

use city_core::{CitizenId, HouseholdId, Position, SimRng};
use city_schedule::Activity;
use tracing::info;

use crate::citizen::{Citizen, Demographics, Personality};
use crate::demographics::{home_schedule, AgeGroup, EmploymentStatus, Gender, Profession, WorkHours};

const OFFICE_SLOTS:     usize = 4;
const RETAIL_SLOTS:     usize = 3;
const INDUSTRIAL_SLOTS: usize = 5;
/// Every `SERVICE_OFFICE_STRIDE`-th office also employs service staff.
const SERVICE_OFFICE_STRIDE: usize = 6;
const SERVICE_SLOTS:    usize = 3;
const SCHOOL_SLOTS:     usize = 8;

const ELDER_PROBABILITY:      f64 = 0.15;
const DEPENDENT_PROBABILITY:  f64 = 0.35;
const CHILD_VS_TEEN:          f64 = 0.6;

const FIRST_NAMES: &[&str] = &[
    "Ava", "Noah", "Liam", "Emma", "Olivia", "Mason", "Sophia", "Ethan", "Isabella", "Logan",
    "Mia", "Lucas", "Charlotte", "Amelia", "Harper", "Evelyn", "James", "Benjamin", "Henry",
    "Grace", "Lily", "Chloe", "Victoria", "Aiden", "Ella", "Scarlett", "Natalie", "Hannah", "Levi",
];

// ── Inputs / outputs ──────────────────────────────────────────────────────────

/// Tiles of the town grouped by use.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TownPlan {
    pub residential: Vec<Position>,
    pub offices:     Vec<Position>,
    pub shops:       Vec<Position>,
    pub factories:   Vec<Position>,
    pub schools:     Vec<Position>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Household {
    pub id:      HouseholdId,
    pub home:    Position,
    pub members: Vec<CitizenId>,
}

/// Generated citizens with ids `0..n` in order, plus their households.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Population {
    pub citizens:   Vec<Citizen>,
    pub households: Vec<Household>,
}

// ── PopulationBuilder ─────────────────────────────────────────────────────────

pub struct PopulationBuilder {
    plan:          TownPlan,
    target:        usize,
    seed:          u64,
    ticks_per_day: u32,
}

impl PopulationBuilder {
    pub fn new(plan: TownPlan) -> Self {
        Self { plan, target: 150, seed: 1337, ticks_per_day: 96 }
    }

    /// Upper bound on generated citizens (at least 1).
    pub fn target_population(mut self, n: usize) -> Self {
        self.target = n.max(1);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Tick resolution used to convert working hours into schedules.
    pub fn ticks_per_day(mut self, ticks_per_day: u32) -> Self {
        self.ticks_per_day = ticks_per_day;
        self
    }

    pub fn build(self) -> Population {
        let mut rng = SimRng::new(self.seed);
        let mut homes = self.plan.residential.clone();
        rng.shuffle(&mut homes);
        let mut job_slots = self.job_slots(&mut rng);
        let mut school_slots = self.school_slots(&mut rng);

        let mut town = Generator {
            citizens:      Vec::new(),
            households:    Vec::new(),
            names:         FIRST_NAMES.iter().cycle(),
            genders:       [Gender::Male, Gender::Female].into_iter().cycle(),
            ticks_per_day: self.ticks_per_day,
        };

        for home in homes {
            if town.citizens.len() >= self.target {
                break;
            }
            let household = HouseholdId(town.households.len() as u32);
            let mut members = Vec::new();

            let adults = rng.gen_range(1..=2);
            for _ in 0..adults {
                if town.citizens.len() >= self.target {
                    break;
                }
                let age_group = if rng.gen_bool(ELDER_PROBABILITY) { AgeGroup::Elder } else { AgeGroup::Adult };
                let (employment, profession, work) = match age_group {
                    AgeGroup::Elder => (EmploymentStatus::Retired, Profession::None, None),
                    _ => match job_slots.pop() {
                        Some((tile, profession)) => (EmploymentStatus::Employed, profession, Some(tile)),
                        None => (EmploymentStatus::Unemployed, Profession::None, None),
                    },
                };
                members.push(town.spawn(&mut rng, household, home, age_group, employment, profession, work));
            }

            if town.citizens.len() < self.target && rng.gen_bool(DEPENDENT_PROBABILITY) {
                let age_group = if rng.gen_bool(CHILD_VS_TEEN) { AgeGroup::Child } else { AgeGroup::Teen };
                let school = school_slots.pop();
                members.push(town.spawn(
                    &mut rng,
                    household,
                    home,
                    age_group,
                    EmploymentStatus::Student,
                    Profession::Student,
                    school,
                ));
            }

            town.households.push(Household { id: household, home, members });
        }

        info!(
            citizens = town.citizens.len(),
            households = town.households.len(),
            seed = self.seed,
            "population generated"
        );
        Population { citizens: town.citizens, households: town.households }
    }

    // ── Slot pools ────────────────────────────────────────────────────────

    fn job_slots(&self, rng: &mut SimRng) -> Vec<(Position, Profession)> {
        let mut slots = Vec::new();
        let mut add = |tiles: &[Position], profession: Profession, n: usize| {
            for &tile in tiles {
                slots.extend(std::iter::repeat_n((tile, profession), n));
            }
        };
        add(&self.plan.offices, Profession::Office, OFFICE_SLOTS);
        add(&self.plan.shops, Profession::Retail, RETAIL_SLOTS);
        add(&self.plan.factories, Profession::Industrial, INDUSTRIAL_SLOTS);
        let service_offices: Vec<Position> =
            self.plan.offices.iter().copied().step_by(SERVICE_OFFICE_STRIDE).collect();
        add(&service_offices, Profession::Service, SERVICE_SLOTS);
        rng.shuffle(&mut slots);
        slots
    }

    fn school_slots(&self, rng: &mut SimRng) -> Vec<Position> {
        let mut slots: Vec<Position> = self
            .plan
            .schools
            .iter()
            .flat_map(|&tile| std::iter::repeat_n(tile, SCHOOL_SLOTS))
            .collect();
        rng.shuffle(&mut slots);
        slots
    }
}

// ── Generator state ───────────────────────────────────────────────────────────

struct Generator {
    citizens:      Vec<Citizen>,
    households:    Vec<Household>,
    names:         Cycle<slice::Iter<'static, &'static str>>,
    genders:       Cycle<array::IntoIter<Gender, 2>>,
    ticks_per_day: u32,
}

impl Generator {
    #[allow(clippy::too_many_arguments)]
    fn spawn(
        &mut self,
        rng: &mut SimRng,
        household: HouseholdId,
        home: Position,
        age_group: AgeGroup,
        employment: EmploymentStatus,
        profession: Profession,
        work: Option<Position>,
    ) -> CitizenId {
        let id = CitizenId(self.citizens.len() as u32);
        let work_hours = WorkHours::for_profession(profession);
        let on_duty = if profession == Profession::Student { Activity::Study } else { Activity::Work };
        let schedule = match work_hours {
            Some(hours) => hours.to_schedule(self.ticks_per_day, on_duty),
            None => home_schedule(self.ticks_per_day),
        };
        let demographics = Demographics {
            gender: self.genders.next().unwrap_or(Gender::Female),
            age_group,
            employment,
            profession,
            household,
            work_hours,
        };
        self.citizens.push(Citizen {
            id,
            name: self.names.next().map_or("Citizen", |n| *n).to_string(),
            demographics,
            personality: Personality::random(rng),
            home,
            work,
            schedule,
        });
        id
    }
}
