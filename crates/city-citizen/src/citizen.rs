//! The `Citizen` record and its lifecycle status.

use city_core::{CitizenId, HouseholdId, Position, SimRng};
use city_schedule::Schedule;

use crate::demographics::{AgeGroup, DailyStage, EmploymentStatus, Gender, Profession, WorkHours};

// ── Personality ───────────────────────────────────────────────────────────────

/// Fixed personality sliders, each in `[0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Personality {
    pub sociability:   f32,
    pub diligence:     f32,
    pub curiosity:     f32,
    pub agreeableness: f32,
}

impl Personality {
    /// Construct with every slider clamped into `[0, 1]`.
    pub fn new(sociability: f32, diligence: f32, curiosity: f32, agreeableness: f32) -> Self {
        Self {
            sociability:   sociability.clamp(0.0, 1.0),
            diligence:     diligence.clamp(0.0, 1.0),
            curiosity:     curiosity.clamp(0.0, 1.0),
            agreeableness: agreeableness.clamp(0.0, 1.0),
        }
    }

    /// All sliders at the midpoint.
    pub fn neutral() -> Self {
        Self::new(0.5, 0.5, 0.5, 0.5)
    }

    pub fn random(rng: &mut SimRng) -> Self {
        Self::new(rng.random(), rng.random(), rng.random(), rng.random())
    }
}

impl Default for Personality {
    fn default() -> Self {
        Self::neutral()
    }
}

// ── Demographics ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Demographics {
    pub gender:     Gender,
    pub age_group:  AgeGroup,
    pub employment: EmploymentStatus,
    pub profession: Profession,
    pub household:  HouseholdId,
    /// Working or school hours; `None` for citizens who stay home.
    pub work_hours: Option<WorkHours>,
}

impl Default for Demographics {
    fn default() -> Self {
        Self {
            gender:     Gender::Female,
            age_group:  AgeGroup::Adult,
            employment: EmploymentStatus::Unemployed,
            profession: Profession::None,
            household:  HouseholdId::INVALID,
            work_hours: None,
        }
    }
}

// ── Citizen ───────────────────────────────────────────────────────────────────

/// Static description of one citizen.
///
/// Everything that changes tick to tick (position, behavior state, status)
/// lives in arenas owned by the population manager, indexed by `id`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Citizen {
    pub id:           CitizenId,
    pub name:         String,
    pub demographics: Demographics,
    pub personality:  Personality,
    pub home:         Position,
    /// Workplace or school tile.
    pub work:         Option<Position>,
    pub schedule:     Schedule,
}

impl Citizen {
    /// A citizen living at `home` with default demographics and an empty
    /// schedule.  The id is assigned by the registry on insert.
    pub fn new(name: impl Into<String>, home: Position) -> Self {
        Self {
            id:           CitizenId::INVALID,
            name:         name.into(),
            demographics: Demographics::default(),
            personality:  Personality::neutral(),
            home,
            work:         None,
            schedule:     Schedule::empty(),
        }
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_work(mut self, work: Position) -> Self {
        self.work = Some(work);
        self
    }

    pub fn with_personality(mut self, personality: Personality) -> Self {
        self.personality = personality;
        self
    }

    pub fn with_demographics(mut self, demographics: Demographics) -> Self {
        self.demographics = demographics;
        self
    }

    #[inline]
    pub fn household(&self) -> HouseholdId {
        self.demographics.household
    }

    /// Stage of the working day at `minute_of_day`; always `Home` for
    /// citizens without working hours.
    pub fn daily_stage(&self, minute_of_day: u32) -> DailyStage {
        self.demographics
            .work_hours
            .map_or(DailyStage::Home, |h| h.stage_at(minute_of_day))
    }
}

// ── CitizenStatus ─────────────────────────────────────────────────────────────

/// Lifecycle status.  Inactive citizens are retained for audit but skipped by
/// the tick loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CitizenStatus {
    #[default]
    Active,
    Inactive,
}
