//! `city-citizen` — citizen records, the registry arena, and population
//! generation.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                      |
//! |-------------------|---------------------------------------------------------------|
//! | [`demographics`]  | `Gender`, `AgeGroup`, `EmploymentStatus`, `Profession`, `DailyStage`, `WorkHours` |
//! | [`citizen`]       | `Citizen`, `Demographics`, `Personality`, `CitizenStatus`     |
//! | [`registry`]      | `CitizenRegistry` (arena indexed by `CitizenId`)              |
//! | [`population`]    | `PopulationBuilder`, `TownPlan`, `Population`, `Household`    |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                  |
//! |---------|---------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on all public types.  |

pub mod citizen;
pub mod demographics;
pub mod population;
pub mod registry;


pub use citizen::{Citizen, CitizenStatus, Demographics, Personality};
pub use demographics::{home_schedule, AgeGroup, DailyStage, EmploymentStatus, Gender, Profession, WorkHours};
pub use population::{Household, Population, PopulationBuilder, TownPlan};
pub use registry::{CitizenRegistry, MAX_ID_GAP};
