//! `city-core` — foundational types for the city simulation kernel.
//!
//! This crate is a dependency of every other `city-*` crate.  It has no
//! `city-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `CitizenId`, `MemoryId`, `HouseholdId`                |
//! | [`geo`]         | `Position` (tile coordinates), Manhattan distance     |
//! | [`time`]        | `Tick`, `Clock`, `Phase`                              |
//! | [`config`]      | `KernelConfig` and its per-component sections         |
//! | [`rng`]         | `SimRng` (seeded, deterministic)                      |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required by `city-sim` snapshots.                          |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{KernelConfig, MemoryConfig, OracleConfig, SocialConfig};
pub use error::{CoreError, CoreResult};
pub use geo::Position;
pub use ids::{CitizenId, HouseholdId, MemoryId};
pub use rng::SimRng;
pub use time::{Clock, Phase, Tick};
