//! `city-sim` — the population manager and tick loop of the city kernel.
//!
//! # Tick loop
//!
//! ```text
//! step():
//!   ① Advance     — clock.advance(); snapshot the active set (ascending id).
//!   ② Evaluate    — BehaviorEngine::evaluate per citizen; citizens that must
//!                   decide get a DecisionContext (parallel with `parallel`).
//!   ③ Consult     — oracle calls on the owned Tokio runtime, bounded by a
//!                   semaphore and a per-call timeout, abandoned on cancel.
//!   ④ Reconcile   — ascending id: navigation first, then position, state,
//!                   memories, and relationship edges.
//!   ⑤ Decay       — MemoryStore::decay; reflections on day rollover.
//! ```
//!
//! # Crate layout
//!
//! | Module       | Contents                                               |
//! |--------------|--------------------------------------------------------|
//! | [`sim`]      | `Sim`: tick loop, population, accessors, snapshots     |
//! | [`builder`]  | `SimBuilder` (fresh runs and `from_snapshot`)          |
//! | [`summary`]  | `TickSummary`, `CitizenRecord`                         |
//! | [`snapshot`] | `KernelSnapshot`, `CitizenSnapshot`                    |
//! | [`report`]   | `CitizenReport`, `TileReport`, employment/household    |
//! | [`observer`] | `SimObserver`, `NoopObserver`                          |
//! | [`cancel`]   | `CancelHandle`                                         |
//! | [`error`]    | `SimError`, `SimResult<T>`                             |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the evaluate phase on Rayon's thread pool.        |
//! | `serde`    | Serde derives on snapshots, summaries, and reports.    |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use city_behavior::ScheduleFollowingOracle;
//! use city_citizen::PopulationBuilder;
//! use city_core::KernelConfig;
//! use city_sim::{NoopObserver, SimBuilder};
//!
//! let config = KernelConfig::default();
//! let population = PopulationBuilder::new(plan).seed(config.seed).build();
//! let mut sim = SimBuilder::new(config, ScheduleFollowingOracle::default())
//!     .population(population)
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod cancel;
pub mod error;
pub mod observer;
pub mod report;
pub mod sim;
pub mod snapshot;
pub mod summary;


pub use builder::SimBuilder;
pub use cancel::CancelHandle;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use report::{CitizenReport, Tie, TileReport};
pub use sim::Sim;
pub use snapshot::{CitizenSnapshot, KernelSnapshot};
pub use summary::{CitizenRecord, TickSummary};
