//! `city-schedule` — citizen daily schedules and CSV loading.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`activity`]  | `Activity`, `Destination`, `ScheduleWindow`, `Schedule`   |
//! | [`loader`]    | `load_schedules_csv`, `load_schedules_reader`             |
//! | [`error`]     | `ScheduleError`, `ScheduleResult<T>`                      |
//!
//! # Window model (summary)
//!
//! A `Schedule` is an ordered list of `(time-window, intended-activity)` pairs
//! repeating every `cycle_ticks` (normally one simulated day).  At tick `t`:
//!
//! ```text
//! cycle_pos      = t.0 % cycle_ticks
//! current window = the most recently started window still covering cycle_pos
//! boundary at t  = the covering window differs from the one at t - 1,
//!                  or a window (re)starts exactly at cycle_pos
//! ```
//!
//! Gaps between windows are free time: no window covers them.

pub mod activity;
pub mod error;
pub mod loader;

#[cfg(test)]
mod tests;

pub use activity::{Activity, Destination, Schedule, ScheduleWindow};
pub use error::{ScheduleError, ScheduleResult};
pub use loader::{load_schedules_csv, load_schedules_reader};
