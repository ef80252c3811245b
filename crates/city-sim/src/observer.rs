//! Observer hooks for progress reporting and data collection.

use city_core::Tick;

use crate::summary::{CitizenRecord, TickSummary};

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] and
/// [`Sim::run_ticks`][crate::Sim::run_ticks].
///
/// All methods default to no-ops.
///
/// ```rust,ignore
/// struct IdleWatch;
///
/// impl SimObserver for IdleWatch {
///     fn on_tick_end(&mut self, summary: &TickSummary) {
///         if summary.idle > summary.active / 2 {
///             eprintln!("{}: half the town is idle", summary.tick);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Before the tick is processed; `tick` is the tick about to run.
    fn on_tick_start(&mut self, _tick: Tick) {}

    fn on_tick_end(&mut self, _summary: &TickSummary) {}

    /// Every `config.output_interval_ticks` ticks, after `on_tick_end`.
    /// Rows cover every registered citizen in ascending id order.
    fn on_snapshot(&mut self, _tick: Tick, _citizens: &[CitizenRecord]) {}

    /// Once, when `run` returns normally or after cancellation.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// Ignores every callback.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
