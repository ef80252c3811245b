//! Core schedule types: `Activity`, `Destination`, `ScheduleWindow`, `Schedule`.
//!
//! # Destination resolution
//!
//! `Destination::Home` and `Destination::Work` are sentinels resolved per
//! citizen (from the citizen's home/work references) by the behavior engine
//! before anything moves.  A citizen with no work place treats `Work` as home.

use std::fmt;

use city_core::{Position, Tick};

// ── Activity ──────────────────────────────────────────────────────────────────

/// What a citizen intends to be doing during a schedule window.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Activity {
    Sleep,
    Home,
    Commute,
    Work,
    Study,
    Leisure,
}

impl Activity {
    pub fn as_str(self) -> &'static str {
        match self {
            Activity::Sleep   => "sleep",
            Activity::Home    => "home",
            Activity::Commute => "commute",
            Activity::Work    => "work",
            Activity::Study   => "study",
            Activity::Leisure => "leisure",
        }
    }

    /// Parse the lowercase label produced by [`Activity::as_str`].
    pub fn parse(s: &str) -> Option<Activity> {
        Some(match s.trim() {
            "sleep"   => Activity::Sleep,
            "home"    => Activity::Home,
            "commute" => Activity::Commute,
            "work"    => Activity::Work,
            "study"   => Activity::Study,
            "leisure" => Activity::Leisure,
            _ => return None,
        })
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Destination ───────────────────────────────────────────────────────────────

/// Where a citizen should be for a schedule window.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Destination {
    /// A concrete tile.
    Location(Position),
    /// Sentinel: the citizen's home tile.
    Home,
    /// Sentinel: the citizen's work (or school) tile.
    Work,
    /// Stay wherever the citizen currently is (commutes, free time).
    Anywhere,
}

impl Destination {
    /// Resolve sentinels against a citizen's home and optional work tile.
    ///
    /// Returns `None` for `Anywhere`.
    pub fn resolve(self, home: Position, work: Option<Position>) -> Option<Position> {
        match self {
            Destination::Location(p) => Some(p),
            Destination::Home        => Some(home),
            Destination::Work        => Some(work.unwrap_or(home)),
            Destination::Anywhere    => None,
        }
    }
}

// ── ScheduleWindow ────────────────────────────────────────────────────────────

/// One `(time-window, intended-activity)` entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleWindow {
    /// Tick offset from the start of the cycle at which the window opens.
    pub start_offset_ticks: u32,

    /// Window length in ticks.  May run past the end of the cycle, in which
    /// case it wraps into the start of the next one.
    pub duration_ticks: u32,

    pub activity: Activity,

    pub destination: Destination,
}

impl ScheduleWindow {
    pub fn new(start_offset_ticks: u32, duration_ticks: u32, activity: Activity, destination: Destination) -> Self {
        Self { start_offset_ticks, duration_ticks, activity, destination }
    }

    /// Ticks since this window opened, measured cyclically.
    #[inline]
    fn age_at(&self, cycle_pos: u32, cycle_ticks: u32) -> u32 {
        let cycle = u64::from(cycle_ticks);
        ((u64::from(cycle_pos) + cycle - u64::from(self.start_offset_ticks)) % cycle) as u32
    }

    #[inline]
    fn covers(&self, cycle_pos: u32, cycle_ticks: u32) -> bool {
        self.age_at(cycle_pos, cycle_ticks) < self.duration_ticks
    }
}

// ── Schedule ──────────────────────────────────────────────────────────────────

/// A cyclic schedule for one citizen.
///
/// Windows are stored sorted by `start_offset_ticks`, every offset inside
/// the cycle, and the cycle is at least one tick long.  Deserialized
/// schedules go through [`Schedule::new`] and get the same guarantees.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "RawSchedule"))]
pub struct Schedule {
    windows: Vec<ScheduleWindow>,
    /// Length of one cycle in ticks (normally `ticks_per_day`).
    cycle_ticks: u32,
}

/// Wire form of a [`Schedule`] before normalization.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawSchedule {
    windows:     Vec<ScheduleWindow>,
    cycle_ticks: u32,
}

#[cfg(feature = "serde")]
impl From<RawSchedule> for Schedule {
    fn from(raw: RawSchedule) -> Self {
        Schedule::new(raw.windows, raw.cycle_ticks)
    }
}

impl Schedule {
    /// Construct a schedule, sorting `windows` by start offset.
    ///
    /// Offsets at or beyond `cycle_ticks` are folded back into the cycle.
    pub fn new(mut windows: Vec<ScheduleWindow>, cycle_ticks: u32) -> Self {
        let cycle_ticks = cycle_ticks.max(1);
        for w in &mut windows {
            w.start_offset_ticks %= cycle_ticks;
        }
        windows.sort_by_key(|w| w.start_offset_ticks);
        Self { windows, cycle_ticks }
    }

    /// Build a daily schedule from `(start_minute, end_minute, activity,
    /// destination)` tuples, converting minutes to ticks with `ticks_per_day`.
    ///
    /// `end_minute < start_minute` describes a window that runs past midnight.
    pub fn from_minutes(ticks_per_day: u32, spans: &[(u32, u32, Activity, Destination)]) -> Self {
        let ticks_per_day = ticks_per_day.max(1);
        let minutes_per_tick = (city_core::time::MINUTES_PER_DAY / ticks_per_day).max(1);
        let windows = spans
            .iter()
            .map(|&(start, end, activity, destination)| {
                let start_tick = start / minutes_per_tick;
                let end_tick = end.div_ceil(minutes_per_tick);
                let duration = if end_tick > start_tick {
                    end_tick - start_tick
                } else {
                    ticks_per_day - start_tick + end_tick
                };
                ScheduleWindow::new(start_tick, duration.max(1), activity, destination)
            })
            .collect();
        Self::new(windows, ticks_per_day)
    }

    /// A schedule with no windows: the citizen is always on free time.
    pub fn empty() -> Self {
        Self { windows: Vec::new(), cycle_ticks: 1 }
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn windows(&self) -> &[ScheduleWindow] {
        &self.windows
    }

    #[inline]
    pub fn cycle_ticks(&self) -> u32 {
        self.cycle_ticks
    }

    #[inline]
    pub fn cycle_pos(&self, tick: Tick) -> u32 {
        (tick.0 % self.cycle_ticks as u64) as u32
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    /// The window covering `tick`, or `None` during free time.
    pub fn window_at(&self, tick: Tick) -> Option<&ScheduleWindow> {
        self.window_index_at(tick).map(|i| &self.windows[i])
    }

    /// The intended activity at `tick`, if any window covers it.
    pub fn activity_at(&self, tick: Tick) -> Option<Activity> {
        self.window_at(tick).map(|w| w.activity)
    }

    /// `true` if a window ends or begins at `tick`.
    ///
    /// Tick zero is never a boundary: there is no previous window to end.
    pub fn is_boundary(&self, tick: Tick) -> bool {
        let Some(prev) = tick.prev() else {
            return false;
        };
        let now_idx = self.window_index_at(tick);
        if now_idx != self.window_index_at(prev) {
            return true;
        }
        // Same window index, but a fresh occurrence of it (e.g. a window that
        // covers the whole cycle restarting at its offset).
        let pos = self.cycle_pos(tick);
        now_idx.is_some_and(|i| self.windows[i].start_offset_ticks == pos)
    }

    /// The first boundary strictly after `tick`, searching at most one cycle
    /// ahead.  `None` for schedules that never change.
    pub fn next_boundary(&self, tick: Tick) -> Option<Tick> {
        (1..=self.cycle_ticks as u64)
            .map(|n| tick + n)
            .find(|&t| self.is_boundary(t))
    }

    // ── Private helpers ───────────────────────────────────────────────────

    /// Among windows covering the cycle position, the one opened most recently.
    fn window_index_at(&self, tick: Tick) -> Option<usize> {
        let pos = self.cycle_pos(tick);
        self.windows
            .iter()
            .enumerate()
            .filter(|(_, w)| w.covers(pos, self.cycle_ticks))
            .min_by_key(|(i, w)| (w.age_at(pos, self.cycle_ticks), std::cmp::Reverse(*i)))
            .map(|(i, _)| i)
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::empty()
    }
}
