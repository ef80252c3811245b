//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically increasing `Tick` counter.  A simulated day is
//! split into `ticks_per_day` equal ticks, so
//!
//!   day          = tick / ticks_per_day
//!   minute_of_day = (tick % ticks_per_day) * (1440 / ticks_per_day)
//!
//! Using an integer tick as the canonical unit keeps all schedule arithmetic
//! exact.  The clock is an explicit value owned by the population manager and
//! passed by reference; there is no ambient global time, so several
//! independent runs can coexist in one process.

use std::fmt;

use crate::KernelConfig;

/// Minutes in one simulated day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// The previous tick, or `None` at tick zero.
    #[inline]
    pub fn prev(self) -> Option<Tick> {
        self.0.checked_sub(1).map(Tick)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── Phase ─────────────────────────────────────────────────────────────────────

/// Coarse day/night split derived from the hour of day.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    Day,
    Night,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Day   => "day",
            Phase::Night => "night",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Clock ─────────────────────────────────────────────────────────────────────

/// Owns the logical tick counter and derives day index and phase from it.
///
/// `advance` is the only mutation; every other method is a pure read.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Clock {
    ticks_per_day:    u32,
    day_start_hour:   u32,
    night_start_hour: u32,
    current_tick:     Tick,
}

impl Clock {
    /// Create a clock at tick zero.
    ///
    /// `ticks_per_day` must divide 1440 for minute arithmetic to stay exact;
    /// [`KernelConfig::validate`] enforces this for configured runs.
    pub fn new(ticks_per_day: u32, day_start_hour: u32, night_start_hour: u32) -> Self {
        Self {
            ticks_per_day: ticks_per_day.max(1),
            day_start_hour,
            night_start_hour,
            current_tick: Tick::ZERO,
        }
    }

    /// Clock configured from `config`, positioned at tick zero.
    pub fn from_config(config: &KernelConfig) -> Self {
        Self::new(config.ticks_per_day, config.day_start_hour, config.night_start_hour)
    }

    /// Same configuration, positioned at `tick` (used when resuming a snapshot).
    pub fn at(mut self, tick: Tick) -> Self {
        self.current_tick = tick;
        self
    }

    /// Increment the tick counter and return the new tick.
    #[inline]
    pub fn advance(&mut self) -> Tick {
        self.current_tick = Tick(self.current_tick.0 + 1);
        self.current_tick
    }

    #[inline]
    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    #[inline]
    pub fn ticks_per_day(&self) -> u32 {
        self.ticks_per_day
    }

    /// Zero-based simulated day of the current tick.
    #[inline]
    pub fn day_index(&self) -> u64 {
        self.day_of(self.current_tick)
    }

    /// Day/night phase of the current tick.
    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase_of(self.current_tick)
    }

    /// Hour of day (0–23) of the current tick.
    #[inline]
    pub fn hour_of_day(&self) -> u32 {
        self.minute_of_day(self.current_tick) / 60
    }

    /// Minute within the hour (0–59) of the current tick.
    #[inline]
    pub fn minute_of_hour(&self) -> u32 {
        self.minute_of_day(self.current_tick) % 60
    }

    /// `true` if the current tick is the first tick of a new day.
    #[inline]
    pub fn is_day_start(&self) -> bool {
        self.tick_of_day(self.current_tick) == 0
    }

    // ── Derivations for arbitrary ticks ───────────────────────────────────

    #[inline]
    pub fn day_of(&self, tick: Tick) -> u64 {
        tick.0 / self.ticks_per_day as u64
    }

    #[inline]
    pub fn tick_of_day(&self, tick: Tick) -> u32 {
        (tick.0 % self.ticks_per_day as u64) as u32
    }

    #[inline]
    pub fn minute_of_day(&self, tick: Tick) -> u32 {
        self.tick_of_day(tick) * self.minutes_per_tick()
    }

    pub fn phase_of(&self, tick: Tick) -> Phase {
        let hour = self.minute_of_day(tick) / 60;
        if hour >= self.day_start_hour && hour < self.night_start_hour {
            Phase::Day
        } else {
            Phase::Night
        }
    }

    #[inline]
    pub fn minutes_per_tick(&self) -> u32 {
        (MINUTES_PER_DAY / self.ticks_per_day).max(1)
    }

    // ── Tick-count helpers ────────────────────────────────────────────────

    /// How many ticks span `minutes`? (rounds up)
    #[inline]
    pub fn ticks_for_minutes(&self, minutes: u32) -> u32 {
        minutes.div_ceil(self.minutes_per_tick())
    }

    #[inline]
    pub fn ticks_for_hours(&self, hours: u32) -> u32 {
        self.ticks_for_minutes(hours * 60)
    }

    /// Twelve-hour wall-clock rendering of the current tick, e.g. `08:30 AM`.
    pub fn formatted_time(&self) -> String {
        let hour = self.hour_of_day();
        let suffix = if hour < 12 { "AM" } else { "PM" };
        let display_hour = match hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{:02}:{:02} {}", display_hour, self.minute_of_hour(), suffix)
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (day {} {:02}:{:02}, {})",
            self.current_tick,
            self.day_index(),
            self.hour_of_day(),
            self.minute_of_hour(),
            self.phase(),
        )
    }
}
