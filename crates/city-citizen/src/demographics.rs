//! Demographic attributes and profession working hours.

use std::fmt;

use city_core::time::MINUTES_PER_DAY;
use city_schedule::{Activity, Destination, Schedule};

/// Generates `as_str` / `Display` for a fieldless enum with lowercase labels.
macro_rules! labelled_enum {
    ($(#[$attr:meta])* pub enum $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$attr])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

labelled_enum! {
    pub enum Gender {
        Male   => "male",
        Female => "female",
    }
}

labelled_enum! {
    pub enum AgeGroup {
        Child => "child",
        Teen  => "teen",
        Adult => "adult",
        Elder => "elder",
    }
}

labelled_enum! {
    pub enum EmploymentStatus {
        Student    => "student",
        Employed   => "employed",
        Unemployed => "unemployed",
        Retired    => "retired",
    }
}

labelled_enum! {
    pub enum Profession {
        Office     => "office",
        Retail     => "retail",
        Industrial => "industrial",
        Service    => "service",
        Student    => "student",
        None       => "none",
    }
}

labelled_enum! {
    /// Coarse position in a working citizen's day, derived from wall-clock minutes.
    pub enum DailyStage {
        Home          => "home",
        CommuteToWork => "commute_to_work",
        Work          => "work",
        CommuteHome   => "commute_home",
        OffDuty       => "off_duty",
    }
}

// ── WorkHours ─────────────────────────────────────────────────────────────────

/// Hour used for lights-out in generated schedules.
const BEDTIME_MINUTE: u32 = 22 * 60;

/// A working (or school) day, in minutes since midnight.
///
/// `commute_start <= work_start <= work_end <= commute_end` always holds for
/// the values produced by [`WorkHours::for_profession`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkHours {
    pub commute_start: u32,
    pub work_start:    u32,
    pub work_end:      u32,
    pub commute_end:   u32,
}

impl WorkHours {
    pub const fn new(commute_start: u32, work_start: u32, work_end: u32, commute_end: u32) -> Self {
        Self { commute_start, work_start, work_end, commute_end }
    }

    /// Default hours for `profession`; `None` for citizens without one.
    pub fn for_profession(profession: Profession) -> Option<WorkHours> {
        let hours = match profession {
            Profession::Office     => Self::new(7 * 60 + 30, 9 * 60, 17 * 60, 18 * 60),
            Profession::Retail     => Self::new(9 * 60, 10 * 60, 19 * 60, 20 * 60),
            Profession::Industrial => Self::new(5 * 60 + 30, 6 * 60 + 30, 15 * 60, 16 * 60),
            Profession::Service    => Self::new(7 * 60 + 30, 8 * 60, 18 * 60, 19 * 60),
            Profession::Student    => Self::new(7 * 60 + 15, 8 * 60, 15 * 60, 16 * 60),
            Profession::None       => return None,
        };
        Some(hours)
    }

    /// Stage of the day at `minute` (taken modulo one day).
    pub fn stage_at(&self, minute: u32) -> DailyStage {
        let m = minute % MINUTES_PER_DAY;
        if m < self.commute_start {
            DailyStage::Home
        } else if m < self.work_start {
            DailyStage::CommuteToWork
        } else if m < self.work_end {
            DailyStage::Work
        } else if m < self.commute_end {
            DailyStage::CommuteHome
        } else {
            DailyStage::OffDuty
        }
    }

    /// Expand into a daily schedule: sleep, commute, work (or study), commute
    /// home, leisure until bedtime.
    pub fn to_schedule(&self, ticks_per_day: u32, on_duty: Activity) -> Schedule {
        let evening_end = BEDTIME_MINUTE.max(self.commute_end);
        let spans: Vec<_> = [
            (evening_end, self.commute_start, Activity::Sleep, Destination::Home),
            (self.commute_start, self.work_start, Activity::Commute, Destination::Anywhere),
            (self.work_start, self.work_end, on_duty, Destination::Work),
            (self.work_end, self.commute_end, Activity::Commute, Destination::Anywhere),
            (self.commute_end, evening_end, Activity::Leisure, Destination::Anywhere),
        ]
        .into_iter()
        .filter(|&(start, end, _, _)| start != end)
        .collect();
        Schedule::from_minutes(ticks_per_day, &spans)
    }
}

/// Schedule for citizens with no working hours: sleep overnight, home by day.
pub fn home_schedule(ticks_per_day: u32) -> Schedule {
    Schedule::from_minutes(
        ticks_per_day,
        &[
            (BEDTIME_MINUTE, 7 * 60, Activity::Sleep, Destination::Home),
            (7 * 60, BEDTIME_MINUTE, Activity::Home, Destination::Home),
        ],
    )
}
