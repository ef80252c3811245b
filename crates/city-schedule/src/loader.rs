//! CSV schedule loader.
//!
//! # CSV format
//!
//! One row per schedule window.  All rows for the same citizen must share the
//! same `cycle_ticks` value.
//!
//! ```csv
//! citizen_id,activity,start_offset_ticks,duration_ticks,destination,cycle_ticks
//! 0,sleep,0,28,home,96
//! 0,commute,30,6,anywhere,96
//! 0,work,36,32,work,96
//! 1,leisure,40,8,12:7,96
//! ```
//!
//! **`destination`** field:
//!
//! | Value      | Meaning                                   |
//! |------------|-------------------------------------------|
//! | `home`     | `Destination::Home` sentinel              |
//! | `work`     | `Destination::Work` sentinel              |
//! | `anywhere` | `Destination::Anywhere`                   |
//! | `x:y`      | `Destination::Location(Position { x, y })`|
//!
//! Citizens absent from the CSV receive an empty `Schedule`.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use city_core::Position;

use crate::activity::{Activity, Destination, Schedule, ScheduleWindow};
use crate::ScheduleError;

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ScheduleRecord {
    citizen_id:         u32,
    activity:           String,
    start_offset_ticks: u32,
    duration_ticks:     u32,
    destination:        String,
    cycle_ticks:        u32,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load per-citizen `Schedule`s from a CSV file.
///
/// Returns a `Vec` of length `citizen_count`, indexed by `CitizenId`.
pub fn load_schedules_csv(path: &Path, citizen_count: usize) -> Result<Vec<Schedule>, ScheduleError> {
    let file = std::fs::File::open(path).map_err(ScheduleError::Io)?;
    load_schedules_reader(file, citizen_count)
}

/// Like [`load_schedules_csv`] but accepts any `Read` source.
pub fn load_schedules_reader<R: Read>(
    reader: R,
    citizen_count: usize,
) -> Result<Vec<Schedule>, ScheduleError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut by_citizen: HashMap<u32, Vec<ScheduleRecord>> = HashMap::new();

    for result in csv_reader.deserialize::<ScheduleRecord>() {
        let row = result.map_err(|e| ScheduleError::Parse(e.to_string()))?;
        if row.citizen_id as usize >= citizen_count {
            return Err(ScheduleError::Parse(format!(
                "citizen_id {} out of range for {citizen_count} citizens",
                row.citizen_id
            )));
        }
        by_citizen.entry(row.citizen_id).or_default().push(row);
    }

    let mut schedules = Vec::with_capacity(citizen_count);
    for i in 0..citizen_count as u32 {
        match by_citizen.remove(&i) {
            None => schedules.push(Schedule::empty()),
            Some(rows) => {
                let cycle_ticks = rows[0].cycle_ticks;
                if rows.iter().any(|r| r.cycle_ticks != cycle_ticks) {
                    return Err(ScheduleError::Parse(format!(
                        "citizen {i}: rows disagree on cycle_ticks"
                    )));
                }
                let windows = rows
                    .into_iter()
                    .map(|r| {
                        let activity = Activity::parse(&r.activity).ok_or_else(|| {
                            ScheduleError::Parse(format!("unknown activity {:?}", r.activity))
                        })?;
                        Ok(ScheduleWindow::new(
                            r.start_offset_ticks,
                            r.duration_ticks,
                            activity,
                            parse_destination(&r.destination)?,
                        ))
                    })
                    .collect::<Result<Vec<_>, ScheduleError>>()?;
                schedules.push(Schedule::new(windows, cycle_ticks));
            }
        }
    }

    Ok(schedules)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_destination(s: &str) -> Result<Destination, ScheduleError> {
    match s.trim() {
        "home"     => Ok(Destination::Home),
        "work"     => Ok(Destination::Work),
        "anywhere" => Ok(Destination::Anywhere),
        other => {
            let parsed = other
                .split_once(':')
                .and_then(|(x, y)| Some(Position::new(x.trim().parse().ok()?, y.trim().parse().ok()?)));
            parsed.map(Destination::Location).ok_or_else(|| {
                ScheduleError::Parse(format!(
                    "invalid destination {other:?}: expected \"home\", \"work\", \"anywhere\", or \"x:y\""
                ))
            })
        }
    }
}
