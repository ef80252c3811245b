//! Unit tests for city-schedule.

use city_core::{Position, Tick};

use crate::{Activity, Destination, Schedule, ScheduleWindow};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn win(start: u32, dur: u32, activity: Activity) -> ScheduleWindow {
    ScheduleWindow::new(start, dur, activity, Destination::Home)
}

/// 24-tick cycle (1 tick = 1 hour): sleep 0–7, work 9–17, leisure 18–22.
/// Gaps at 7–9, 17–18 and 22–24 are free time.
fn daily() -> Schedule {
    Schedule::new(
        vec![win(9, 8, Activity::Work), win(0, 7, Activity::Sleep), win(18, 4, Activity::Leisure)],
        24,
    )
}

#[cfg(test)]
mod schedule {
    use super::*;

    #[test]
    fn new_sorts_by_start_offset() {
        let offsets: Vec<u32> = daily().windows().iter().map(|w| w.start_offset_ticks).collect();
        assert_eq!(offsets, vec![0, 9, 18]);
    }

    #[test]
    fn empty_schedule() {
        let s = Schedule::empty();
        assert!(s.is_empty());
        assert!(s.window_at(Tick(5)).is_none());
        assert!(!s.is_boundary(Tick(5)));
        assert_eq!(s.next_boundary(Tick(0)), None);
    }

    #[test]
    fn window_lookup_and_gaps() {
        let s = daily();
        assert_eq!(s.activity_at(Tick(0)), Some(Activity::Sleep));
        assert_eq!(s.activity_at(Tick(6)), Some(Activity::Sleep));
        assert_eq!(s.activity_at(Tick(7)), None);
        assert_eq!(s.activity_at(Tick(12)), Some(Activity::Work));
        assert_eq!(s.activity_at(Tick(17)), None);
        assert_eq!(s.activity_at(Tick(24 + 19)), Some(Activity::Leisure));
    }

    #[test]
    fn boundaries_at_window_edges() {
        let s = daily();
        assert!(!s.is_boundary(Tick(0)), "tick zero has no previous window");
        assert!(!s.is_boundary(Tick(3)));
        assert!(s.is_boundary(Tick(7)), "sleep ends");
        assert!(s.is_boundary(Tick(9)), "work starts");
        assert!(!s.is_boundary(Tick(10)));
        assert!(s.is_boundary(Tick(17)), "work ends");
        assert!(s.is_boundary(Tick(24)), "sleep starts next day");
    }

    #[test]
    fn next_boundary_search() {
        let s = daily();
        assert_eq!(s.next_boundary(Tick(10)), Some(Tick(17)));
        assert_eq!(s.next_boundary(Tick(22)), Some(Tick(24)));
    }

    #[test]
    fn wrapping_window_covers_midnight() {
        // Sleep 22:00 → 06:00 expressed as one 8-tick window.
        let s = Schedule::new(vec![win(22, 8, Activity::Sleep)], 24);
        assert_eq!(s.activity_at(Tick(23)), Some(Activity::Sleep));
        assert_eq!(s.activity_at(Tick(24 + 3)), Some(Activity::Sleep));
        assert_eq!(s.activity_at(Tick(6)), None);
        assert!(s.is_boundary(Tick(6)));
        assert!(s.is_boundary(Tick(22)));
    }

    #[test]
    fn full_cycle_window_restarts_each_cycle() {
        let s = Schedule::new(vec![win(0, 24, Activity::Home)], 24);
        assert!(!s.is_boundary(Tick(12)));
        assert!(s.is_boundary(Tick(24)));
    }

    #[test]
    fn later_window_wins_on_overlap() {
        let s = Schedule::new(vec![win(0, 12, Activity::Home), win(4, 2, Activity::Leisure)], 24);
        assert_eq!(s.activity_at(Tick(3)), Some(Activity::Home));
        assert_eq!(s.activity_at(Tick(4)), Some(Activity::Leisure));
        assert_eq!(s.activity_at(Tick(6)), Some(Activity::Home));
    }

    #[test]
    fn from_minutes_converts_to_ticks() {
        // 96 ticks/day → 15 minutes per tick.
        let s = Schedule::from_minutes(
            96,
            &[
                (9 * 60, 17 * 60, Activity::Work, Destination::Work),
                (22 * 60, 6 * 60, Activity::Sleep, Destination::Home),
            ],
        );
        assert_eq!(s.cycle_ticks(), 96);
        let work = &s.windows()[0];
        assert_eq!(work.start_offset_ticks, 36);
        assert_eq!(work.duration_ticks, 32);
        let sleep = &s.windows()[1];
        assert_eq!(sleep.start_offset_ticks, 88);
        assert_eq!(sleep.duration_ticks, 32);
    }
}

#[cfg(all(test, feature = "serde"))]
mod wire {
    use super::*;

    #[test]
    fn zero_cycle_is_normalized_on_load() {
        let s: Schedule = serde_json::from_str(r#"{"windows":[],"cycle_ticks":0}"#).unwrap();
        assert_eq!(s.cycle_ticks(), 1);
        assert!(!s.is_boundary(Tick(5)));
        assert_eq!(s.activity_at(Tick(5)), None);
    }

    #[test]
    fn out_of_cycle_offsets_are_folded_and_sorted() {
        let json = r#"{
            "windows": [
                {"start_offset_ticks": 30, "duration_ticks": 2, "activity": "Work", "destination": "Home"},
                {"start_offset_ticks": 1, "duration_ticks": 1, "activity": "Sleep", "destination": "Home"}
            ],
            "cycle_ticks": 24
        }"#;
        let s: Schedule = serde_json::from_str(json).unwrap();
        let offsets: Vec<u32> = s.windows().iter().map(|w| w.start_offset_ticks).collect();
        assert_eq!(offsets, vec![1, 6]);
        assert_eq!(s.activity_at(Tick(7)), Some(Activity::Work));
        assert!(s.is_boundary(Tick(6)));
    }

    #[test]
    fn round_trip_keeps_schedule() {
        let s = daily();
        let back: Schedule = serde_json::from_str(&serde_json::to_string(&s).unwrap()).unwrap();
        assert_eq!(back, s);
    }
}

#[cfg(test)]
mod destination {
    use super::*;

    #[test]
    fn resolves_sentinels() {
        let home = Position::new(1, 1);
        let work = Position::new(5, 5);
        assert_eq!(Destination::Home.resolve(home, Some(work)), Some(home));
        assert_eq!(Destination::Work.resolve(home, Some(work)), Some(work));
        assert_eq!(Destination::Work.resolve(home, None), Some(home));
        assert_eq!(Destination::Anywhere.resolve(home, Some(work)), None);
        let p = Position::new(9, 2);
        assert_eq!(Destination::Location(p).resolve(home, None), Some(p));
    }

    #[test]
    fn activity_labels_round_trip() {
        for a in [Activity::Sleep, Activity::Home, Activity::Commute, Activity::Work, Activity::Study, Activity::Leisure] {
            assert_eq!(Activity::parse(a.as_str()), Some(a));
        }
        assert_eq!(Activity::parse("juggling"), None);
    }
}

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use super::*;
    use crate::{load_schedules_reader, ScheduleError};

    const CSV: &str = "\
citizen_id,activity,start_offset_ticks,duration_ticks,destination,cycle_ticks
0,sleep,0,7,home,24
0,work,9,8,work,24
2,leisure,18,3,4:-2,24
";

    #[test]
    fn loads_rows_per_citizen() {
        let schedules = load_schedules_reader(Cursor::new(CSV), 3).unwrap();
        assert_eq!(schedules.len(), 3);
        assert_eq!(schedules[0].len(), 2);
        assert!(schedules[1].is_empty());
        let w = &schedules[2].windows()[0];
        assert_eq!(w.activity, Activity::Leisure);
        assert_eq!(w.destination, Destination::Location(Position::new(4, -2)));
    }

    #[test]
    fn rejects_unknown_activity() {
        let csv = "citizen_id,activity,start_offset_ticks,duration_ticks,destination,cycle_ticks\n0,nap,0,1,home,24\n";
        assert!(matches!(load_schedules_reader(Cursor::new(csv), 1), Err(ScheduleError::Parse(_))));
    }

    #[test]
    fn rejects_bad_destination() {
        let csv = "citizen_id,activity,start_offset_ticks,duration_ticks,destination,cycle_ticks\n0,work,0,1,office,24\n";
        assert!(load_schedules_reader(Cursor::new(csv), 1).is_err());
    }

    #[test]
    fn rejects_out_of_range_citizen() {
        let csv = "citizen_id,activity,start_offset_ticks,duration_ticks,destination,cycle_ticks\n5,work,0,1,home,24\n";
        assert!(load_schedules_reader(Cursor::new(csv), 2).is_err());
    }

    #[test]
    fn rejects_mixed_cycles() {
        let csv = "citizen_id,activity,start_offset_ticks,duration_ticks,destination,cycle_ticks\n0,work,0,1,home,24\n0,sleep,2,1,home,48\n";
        assert!(load_schedules_reader(Cursor::new(csv), 1).is_err());
    }
}
