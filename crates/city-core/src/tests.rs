//! Unit tests for city-core primitives.

#[cfg(test)]
mod ids {
    use crate::{CitizenId, MemoryId};

    #[test]
    fn index_roundtrip() {
        let id = CitizenId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(CitizenId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels() {
        assert_eq!(CitizenId::INVALID.0, u32::MAX);
        assert_eq!(MemoryId::INVALID.0, u64::MAX);
        assert!(!CitizenId::default().is_valid());
        assert!(CitizenId(0).is_valid());
    }

    #[test]
    fn display() {
        assert_eq!(CitizenId(7).to_string(), "CitizenId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::Position;

    #[test]
    fn manhattan_distance() {
        let a = Position::new(1, 1);
        let b = Position::new(4, -1);
        assert_eq!(a.manhattan(b), 5);
        assert_eq!(b.manhattan(a), 5);
        assert_eq!(a.manhattan(a), 0);
    }

    #[test]
    fn near_check() {
        let a = Position::new(0, 0);
        assert!(a.is_near(Position::new(1, 1), 2));
        assert!(!a.is_near(Position::new(2, 1), 2));
    }

    #[test]
    fn neighbors_are_adjacent() {
        let p = Position::new(3, 3);
        assert!(p.neighbors4().iter().all(|n| p.manhattan(*n) == 1));
    }
}

#[cfg(test)]
mod time {
    use crate::{Clock, KernelConfig, Phase, Tick};

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(Tick(15) - Tick(10), 5u64);
        assert_eq!(Tick(3).since(Tick(10)), 0);
        assert_eq!(Tick::ZERO.prev(), None);
    }

    #[test]
    fn advance_returns_new_tick() {
        let mut clock = Clock::new(24, 6, 20);
        assert_eq!(clock.current_tick(), Tick(0));
        assert_eq!(clock.advance(), Tick(1));
        assert_eq!(clock.advance(), Tick(2));
        assert_eq!(clock.current_tick(), Tick(2));
    }

    #[test]
    fn day_index_and_hour() {
        let mut clock = Clock::new(24, 6, 20); // 1 tick = 1 hour
        for _ in 0..25 {
            clock.advance();
        }
        assert_eq!(clock.day_index(), 1);
        assert_eq!(clock.hour_of_day(), 1);
        assert_eq!(clock.minute_of_hour(), 0);
    }

    #[test]
    fn phase_boundaries() {
        let clock = Clock::new(24, 6, 20);
        assert_eq!(clock.phase_of(Tick(5)), Phase::Night);
        assert_eq!(clock.phase_of(Tick(6)), Phase::Day);
        assert_eq!(clock.phase_of(Tick(19)), Phase::Day);
        assert_eq!(clock.phase_of(Tick(20)), Phase::Night);
        assert_eq!(clock.phase_of(Tick(24 + 12)), Phase::Day);
    }

    #[test]
    fn quarter_hour_ticks() {
        let clock = Clock::new(96, 6, 20).at(Tick(34)); // 34 * 15 min = 08:30
        assert_eq!(clock.hour_of_day(), 8);
        assert_eq!(clock.minute_of_hour(), 30);
        assert_eq!(clock.formatted_time(), "08:30 AM");
        assert_eq!(clock.ticks_for_hours(2), 8);
        assert_eq!(clock.ticks_for_minutes(20), 2);
    }

    #[test]
    fn formatted_time_noon_and_midnight() {
        assert_eq!(Clock::new(24, 6, 20).formatted_time(), "12:00 AM");
        assert_eq!(Clock::new(24, 6, 20).at(Tick(12)).formatted_time(), "12:00 PM");
        assert_eq!(Clock::new(24, 6, 20).at(Tick(15)).formatted_time(), "03:00 PM");
    }

    #[test]
    fn day_start_detection() {
        let clock = Clock::new(24, 6, 20);
        assert!(clock.clone().at(Tick(48)).is_day_start());
        assert!(!clock.at(Tick(49)).is_day_start());
    }

    #[test]
    fn from_config_uses_config_values() {
        let cfg = KernelConfig { ticks_per_day: 48, ..KernelConfig::default() };
        let clock = Clock::from_config(&cfg);
        assert_eq!(clock.ticks_per_day(), 48);
        assert_eq!(clock.minutes_per_tick(), 30);
    }
}

#[cfg(test)]
mod config {
    use crate::{CoreError, KernelConfig, Tick};

    #[test]
    fn default_is_valid() {
        KernelConfig::default().validate().unwrap();
    }

    #[test]
    fn end_tick() {
        let cfg = KernelConfig { total_ticks: 100, ..KernelConfig::default() };
        assert_eq!(cfg.end_tick(), Tick(100));
    }

    #[test]
    fn rejects_non_divisor_ticks_per_day() {
        let cfg = KernelConfig { ticks_per_day: 7, ..KernelConfig::default() };
        assert!(matches!(cfg.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn rejects_inverted_day_phase() {
        let cfg = KernelConfig { day_start_hour: 20, night_start_hour: 6, ..KernelConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_capacity_and_timeout() {
        let mut cfg = KernelConfig::default();
        cfg.memory.capacity = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = KernelConfig::default();
        cfg.oracle.timeout_ms = 0;
        assert!(cfg.validate().is_err());
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = SimRng::new(12345);
        let mut r2 = SimRng::new(12345);
        for _ in 0..100 {
            let a: f32 = r1.random();
            let b: f32 = r2.random();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn children_diverge() {
        let mut root = SimRng::new(1);
        let mut c0 = root.child(0);
        let mut c1 = root.child(1);
        let a: u64 = c0.random();
        let b: u64 = c1.random();
        assert_ne!(a, b);
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = SimRng::new(0);
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(1.0));
    }
}
