//! Unit tests for ka-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, ObjectiveId, StructureId};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels() {
        assert_eq!(AgentId::INVALID.0, u32::MAX);
        assert!(!ObjectiveId::default().is_valid());
        assert!(StructureId(0).is_valid());
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
        assert_eq!(StructureId(3).to_string(), "StructureId(3)");
    }
}

#[cfg(test)]
mod geo {
    use crate::{GridPos, WorldPos};

    #[test]
    fn world_distance() {
        let a = WorldPos::new(0.0, 0.0);
        let b = WorldPos::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert!(a.within(b, 5.0));
        assert!(!a.within(b, 4.99));
    }

    #[test]
    fn grid_metrics() {
        let a = GridPos::new(0, 0);
        let b = GridPos::new(3, -5);
        assert_eq!(a.manhattan(b), 8);
        assert_eq!(a.chebyshev(b), 5);
    }

    #[test]
    fn neighbors_fixed_order() {
        let n: Vec<_> = GridPos::new(5, 5).neighbors8().collect();
        assert_eq!(n.len(), 8);
        assert_eq!(n[0], GridPos::new(5, 4)); // N
        assert_eq!(n[1], GridPos::new(6, 5)); // E
        assert_eq!(n[4], GridPos::new(6, 4)); // NE
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, SimConfig, SimTime, Tick};

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(Tick(15) - Tick(10), 5u64);
    }

    #[test]
    fn clock_advances_only_by_delta() {
        let mut clock = SimClock::new();
        clock.advance(0.5);
        clock.advance(0.25);
        assert_eq!(clock.current_tick, Tick(2));
        assert_eq!(clock.now(), SimTime(750));
    }

    #[test]
    fn sixty_hz_does_not_drift() {
        let mut clock = SimClock::new();
        for _ in 0..600 {
            clock.advance(1.0 / 60.0);
        }
        // 600 ticks at 60 Hz is 10 s; carry keeps the error below a millisecond.
        assert!(clock.now_ms().abs_diff(10_000) <= 1, "got {}", clock.now_ms());
    }

    #[test]
    fn bad_delta_advances_tick_only() {
        let mut clock = SimClock::new();
        clock.advance(-1.0);
        clock.advance(f32::NAN);
        assert_eq!(clock.current_tick, Tick(2));
        assert_eq!(clock.now(), SimTime::ZERO);
    }

    #[test]
    fn sim_time_helpers() {
        let t = SimTime::from_secs(1.5);
        assert_eq!(t, SimTime(1500));
        assert_eq!(t.plus_secs(0.25), SimTime(1750));
        assert_eq!(SimTime(1000).millis_since(SimTime(2000)), 0);
        assert_eq!(SimTime(2500).secs_since(SimTime(500)), 2.0);
        assert_eq!(SimTime(61_005).to_string(), "61.005s");
    }

    #[test]
    fn sim_config_end_tick() {
        let cfg = SimConfig { total_ticks: 600, ..SimConfig::default() };
        assert_eq!(cfg.end_tick(), Tick(600));
        assert!((cfg.tick_secs() - 1.0 / 60.0).abs() < 1e-6);
    }
}

#[cfg(test)]
mod rng {
    use crate::rng::{stable_hash, stream_seed};
    use crate::{RngStreams, StreamRng, streams};

    #[test]
    fn stable_hash_is_fixed() {
        // FNV-1a test vectors.
        assert_eq!(stable_hash(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(stable_hash(b"a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn same_name_same_sequence() {
        let mut a = StreamRng::for_stream(12345, "journey");
        let mut b = StreamRng::for_stream(12345, "journey");
        for _ in 0..100 {
            let x: f32 = a.random();
            let y: f32 = b.random();
            assert_eq!(x, y);
        }
    }

    #[test]
    fn different_names_differ() {
        assert_ne!(stream_seed(1, "journey"), stream_seed(1, "idle_wander"));
        assert_ne!(stream_seed(1, "journey"), stream_seed(2, "journey"));
    }

    #[test]
    fn streams_are_independent() {
        // Draws on one stream must not shift another.
        let mut s1 = RngStreams::new(7);
        let mut s2 = RngStreams::new(7);
        for _ in 0..50 {
            let _: u64 = s1.stream(streams::JOURNEY).random();
        }
        let a: u64 = s1.stream(streams::OBJECTIVE_JITTER).random();
        let b: u64 = s2.stream(streams::OBJECTIVE_JITTER).random();
        assert_eq!(a, b);
    }

    #[test]
    fn reseed_restarts_streams() {
        let mut s = RngStreams::new(7);
        let first: u64 = s.stream(streams::JOURNEY).random();
        let _: u64 = s.stream(streams::JOURNEY).random();
        s.reseed(7);
        let again: u64 = s.stream(streams::JOURNEY).random();
        assert_eq!(first, again);
        assert_eq!(s.active_streams().collect::<Vec<_>>(), vec![streams::JOURNEY]);
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = StreamRng::new(0);
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(1.0));
        assert!(!rng.gen_bool(f64::NAN));
    }

    #[test]
    fn symmetric_in_bounds() {
        let mut rng = StreamRng::new(3);
        for _ in 0..1000 {
            let v = rng.symmetric(0.5);
            assert!((-0.5..=0.5).contains(&v));
        }
        assert_eq!(rng.symmetric(0.0), 0.0);
    }

    #[test]
    fn weighted_index_skips_zero_weights() {
        let mut rng = StreamRng::new(9);
        for _ in 0..200 {
            let i = rng.weighted_index(&[0.0, 2.0, f32::NAN, 1.0]).unwrap();
            assert!(i == 1 || i == 3);
        }
        assert_eq!(rng.weighted_index(&[0.0, -1.0]), None);
        assert_eq!(rng.weighted_index(&[]), None);
    }
}

#[cfg(test)]
mod config {
    use crate::{Archetype, CoreError, EngineConfig};

    #[test]
    fn defaults_match_guardrail_tunables() {
        let c = EngineConfig::default();
        assert_eq!(c.stuck.displacement_tiles, 0.25);
        assert_eq!(c.stuck.stuck_secs, 2.0);
        assert_eq!(c.stuck.max_attempts, 3);
        assert_eq!(c.stuck.backoff_secs, 0.5);
        assert_eq!(c.commit.combat_secs, 1.5);
        assert_eq!(c.commit.bounty_secs, 2.5);
        assert_eq!(c.nav.max_expansions, 8_000);
        c.validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = EngineConfig::from_json_str(
            r#"{ "stuck": { "stuck_secs": 3.0 }, "archetypes": { "brave": { "risk": 0.1 } } }"#,
        )
        .unwrap();
        assert_eq!(c.stuck.stuck_secs, 3.0);
        assert_eq!(c.stuck.max_attempts, 3);
        assert_eq!(c.weights(Archetype::Brave).risk, 0.1);
        // Unlisted brave keys fall back to the generic default, not brave's.
        assert_eq!(c.weights(Archetype::Cautious).risk, 1.8);
    }

    #[test]
    fn invalid_values_rejected() {
        let err = EngineConfig::from_json_str(r#"{ "nav": { "max_expansions": 0 } }"#).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
        let err = EngineConfig::from_json_str(r#"{ "scoring": { "unexplored_multiplier": 0.5 } }"#)
            .unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = EngineConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, CoreError::Parse(_)));
    }
}
