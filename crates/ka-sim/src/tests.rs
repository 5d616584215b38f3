//! Integration tests for ka-sim.

use ka_advisor::{AdvisorAction, DecisionOrigin, InlineAdvisor, MockProvider, ScriptedProvider};
use ka_agent::{AgentSpawn, AgentState, AgentStore, AgentStoreBuilder, Goal, Target};
use ka_core::{AgentId, EngineConfig, GridPos, SimConfig, SimTime, StructureId, Tick, WorldPos};
use ka_world::{ObjectiveBoard, ObjectiveKind, StructureKind, TileKind, TileMap, World, WorldView};

use crate::{NoopObserver, Scenario, Sim, SimBuilder, SimError, SimObserver, SimRules, TickSummary};

const TS: f32 = 32.0;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config(total_ticks: u64) -> SimConfig {
    SimConfig {
        seed:                  42,
        tick_hz:               60,
        total_ticks,
        output_interval_ticks: 60,
    }
}

/// Defaults with the idle wander switched off and no score jitter.
fn quiet_engine() -> EngineConfig {
    let mut cfg = EngineConfig::default();
    cfg.behavior.wander_chance = 0.0;
    cfg.scoring.jitter = 0.0;
    cfg
}

fn open_world(w: i32, h: i32) -> World {
    World::new(TileMap::revealed(w, h, TS))
}

fn center(x: i32, y: i32) -> WorldPos {
    WorldPos::new((x as f32 + 0.5) * TS, (y as f32 + 0.5) * TS)
}

fn one_agent(at: WorldPos) -> AgentStore {
    AgentStoreBuilder::new(TS).spawn(AgentSpawn::at(at)).build()
}

fn village(agents: usize, seed: u64, engine: EngineConfig) -> Sim {
    let mut config = test_config(900);
    config.seed = seed;
    Scenario::village(agents).into_builder(config, engine).build().unwrap()
}

/// Everything about the agents that should repeat bit-for-bit.
fn fingerprint(sim: &Sim) -> Vec<(u32, u32, &'static str, u32, u32, &'static str, String)> {
    sim.agents
        .iter()
        .map(|a| {
            (
                a.pos.x.to_bits(),
                a.pos.y.to_bits(),
                a.state.as_str(),
                a.hp,
                a.gold,
                a.intent,
                format!("{:?}", a.target.key()),
            )
        })
        .collect()
}

/// Records every tick summary and snapshot tick it sees.
#[derive(Default)]
struct Recorder {
    starts:    Vec<Tick>,
    summaries: Vec<TickSummary>,
    snapshots: Vec<(Tick, SimTime)>,
    ended:     Option<Tick>,
}

impl SimObserver for Recorder {
    fn on_tick_start(&mut self, tick: Tick) {
        self.starts.push(tick);
    }

    fn on_tick_end(&mut self, _tick: Tick, summary: &TickSummary) {
        self.summaries.push(*summary);
    }

    fn on_snapshot(&mut self, tick: Tick, now: SimTime, _: &AgentStore, _: &World, _: &ObjectiveBoard) {
        self.snapshots.push((tick, now));
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.ended = Some(final_tick);
    }
}

// ── SimBuilder validation ─────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn builds_successfully_with_defaults() {
        let sim = SimBuilder::new(test_config(10), EngineConfig::default(), open_world(8, 8), one_agent(center(1, 1)))
            .build()
            .unwrap();
        assert_eq!(sim.agents.len(), 1);
        assert!(sim.board.is_empty());
        assert_eq!(sim.rules, SimRules::default());
        assert_eq!(sim.engine.advisor_name(), None);
        assert_eq!(sim.rngs.base_seed(), 42);
    }

    #[test]
    fn zero_tick_rate_errors() {
        let mut config = test_config(10);
        config.tick_hz = 0;
        let result = SimBuilder::new(config, EngineConfig::default(), open_world(8, 8), one_agent(center(1, 1))).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn spawn_in_water_errors() {
        let mut world = open_world(8, 8);
        world.map.set_tile(GridPos::new(2, 2), TileKind::Water).unwrap();
        let result = SimBuilder::new(test_config(10), EngineConfig::default(), world, one_agent(center(2, 2))).build();
        assert!(matches!(
            result,
            Err(SimError::BadSpawn { agent: AgentId(0), why: "impassable", .. })
        ));
    }

    #[test]
    fn spawn_off_map_errors() {
        let result =
            SimBuilder::new(test_config(10), EngineConfig::default(), open_world(8, 8), one_agent(center(9, 3))).build();
        assert!(matches!(result, Err(SimError::BadSpawn { why: "outside the map", .. })));
    }

    #[test]
    fn missing_home_errors() {
        let agents = AgentStoreBuilder::new(TS)
            .spawn(AgentSpawn::at(center(1, 1)).home(StructureId(3)))
            .build();
        let result = SimBuilder::new(test_config(10), EngineConfig::default(), open_world(8, 8), agents).build();
        assert!(matches!(result, Err(SimError::UnknownHome { home: StructureId(3), .. })));
    }

    #[test]
    fn invalid_engine_config_errors() {
        let mut engine = EngineConfig::default();
        engine.nav.max_expansions = 0;
        let result = SimBuilder::new(test_config(10), engine, open_world(8, 8), one_agent(center(1, 1))).build();
        assert!(matches!(result, Err(SimError::Behavior(_))));
    }

    #[test]
    fn rules_load_from_json_with_defaults() {
        let rules: SimRules = serde_json::from_str(r#"{ "gold_per_kill": 25 }"#).unwrap();
        assert_eq!(rules.gold_per_kill, 25);
        assert_eq!(rules.attack_interval_secs, 1.0);
        assert_eq!(rules.strike_every(60), 60);
        assert!(rules.is_strike_tick(Tick(120), 60));
        assert!(!rules.is_strike_tick(Tick(121), 60));
    }
}

// ── Tick loop ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use super::*;

    #[test]
    fn run_stops_at_end_tick_and_reports() {
        let mut sim = village(4, 42, quiet_engine());
        sim.config.total_ticks = 120;
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();

        assert_eq!(sim.clock.current_tick, Tick(120));
        assert_eq!(rec.starts.len(), 120);
        assert_eq!(rec.summaries.len(), 120);
        assert_eq!(rec.ended, Some(Tick(120)));
        // Snapshots at ticks 0 and 60; time is read at the start of each tick.
        assert_eq!(rec.snapshots.len(), 2);
        assert_eq!(rec.snapshots[0].0, Tick(0));
        assert_eq!(rec.snapshots[1].0, Tick(60));
        assert!((999..=1_001).contains(&rec.snapshots[1].1.as_millis()));
        assert!(rec.summaries.iter().all(|s| s.living == 4));
    }

    #[test]
    fn run_ticks_ignores_end_tick() {
        let mut sim = village(2, 42, quiet_engine());
        sim.config.total_ticks = 10;
        sim.run_ticks(30, &mut NoopObserver).unwrap();
        assert_eq!(sim.clock.current_tick, Tick(30));
    }

    #[test]
    fn paired_observers_both_hear_every_hook() {
        let mut sim = village(2, 42, quiet_engine());
        let mut pair = (Recorder::default(), Recorder::default());
        sim.run_ticks(61, &mut pair).unwrap();
        assert_eq!(pair.0.starts, pair.1.starts);
        assert_eq!(pair.0.summaries, pair.1.summaries);
        assert_eq!(pair.1.snapshots.len(), 2);
    }

    #[test]
    fn zero_tick_rate_is_rejected_at_run_time() {
        let mut sim = village(1, 42, quiet_engine());
        sim.config.tick_hz = 0;
        assert!(matches!(sim.run(&mut NoopObserver), Err(SimError::Config(_))));
    }

    #[test]
    fn agents_reveal_the_fog_around_them() {
        let mut sim = village(1, 42, quiet_engine());
        let far = GridPos::new(2, 28);
        sim.agents.get_mut(AgentId(0)).unwrap().pos = center(far.x, far.y);
        assert!(!sim.world.map.visibility(far).is_explored());

        sim.run_ticks(1, &mut NoopObserver).unwrap();
        assert!(sim.world.map.visibility(far).is_explored());
    }

    #[test]
    fn agents_leave_the_spawn_rows() {
        let mut sim = village(6, 42, quiet_engine());
        let start: Vec<WorldPos> = sim.agents.iter().map(|a| a.pos).collect();
        let mut rec = Recorder::default();
        sim.run_ticks(600, &mut rec).unwrap();

        assert!(rec.summaries.iter().map(|s| s.moved).sum::<u32>() > 0);
        let moved = sim.agents.iter().zip(&start).filter(|&(a, &p)| a.pos.distance(p) > TS).count();
        assert!(moved > 0, "nobody went anywhere in ten seconds");
    }
}

// ── Determinism ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod determinism {
    use super::*;

    #[test]
    fn same_seed_same_run() {
        let mut a = village(8, 7, EngineConfig::default());
        let mut b = village(8, 7, EngineConfig::default());
        a.run(&mut NoopObserver).unwrap();
        b.run(&mut NoopObserver).unwrap();

        assert_eq!(fingerprint(&a), fingerprint(&b));
        assert_eq!(a.engine.stats, b.engine.stats);
        assert_eq!(a.board.total_paid, b.board.total_paid);
        let hp = |s: &Sim| s.world.enemies.iter().map(|e| e.hp).collect::<Vec<_>>();
        assert_eq!(hp(&a), hp(&b));
    }

    #[test]
    fn same_seed_same_run_with_inline_advisor() {
        let build = || {
            let mut config = test_config(900);
            config.seed = 11;
            Scenario::village(6)
                .into_builder(config, EngineConfig::default())
                .advisor(Box::new(InlineAdvisor::new(MockProvider::new(11))))
                .build()
                .unwrap()
        };
        let (mut a, mut b) = (build(), build());
        a.run(&mut NoopObserver).unwrap();
        b.run(&mut NoopObserver).unwrap();

        assert_eq!(fingerprint(&a), fingerprint(&b));
        assert_eq!(a.engine.stats, b.engine.stats);
    }

    #[test]
    fn reseed_mid_run_repeats_too() {
        let run = || {
            let mut sim = village(4, 3, EngineConfig::default());
            sim.run_ticks(300, &mut NoopObserver).unwrap();
            sim.reseed(99);
            sim.run_ticks(300, &mut NoopObserver).unwrap();
            sim
        };
        let (a, b) = (run(), run());
        assert_eq!(a.config.seed, 99);
        assert_eq!(a.rngs.base_seed(), 99);
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }
}

// ── Navigation and stuck recovery end to end ──────────────────────────────────

#[cfg(test)]
mod navigation {
    use super::*;

    #[test]
    fn diagonal_walk_arrives() {
        let world = open_world(12, 12);
        let mut sim = SimBuilder::new(test_config(600), quiet_engine(), world, one_agent(center(0, 0)))
            .build()
            .unwrap();
        let goal = center(5, 5);
        sim.agents.get_mut(AgentId(0)).unwrap().go(AgentState::Moving, Target::Patrol(goal));

        // Five diagonal cells are about 226 units; at 120 units/s that is
        // under two seconds.  An axis-aligned route would take ~2.7 s.
        sim.run_ticks(150, &mut NoopObserver).unwrap();
        let a = sim.agents.get(AgentId(0)).unwrap();
        assert!(a.pos.within(goal, TS * 0.5), "still at {:?}", a.pos);
        assert_eq!(a.state, AgentState::Idle);
    }

    #[test]
    fn blocked_goal_replans_then_detours_then_patrols() {
        // A water wall splits the map; the goal is on the far side.
        let mut world = open_world(20, 8);
        for y in 0..8 {
            world.map.set_tile(GridPos::new(10, y), TileKind::Water).unwrap();
        }
        let mut sim = SimBuilder::new(test_config(1_200), quiet_engine(), world, one_agent(center(2, 4)))
            .build()
            .unwrap();
        let goal = Target::Patrol(center(16, 4));
        sim.agents.get_mut(AgentId(0)).unwrap().go(AgentState::Moving, goal);

        let mut first_event = None;
        let mut abandoned = None;
        for tick in 0..1_200u64 {
            sim.run_ticks(1, &mut NoopObserver).unwrap();
            let a = sim.agents.get(AgentId(0)).unwrap();
            if a.stuck.stuck_events == 1 && first_event.is_none() {
                first_event = Some((a.stuck.attempts, a.target, a.stuck.forced_resets));
            }
            if a.stuck.forced_resets == 1 && abandoned.is_none() {
                abandoned = Some((tick, a.target));
            }
        }

        let (attempts, target, resets) = first_event.expect("never flagged stuck");
        assert_eq!(attempts, 1, "first recovery is a replan");
        assert_eq!(target, goal, "the goal is kept on the first attempt");
        assert_eq!(resets, 0);

        // The detour's own movement does not restart the ladder, so the third
        // stuck event gives up on the goal.
        let (tick, target) = abandoned.expect("goal never abandoned");
        assert!(matches!(target, Target::Patrol(p) if p == center(2, 4)), "patrols home, got {target:?}");
        assert!(tick < 900, "abandoned late, at tick {tick}");

        let a = sim.agents.get(AgentId(0)).unwrap();
        assert!(a.stuck.stuck_events >= 3, "replan, detour and abandon each follow a stuck event");
        assert!(a.stuck.forced_resets >= 1);
        assert!(!a.stuck.stuck);
        assert!(a.pos.x < 10.0 * TS, "never crossed the water");
        assert!(sim.engine.mobility.stats.failures > 0);
        assert!(sim.engine.stats.forced_resets >= 1);
    }
}

// ── Combat ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod combat {
    use super::*;

    #[test]
    fn agent_kills_adjacent_enemy_and_is_paid() {
        let mut world = open_world(10, 10);
        let foe = world.add_enemy(center(3, 2), 20);
        let mut sim = SimBuilder::new(test_config(200), quiet_engine(), world, one_agent(center(2, 2)))
            .build()
            .unwrap();
        sim.agents.get_mut(AgentId(0)).unwrap().go(AgentState::Fighting, Target::Combat(foe));

        let mut rec = Recorder::default();
        sim.run_ticks(1, &mut rec).unwrap();
        let enemy = &sim.world.enemies[foe.index()];
        assert_eq!(enemy.hp, 10);
        assert_eq!(enemy.chasing, Some(AgentId(0)), "struck enemies turn on their attacker");
        // 8 raw damage less 5 defense.
        assert_eq!(sim.agents.get(AgentId(0)).unwrap().hp, 97);

        sim.run_ticks(60, &mut rec).unwrap();
        assert!(!sim.world.enemies[foe.index()].is_alive());
        let a = sim.agents.get(AgentId(0)).unwrap();
        assert_eq!(a.gold, SimRules::default().gold_per_kill);
        assert_eq!(a.hp, 97, "a dead enemy does not answer");
        assert_eq!(rec.summaries.iter().map(|s| s.enemies_slain).sum::<u32>(), 1);
    }

    #[test]
    fn raiders_destroy_a_structure_and_its_bounty_closes() {
        let mut world = open_world(30, 10);
        let house = world.add_structure(StructureKind::House, GridPos::new(3, 3), 16);
        let raider = world.add_enemy(center(4, 3), 30);
        world.enemy_mut(raider).unwrap().attacking = Some(house);
        let mut board = ObjectiveBoard::new();
        board.place(ObjectiveKind::Defend, center(3, 3), 40, Some(house), SimTime::ZERO);

        let mut sim = SimBuilder::new(test_config(200), quiet_engine(), world, one_agent(center(28, 8)))
            .board(board)
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        sim.run_ticks(61, &mut rec).unwrap();

        assert!(!sim.world.structures[house.index()].is_alive());
        assert_eq!(sim.world.enemies[raider.index()].attacking, None);
        assert!(sim.board.is_empty());
        assert_eq!(rec.summaries.iter().map(|s| s.objectives_closed).sum::<u32>(), 1);
    }

    #[test]
    fn fallen_agents_release_their_claims() {
        let mut world = open_world(10, 10);
        let foe = world.add_enemy(center(3, 2), 60);
        world.enemy_mut(foe).unwrap().chasing = Some(AgentId(0));
        let mut board = ObjectiveBoard::new();
        let bounty = board.place(ObjectiveKind::Explore, center(8, 8), 30, None, SimTime::ZERO);
        board.assign(bounty, AgentId(0), SimTime::ZERO).unwrap();

        let mut sim = SimBuilder::new(test_config(200), quiet_engine(), world, one_agent(center(2, 2)))
            .board(board)
            .build()
            .unwrap();
        {
            let a = sim.agents.get_mut(AgentId(0)).unwrap();
            a.go(AgentState::Fighting, Target::Combat(foe));
            a.hp = 3;
        }
        let mut rec = Recorder::default();
        sim.run_ticks(1, &mut rec).unwrap();

        let a = sim.agents.get(AgentId(0)).unwrap();
        assert_eq!(a.state, AgentState::Dead);
        assert_eq!(sim.board.responders(bounty), 0);
        assert_eq!(rec.summaries[0].agents_lost, 1);
        assert_eq!(rec.summaries[0].living, 0);

        // The dead take no more turns.
        let turns = sim.engine.stats.turns;
        sim.run_ticks(10, &mut NoopObserver).unwrap();
        assert_eq!(sim.engine.stats.turns, turns);
    }
}

// ── Advisor ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod advisor {
    use super::*;

    #[test]
    fn scripted_retreat_in_combat() {
        let mut world = open_world(30, 30);
        let castle = world.add_structure(StructureKind::Castle, GridPos::new(24, 24), 500);
        let foe = world.add_enemy(center(3, 2), 60);
        let provider = ScriptedProvider::new([r#"{"action":"retreat","target":"castle","reason":"hurt"}"#]);
        let mut sim = SimBuilder::new(test_config(200), quiet_engine(), world, one_agent(center(2, 2)))
            .advisor(Box::new(InlineAdvisor::new(provider)))
            .build()
            .unwrap();
        {
            let a = sim.agents.get_mut(AgentId(0)).unwrap();
            a.go(AgentState::Fighting, Target::Combat(foe));
            a.hp = 40;
        }
        sim.run_ticks(1, &mut NoopObserver).unwrap();

        let a = sim.agents.get(AgentId(0)).unwrap();
        assert_eq!(a.state, AgentState::Retreating);
        assert_eq!(a.target, Target::Objective(Goal::Retreat { to: castle }));
        let rec = a.last_decision.as_ref().unwrap();
        assert_eq!(rec.origin, DecisionOrigin::Advisor);
        assert_eq!(rec.action, AdvisorAction::Retreat);
        assert_eq!(sim.engine.stats.advisor_requests, 1);

        // Heading for the castle from here on.
        let before = a.pos.distance(center(25, 25));
        sim.run_ticks(30, &mut NoopObserver).unwrap();
        let a = sim.agents.get(AgentId(0)).unwrap();
        assert!(a.pos.distance(center(25, 25)) < before);
    }
}
