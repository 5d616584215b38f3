//! The `Sim` struct and its tick loop.

use tracing::{debug, info};

use ka_agent::AgentStore;
use ka_behavior::{DecisionEngine, TickContext, TurnOutcome};
use ka_core::{RngStreams, SimClock, SimConfig, SimTime, Tick};
use ka_mobility::MoveOutcome;
use ka_nav::{AStarPathfinder, Pathfinder};
use ka_world::{ObjectiveBoard, SpatialCache, World, WorldSnapshot, WorldView};

use crate::combat::resolve_combat;
use crate::{SimError, SimObserver, SimResult, SimRules, TickSummary};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim<P>` holds all simulation state and drives the five-phase tick loop:
///
/// 1. **Fog**: visible cells fade to seen, then every living agent reveals
///    its sight radius.
/// 2. **Decisions**: one snapshot is built from the world and the agents'
///    start-of-tick positions; [`DecisionEngine::tick_agent`] runs for each
///    living agent in ascending `AgentId` order.
/// 3. **Movement**: every agent takes one step against the same snapshot.
/// 4. **Combat**: on strike ticks, agents then enemies trade blows.
/// 5. **Upkeep**: claimed and invalidated objectives leave the board.
///
/// The clock then advances by one tick of `1 / tick_hz` seconds.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<P: Pathfinder = AStarPathfinder> {
    /// Global configuration (seed, tick rate, total ticks, …).
    pub config: SimConfig,

    /// Simulation clock: the current tick and simulated time.
    pub clock: SimClock,

    /// Combat cadence, enemy reach and sight.
    pub rules: SimRules,

    /// Map, structures, enemies and research.  Read by the engine through
    /// the per-tick snapshot; written here by combat and fog.
    pub world: World,

    /// The one piece of world state the engine writes.
    pub board: ObjectiveBoard,

    pub agents: AgentStore,

    /// The decision engine, its pathfinder and its advisor.
    pub engine: DecisionEngine<P>,

    /// Named random streams, shared by every agent.
    pub rngs: RngStreams,
}

impl<P: Pathfinder> Sim<P> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.end_tick()`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        self.check_config()?;
        info!(
            seed   = self.config.seed,
            ticks  = self.config.total_ticks,
            agents = self.agents.len(),
            advisor = self.engine.advisor_name().unwrap_or("fallback"),
            "simulation started"
        );
        loop {
            let now = self.clock.current_tick;
            if now >= self.config.end_tick() {
                break;
            }
            self.step(now, observer);
        }
        observer.on_sim_end(self.clock.current_tick);
        info!(
            final_tick = %self.clock.current_tick,
            living     = self.agents.living_count(),
            turns      = self.engine.stats.turns,
            claims     = self.board.claims,
            "simulation finished"
        );
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        self.check_config()?;
        for _ in 0..n {
            let now = self.clock.current_tick;
            self.step(now, observer);
        }
        Ok(())
    }

    /// Restart every random stream from `seed`.
    ///
    /// The clock, world, agents and board carry on as they are; only
    /// future draws change.
    pub fn reseed(&mut self, seed: u64) {
        self.config.seed = seed;
        self.rngs.reseed(seed);
        info!(seed, tick = %self.clock.current_tick, "streams reseeded");
    }

    /// Simulated time at the start of the next tick.
    #[inline]
    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn check_config(&self) -> SimResult<()> {
        if self.config.tick_hz == 0 {
            return Err(SimError::Config("tick_hz must be positive".into()));
        }
        Ok(())
    }

    fn step<O: SimObserver>(&mut self, now: Tick, observer: &mut O) {
        observer.on_tick_start(now);
        let summary = self.process_tick(now);
        observer.on_tick_end(now, &summary);
        if self.config.output_interval_ticks > 0
            && now.0.is_multiple_of(self.config.output_interval_ticks)
        {
            observer.on_snapshot(now, summary.now, &self.agents, &self.world, &self.board);
        }
        self.clock.advance(self.config.tick_secs());
    }

    fn process_tick(&mut self, tick: Tick) -> TickSummary {
        let now = self.clock.now();
        let dt = self.config.tick_secs();
        let mut summary = TickSummary { tick, now, ..TickSummary::default() };

        // ── Phase 1: fog of war ───────────────────────────────────────────
        self.update_fog();

        // ── Phase 2: decisions ────────────────────────────────────────────
        //
        // Every agent sees the same snapshot: world state plus the positions
        // all agents held when the tick began.
        let cache = SpatialCache::build(&self.world);
        let allies = self.agents.ally_views();
        let ctx = TickContext::new(tick, now, WorldSnapshot::new(&self.world, &cache, &allies));

        for agent in self.agents.iter_mut() {
            match self.engine.tick_agent(agent, &ctx, &mut self.board, &mut self.rngs) {
                TurnOutcome::Interrupted(_) => summary.interrupts += 1,
                TurnOutcome::ForcedReset => summary.forced_resets += 1,
                _ => {}
            }
        }

        // ── Phase 3: movement ─────────────────────────────────────────────
        for agent in self.agents.iter_mut() {
            match self.engine.advance(agent, &ctx.snap, dt) {
                MoveOutcome::Moved { .. } => summary.moved += 1,
                MoveOutcome::Blocked => summary.blocked += 1,
                MoveOutcome::Held => {}
            }
        }

        // ── Phase 4: combat ───────────────────────────────────────────────
        if self.rules.is_strike_tick(tick, self.config.tick_hz) {
            let report = resolve_combat(&mut self.agents, &mut self.world, &self.rules, tick);
            for &fallen in &report.fallen {
                let released = self.board.release_all(fallen);
                debug!(agent = %fallen, released, "claims released on death");
            }
            summary.enemies_slain = report.slain.len() as u32;
            summary.agents_lost = report.fallen.len() as u32;
        }

        // ── Phase 5: board upkeep ─────────────────────────────────────────
        let closed = self.board.remove_invalid(&self.world.structures);
        if !closed.is_empty() {
            debug!(%tick, closed = closed.len(), "objectives closed");
        }
        summary.objectives_closed = closed.len() as u32;
        summary.living = self.agents.living_count() as u32;
        summary
    }

    fn update_fog(&mut self) {
        let radius = self.rules.sight_radius_tiles;
        self.world.map.fade_visible();
        for agent in self.agents.living() {
            let cell = self.world.map.world_to_grid(agent.pos);
            self.world.map.reveal(cell, radius);
        }
    }
}

impl<P: Pathfinder> std::fmt::Debug for Sim<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sim")
            .field("clock", &self.clock)
            .field("agents", &self.agents.len())
            .field("engine", &self.engine)
            .finish()
    }
}
