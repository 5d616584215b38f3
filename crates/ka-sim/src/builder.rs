//! Fluent builder for constructing a [`Sim`].

use ka_advisor::Advisor;
use ka_agent::AgentStore;
use ka_behavior::DecisionEngine;
use ka_core::{EngineConfig, RngStreams, SimConfig};
use ka_nav::{AStarPathfinder, Pathfinder};
use ka_world::{ObjectiveBoard, World, WorldView};

use crate::{Sim, SimError, SimResult, SimRules};

/// Fluent builder for [`Sim<P>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: seed, tick rate, total ticks, output interval
/// - [`EngineConfig`]: every engine tunable
/// - [`World`]: map, structures, enemies, research
/// - [`AgentStore`]: from [`ka_agent::AgentStoreBuilder`]
///
/// # Optional inputs (have defaults)
///
/// | Method          | Default                               |
/// |-----------------|---------------------------------------|
/// | `.board(b)`     | An empty `ObjectiveBoard`             |
/// | `.rules(r)`     | `SimRules::default()`                 |
/// | `.advisor(a)`   | None: advice comes from the fallback  |
///
/// # Example
///
/// ```rust,ignore
/// let agents = AgentStoreBuilder::new(32.0).spawn(AgentSpawn::at(pos)).build();
/// let mut sim = SimBuilder::new(SimConfig::default(), EngineConfig::default(), world, agents)
///     .board(board)
///     .advisor(Box::new(InlineAdvisor::new(MockProvider::new(7))))
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config:  SimConfig,
    engine:  EngineConfig,
    world:   World,
    agents:  AgentStore,
    board:   Option<ObjectiveBoard>,
    rules:   Option<SimRules>,
    advisor: Option<Box<dyn Advisor>>,
}

impl SimBuilder {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, engine: EngineConfig, world: World, agents: AgentStore) -> Self {
        Self { config, engine, world, agents, board: None, rules: None, advisor: None }
    }

    /// Objectives already on the board when the run starts.
    pub fn board(mut self, board: ObjectiveBoard) -> Self {
        self.board = Some(board);
        self
    }

    pub fn rules(mut self, rules: SimRules) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Route advisory requests to `advisor`.  Without one, every eligible
    /// agent is answered by the fallback table on the spot.
    pub fn advisor(mut self, advisor: Box<dyn Advisor>) -> Self {
        self.advisor = Some(advisor);
        self
    }

    /// Validate inputs and return a ready-to-run [`Sim`] using the bounded
    /// A* pathfinder.
    pub fn build(self) -> SimResult<Sim> {
        let pathfinder = AStarPathfinder::new(self.engine.nav.max_expansions);
        self.build_with(pathfinder)
    }

    /// As [`build`](Self::build), with a caller-supplied pathfinder.
    pub fn build_with<P: Pathfinder>(self, pathfinder: P) -> SimResult<Sim<P>> {
        // ── Validate ──────────────────────────────────────────────────────
        if self.config.tick_hz == 0 {
            return Err(SimError::Config("tick_hz must be positive".into()));
        }
        for agent in self.agents.iter() {
            let cell = self.world.map.world_to_grid(agent.pos);
            if !self.world.map.in_bounds(cell) {
                return Err(SimError::BadSpawn { agent: agent.id, cell, why: "outside the map" });
            }
            if !self.world.map.is_walkable(cell) {
                return Err(SimError::BadSpawn { agent: agent.id, cell, why: "impassable" });
            }
            let missing = agent.home.filter(|&h| !self.world.structures.iter().any(|s| s.id == h));
            if let Some(home) = missing {
                return Err(SimError::UnknownHome { agent: agent.id, home });
            }
        }

        // ── Assemble ──────────────────────────────────────────────────────
        let mut engine = DecisionEngine::with_pathfinder(self.engine, pathfinder)?;
        if let Some(advisor) = self.advisor {
            engine = engine.with_advisor(advisor);
        }

        Ok(Sim {
            clock:  self.config.make_clock(),
            rngs:   RngStreams::new(self.config.seed),
            config: self.config,
            rules:  self.rules.unwrap_or_default(),
            world:  self.world,
            board:  self.board.unwrap_or_default(),
            agents: self.agents,
            engine,
        })
    }
}
