//! The decision engine: one turn per living agent per tick.

use tracing::{debug, info};

use ka_advisor::Advisor;
use ka_agent::{Agent, AgentState, Goal, Target};
use ka_core::{EngineConfig, RngStreams, streams};
use ka_mobility::{MobilityEngine, MoveOutcome, detect_stuck, recover};
use ka_nav::{AStarPathfinder, Pathfinder};
use ka_world::{ObjectiveBoard, WorldSnapshot};

use crate::{BehaviorResult, Interrupt, TickContext, check_interrupts};

/// Counters over the engine's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub turns:            u64,
    pub forced_resets:    u64,
    pub interrupts:       u64,
    pub adopted:          u64,
    pub claimed:          u64,
    pub abandoned:        u64,
    pub advisor_requests: u64,
    pub advisor_applied:  u64,
    pub fallback_applied: u64,
    pub unknown_ignored:  u64,
    pub purchases:        u64,
    pub journeys:         u64,
}

/// How an agent's turn ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Dead agents take no turn.
    Skipped,
    /// Stuck recovery abandoned the target; nothing else ran.
    ForcedReset,
    /// Rest progression ran; nothing else did.
    Rested,
    Interrupted(Interrupt),
    /// The state handler ran.  Carries the state it left the agent in.
    Handled(AgentState),
}

/// Short diagnostic label for what the agent is doing.  Never fails.
pub fn intent_label(agent: &Agent) -> &'static str {
    match (agent.state, agent.target) {
        (AgentState::Dead, _)                                      => "dead",
        (AgentState::Resting, _)                                   => "resting",
        (AgentState::Retreating, _)                                => "retreating",
        (AgentState::Shopping, _)                                  => "shopping",
        (AgentState::Fighting, _) | (_, Target::Combat(_))         => "fighting",
        (_, Target::Objective(Goal::Bounty { .. }))                => "pursuing_bounty",
        (_, Target::Objective(Goal::Frontier { .. }))              => "exploring",
        (_, Target::Objective(Goal::AttackStructure { .. }))       => "raiding",
        (_, Target::Objective(Goal::Defend { .. }))                => "defending",
        (_, Target::Objective(Goal::GoingHome { .. }))             => "going_home",
        (_, Target::Objective(Goal::Shop { .. }))                  => "going_shopping",
        (_, Target::Objective(Goal::Retreat { .. }))               => "retreating",
        (_, Target::Patrol(_))                                     => "patrolling",
        (_, Target::None)                                          => "idle",
    }
}

/// Per-agent decision making.
///
/// Owns the tunables, the movement layer (and through it the pathfinder)
/// and the optional advisor.  Agents, the world and the objective board are
/// owned by the simulation and lent for each turn.
pub struct DecisionEngine<P: Pathfinder = AStarPathfinder> {
    config:       EngineConfig,
    pub mobility: MobilityEngine<P>,
    advisor:      Option<Box<dyn Advisor>>,
    pub stats:    EngineStats,
}

impl DecisionEngine<AStarPathfinder> {
    /// An engine using the bounded A* with `config.nav.max_expansions`.
    pub fn new(config: EngineConfig) -> BehaviorResult<Self> {
        let pathfinder = AStarPathfinder::new(config.nav.max_expansions);
        Self::with_pathfinder(config, pathfinder)
    }
}

impl<P: Pathfinder> DecisionEngine<P> {
    /// Validate `config` and build an engine around `pathfinder`.
    pub fn with_pathfinder(config: EngineConfig, pathfinder: P) -> BehaviorResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            mobility: MobilityEngine::new(pathfinder),
            advisor: None,
            stats: EngineStats::default(),
        })
    }

    /// Route advisory requests to `advisor` instead of the fallback table.
    pub fn with_advisor(mut self, advisor: Box<dyn Advisor>) -> Self {
        self.advisor = Some(advisor);
        self
    }

    pub fn set_advisor(&mut self, advisor: Option<Box<dyn Advisor>>) {
        self.advisor = advisor;
    }

    pub fn advisor_name(&self) -> Option<&str> {
        self.advisor.as_deref().map(|a| a.name())
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one agent's turn.
    ///
    /// 1. refresh the intent label;
    /// 2. stuck detection and recovery (a forced reset ends the turn);
    /// 3. rest progression for resting agents (ends the turn);
    /// 4. priority interrupts (a match ends the turn);
    /// 5. advisory eligibility: submit, or apply the fallback table;
    /// 6. apply a ready advisory decision;
    /// 7. the state handler.
    pub fn tick_agent(
        &mut self,
        agent: &mut Agent,
        ctx:   &TickContext<'_>,
        board: &mut ObjectiveBoard,
        rngs:  &mut RngStreams,
    ) -> TurnOutcome {
        if !agent.is_alive() {
            return TurnOutcome::Skipped;
        }
        self.stats.turns += 1;
        agent.intent = intent_label(agent);

        let mut turn = Turn {
            ctx,
            cfg:      &self.config,
            board,
            rngs,
            mobility: &mut self.mobility,
            stats:    &mut self.stats,
        };

        let previous = agent.target;
        if detect_stuck(agent, ctx.now, ctx.tile_size(), &turn.cfg.stuck) {
            let recovery = recover(agent, &ctx.snap, ctx.now, &turn.cfg.stuck);
            if recovery.is_forced_reset() {
                if let Some(id) = previous.bounty() {
                    turn.board.release(id, agent.id);
                }
                turn.stats.forced_resets += 1;
                agent.intent = intent_label(agent);
                return TurnOutcome::ForcedReset;
            }
        }

        if agent.state == AgentState::Resting {
            turn.resting(agent);
            agent.intent = intent_label(agent);
            return TurnOutcome::Rested;
        }

        let interrupt = check_interrupts(
            agent,
            ctx,
            turn.cfg,
            turn.board,
            turn.rngs.stream(streams::DEFEND_NEUTRAL),
        );
        if let Some(interrupt) = interrupt {
            turn.apply_interrupt(agent, interrupt);
            agent.intent = intent_label(agent);
            return TurnOutcome::Interrupted(interrupt);
        }

        turn.advisory(agent, self.advisor.as_deref_mut());

        turn.dispatch(agent);
        agent.intent = intent_label(agent);
        TurnOutcome::Handled(agent.state)
    }

    /// Movement phase for one agent.
    pub fn advance(&self, agent: &mut Agent, snap: &WorldSnapshot<'_>, dt_secs: f32) -> MoveOutcome {
        self.mobility.advance(agent, snap, dt_secs, &self.config.nav)
    }
}

impl<P: Pathfinder> std::fmt::Debug for DecisionEngine<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("advisor", &self.advisor_name())
            .field("stats", &self.stats)
            .finish()
    }
}

// ── Turn ──────────────────────────────────────────────────────────────────────

/// Everything one agent's turn may touch, split-borrowed from the engine and
/// the simulation.  The handlers live in `impl Turn` blocks across the
/// crate's modules.
pub(crate) struct Turn<'t, 'a, P: Pathfinder> {
    pub(crate) ctx:      &'t TickContext<'a>,
    pub(crate) cfg:      &'t EngineConfig,
    pub(crate) board:    &'t mut ObjectiveBoard,
    pub(crate) rngs:     &'t mut RngStreams,
    pub(crate) mobility: &'t mut MobilityEngine<P>,
    pub(crate) stats:    &'t mut EngineStats,
}

impl<P: Pathfinder> Turn<'_, '_, P> {
    pub(crate) fn apply_interrupt(&mut self, agent: &mut Agent, interrupt: Interrupt) {
        self.stats.interrupts += 1;
        self.retarget(agent, AgentState::Moving, interrupt.target());
        agent.commit.clear();
        match interrupt {
            Interrupt::GoHome(_) => debug!(
                agent = %agent.id,
                tick = %self.ctx.tick,
                damage = agent.rest.damage_since_left,
                "going home to rest"
            ),
            other => info!(
                agent = %agent.id,
                tick = %self.ctx.tick,
                interrupt = other.as_str(),
                structure = %other.structure(),
                "interrupt: defending"
            ),
        }
    }
}
