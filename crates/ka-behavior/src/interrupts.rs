//! Fixed-order priority interrupts.
//!
//! Checked after stuck recovery and resting, before advisory and the state
//! handlers.  The first match wins:
//!
//! | Order | Condition                                              | Response          |
//! |-------|--------------------------------------------------------|-------------------|
//! | a     | the castle is damaged and under attack                 | defend it         |
//! | b     | the agent's home is damaged and under attack           | defend it         |
//! | c     | a seen neutral building in range is under attack       | defend it, maybe  |
//! | d     | idle, hurt enough to rest, and the home stands         | go home           |
//!
//! (a)–(c) never replace a target held under an unexpired commitment.  An
//! agent already answering (a) or (b), by heading there or by fighting one of
//! the attackers, keeps doing so and nothing further is checked.  (c) rolls the
//! archetype's `defend_willingness` on the defend-neutral stream; a declined
//! call is not reconsidered for `behavior.distress_recheck_secs`.

use tracing::debug;

use ka_agent::{Agent, AgentState, CommitKind, Goal, Target};
use ka_core::{EngineConfig, SimTime, StructureId, StreamRng};
use ka_world::{ObjectiveBoard, Structure, WorldSnapshot};

use crate::TickContext;

/// A matched interrupt and the structure it concerns.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Interrupt {
    DefendHomeBase(StructureId),
    DefendHome(StructureId),
    DefendNeutral(StructureId),
    GoHome(StructureId),
}

impl Interrupt {
    pub fn structure(self) -> StructureId {
        match self {
            Interrupt::DefendHomeBase(id)
            | Interrupt::DefendHome(id)
            | Interrupt::DefendNeutral(id)
            | Interrupt::GoHome(id) => id,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Interrupt::DefendHomeBase(_) => "defend_home_base",
            Interrupt::DefendHome(_)     => "defend_home",
            Interrupt::DefendNeutral(_)  => "defend_neutral",
            Interrupt::GoHome(_)         => "go_home",
        }
    }

    /// The target this interrupt sets.
    pub fn target(self) -> Target {
        match self {
            Interrupt::GoHome(id) => Target::Objective(Goal::GoingHome { id }),
            other => Target::Objective(Goal::Defend { id: other.structure() }),
        }
    }
}

/// Whether `agent` holds an unexpired commitment on a target that is still
/// valid.
pub fn holds_commitment(agent: &Agent, snap: &WorldSnapshot<'_>, board: &ObjectiveBoard, now: SimTime) -> bool {
    match agent.target {
        Target::Combat(enemy) => {
            agent.commit.is_active(CommitKind::Combat, now) && snap.live_enemy(enemy).is_some()
        }
        Target::Objective(Goal::Bounty { id, .. }) => {
            agent.commit.is_active(CommitKind::Bounty, now)
                && board.get(id).is_some_and(|o| o.is_valid(snap.structures))
        }
        Target::Objective(Goal::Frontier { tile }) => {
            agent.commit.is_active(CommitKind::Frontier, now)
                && !snap.view.visibility(tile).is_explored()
        }
        _ => false,
    }
}

/// Standing, damaged, and being hit right now.
fn in_distress(snap: &WorldSnapshot<'_>, s: &Structure) -> bool {
    s.is_damaged() && snap.is_under_attack(s.id)
}

/// Heading to `id`, or fighting something that is attacking it.
fn already_defending(agent: &Agent, snap: &WorldSnapshot<'_>, id: StructureId) -> bool {
    match agent.target {
        Target::Objective(Goal::Defend { id: defended }) => defended == id,
        Target::Combat(enemy) => snap.live_enemy(enemy).is_some_and(|e| e.attacking == Some(id)),
        _ => false,
    }
}

/// Evaluate the interrupts in order.
///
/// Mutates only `agent.declined_distress`; applying the match is the
/// caller's job.
pub fn check_interrupts(
    agent: &mut Agent,
    ctx:   &TickContext<'_>,
    cfg:   &EngineConfig,
    board: &ObjectiveBoard,
    rng:   &mut StreamRng,
) -> Option<Interrupt> {
    let snap = &ctx.snap;

    if !holds_commitment(agent, snap, board, ctx.now) {
        // (a)
        if let Some(base) = snap.home_base().filter(|s| in_distress(snap, s)) {
            if already_defending(agent, snap, base.id) {
                return None;
            }
            return Some(Interrupt::DefendHomeBase(base.id));
        }

        // (b)
        let home = agent.home.and_then(|id| snap.structure(id)).filter(|s| in_distress(snap, s));
        if let Some(home) = home {
            if already_defending(agent, snap, home.id) {
                return None;
            }
            return Some(Interrupt::DefendHome(home.id));
        }

        // (c)
        if let Some(id) = neutral_distress_call(agent, ctx, cfg) {
            if rng.gen_bool(cfg.weights(agent.archetype).defend_willingness) {
                return Some(Interrupt::DefendNeutral(id));
            }
            debug!(agent = %agent.id, structure = %id, "distress call declined");
            agent.declined_distress = Some((id, ctx.now));
        }
    }

    // (d)
    if agent.state == AgentState::Idle && agent.should_go_home_to_rest(&cfg.rest) {
        if let Some(home) = agent.home.and_then(|id| snap.structure(id)).filter(|s| s.is_alive()) {
            return Some(Interrupt::GoHome(home.id));
        }
    }

    None
}

/// Nearest seen neutral building under attack within the awareness radius
/// that the agent isn't already defending and hasn't recently declined.
fn neutral_distress_call(agent: &Agent, ctx: &TickContext<'_>, cfg: &EngineConfig) -> Option<StructureId> {
    let snap = &ctx.snap;
    let ts = ctx.tile_size();
    let radius = ctx.tiles(cfg.behavior.awareness_radius_tiles);
    let recheck_ms = SimTime::from_secs(cfg.behavior.distress_recheck_secs).as_millis();

    let call = snap.nearest_structure(agent.pos, |s| {
        s.kind.is_neutral()
            && in_distress(snap, s)
            && snap.view.visibility(s.origin).is_explored()
            && s.center(ts).within(agent.pos, radius)
    })?;

    if already_defending(agent, snap, call.id) {
        return None;
    }
    let declined_recently = agent
        .declined_distress
        .is_some_and(|(id, at)| id == call.id && ctx.now.millis_since(at) < recheck_ms);
    (!declined_recently).then_some(call.id)
}
