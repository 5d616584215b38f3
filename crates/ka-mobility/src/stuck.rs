//! Stuck detection and escalating recovery.
//!
//! # Detection
//!
//! Only agents whose state intends movement are watched.  Moving at least
//! `displacement_tiles` away from the last checkpoint counts as progress and
//! moves the checkpoint.  No progress for longer than `stuck_secs` raises
//! `stuck("no_progress")`.
//!
//! Progress resets the recovery ladder only once it happens more than
//! `stuck_secs + backoff_secs` after the last attempt.  Earlier movement is
//! the detour or the new path at work and leaves the count alone, so a
//! permanently blocked agent still climbs to the patrol fallback.
//!
//! # Recovery
//!
//! Attempts are counted per target identity and spaced by `backoff_secs`:
//!
//! | Attempt          | Action                                               |
//! |------------------|------------------------------------------------------|
//! | 0                | discard the cached path and search again             |
//! | 1                | detour through the first free neighbor cell          |
//! | ≥ 2 or ≥ max     | abandon the target and patrol to the default point   |
//!
//! `max_attempts` caps the soft steps: with `max_attempts = 1` the ladder is
//! replan, then patrol.  After each soft step the flag is cleared and the
//! progress timer restarts, so a still-stuck agent escalates one step per
//! `stuck_secs`.
//! The last branch always leaves a non-stuck agent with a goal.

use tracing::{debug, info};

use ka_agent::{Agent, AgentState, Target};
use ka_core::{GridPos, SimTime, StuckConfig, WorldPos};
use ka_nav::approach_point;
use ka_world::WorldSnapshot;

pub const NO_PROGRESS: &str = "no_progress";

/// What [`recover`] did.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Recovery {
    /// Not stuck.
    NotStuck,
    /// Stuck, but the previous attempt is too recent.
    CoolingDown,
    /// Cached path dropped; the next steer replans.
    Replanned,
    /// One-cell detour queued.
    Detoured(GridPos),
    /// Target abandoned for a patrol to this point.
    Abandoned(WorldPos),
}

impl Recovery {
    /// The target was forcibly replaced; the engine skips the rest of this
    /// agent's tick.
    #[inline]
    pub fn is_forced_reset(&self) -> bool {
        matches!(self, Recovery::Abandoned(_))
    }
}

/// Update `agent`'s progress checkpoint.  Returns whether it is stuck.
pub fn detect_stuck(agent: &mut Agent, now: SimTime, tile_size: f32, cfg: &StuckConfig) -> bool {
    if !agent.state.intends_movement() {
        agent.stuck.checkpoint(agent.pos, now);
        return false;
    }

    // A new target starts a fresh recovery ladder.
    let key = agent.target.key();
    if agent.stuck.attempt_key.is_some_and(|k| k != key) {
        agent.stuck.reset_attempts();
    }

    let moved = agent.pos.distance(agent.stuck.checkpoint_pos);
    if moved >= cfg.displacement_tiles * tile_size {
        if in_recovery_window(agent, now, cfg) {
            // Movement caused by the recovery itself (a detour step, a fresh
            // path) keeps the ladder where it is.
            restart_timer(agent, now);
        } else {
            agent.stuck.checkpoint(agent.pos, now);
        }
        return false;
    }

    let limit_ms = SimTime::from_secs(cfg.stuck_secs).as_millis();
    if !agent.stuck.stuck && now.millis_since(agent.stuck.checkpoint_at) > limit_ms {
        agent.stuck.raise(NO_PROGRESS);
        debug!(
            agent = %agent.id,
            target = agent.target.label(),
            moved,
            "agent stuck: no progress"
        );
    }
    agent.stuck.stuck
}

/// Take the next recovery step for a stuck agent.
pub fn recover(agent: &mut Agent, snap: &WorldSnapshot<'_>, now: SimTime, cfg: &StuckConfig) -> Recovery {
    if !agent.stuck.stuck {
        return Recovery::NotStuck;
    }
    let backoff_ms = SimTime::from_secs(cfg.backoff_secs).as_millis();
    if agent.stuck.last_attempt_at.is_some_and(|t| now.millis_since(t) < backoff_ms) {
        return Recovery::CoolingDown;
    }

    let key = agent.target.key();
    if agent.stuck.attempt_key != Some(key) {
        agent.stuck.attempts = 0;
        agent.stuck.attempt_key = Some(key);
    }
    let attempt = agent.stuck.attempts;
    agent.stuck.attempts = attempt.saturating_add(1);
    agent.stuck.last_attempt_at = Some(now);

    if attempt < 2 && attempt < cfg.max_attempts {
        let step = if attempt == 0 {
            agent.nav.clear();
            agent.nav.backoff_until = None;
            Some(Recovery::Replanned)
        } else {
            free_neighbor(agent, snap).map(|cell| {
                agent.nav.detour(snap.view.grid_to_world(cell));
                Recovery::Detoured(cell)
            })
        };
        if let Some(step) = step {
            restart_timer(agent, now);
            debug!(agent = %agent.id, attempt, recovery = ?step, "stuck recovery");
            return step;
        }
    }

    let patrol = default_patrol(agent, snap);
    agent.go(AgentState::Moving, Target::Patrol(patrol));
    agent.commit.clear();
    agent.stuck.checkpoint(agent.pos, now);
    agent.stuck.forced_resets += 1;
    info!(agent = %agent.id, attempt, x = patrol.x, y = patrol.y, "stuck recovery: target abandoned, patrolling");
    Recovery::Abandoned(patrol)
}

/// Whether the last recovery attempt is recent enough that progress may be
/// its own doing: within `stuck_secs + backoff_secs` of it.
fn in_recovery_window(agent: &Agent, now: SimTime, cfg: &StuckConfig) -> bool {
    let window_ms = SimTime::from_secs(cfg.stuck_secs + cfg.backoff_secs).as_millis();
    agent.stuck.last_attempt_at.is_some_and(|t| now.millis_since(t) <= window_ms)
}

/// Clear the flag and restart the progress timer, keeping the attempt count.
fn restart_timer(agent: &mut Agent, now: SimTime) {
    agent.stuck.clear_flag();
    agent.stuck.checkpoint_pos = agent.pos;
    agent.stuck.checkpoint_at = now;
}

/// First walkable, unoccupied neighbor of the agent's cell in the fixed
/// neighbor order.
fn free_neighbor(agent: &Agent, snap: &WorldSnapshot<'_>) -> Option<GridPos> {
    let here = snap.view.world_to_grid(agent.pos);
    let occ = snap.occupancy();
    here.neighbors8().find(|&c| snap.view.is_walkable(c) && !occ.is_blocked(c))
}

/// Where an agent goes after giving up: next to the home base, or back to
/// its spawn point when there is none.
pub fn default_patrol(agent: &Agent, snap: &WorldSnapshot<'_>) -> WorldPos {
    match snap.home_base() {
        Some(base) => approach_point(snap.view, snap.occupancy(), base, agent.pos),
        None => agent.spawn,
    }
}
