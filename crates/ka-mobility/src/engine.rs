//! Steering and per-tick movement.

use ka_agent::Agent;
use ka_core::{NavConfig, SimTime, WorldPos};
use ka_nav::{AStarPathfinder, NavStats, Pathfinder, Steering, follow_path, steer_towards, step_towards};
use ka_world::{Occupancy, WorldView, WorldSnapshot};

/// Result of one movement step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MoveOutcome {
    /// Not asked to move.
    Held,
    Moved { from: WorldPos, to: WorldPos },
    /// The next step would enter an impassable cell; the agent stays put.
    Blocked,
}

/// Wraps a [`Pathfinder`] and the search counters.
///
/// `P` is fixed at compile time, defaulting to the bounded A*.
pub struct MobilityEngine<P: Pathfinder = AStarPathfinder> {
    pub pathfinder: P,
    pub stats:      NavStats,
}

impl Default for MobilityEngine<AStarPathfinder> {
    fn default() -> Self {
        Self::new(AStarPathfinder::default())
    }
}

impl<P: Pathfinder> MobilityEngine<P> {
    pub fn new(pathfinder: P) -> Self {
        Self { pathfinder, stats: NavStats::default() }
    }

    /// Point `agent`'s navigation at `goal` (see [`steer_towards`]).
    pub fn steer(
        &mut self,
        agent: &mut Agent,
        goal:  WorldPos,
        snap:  &WorldSnapshot<'_>,
        now:   SimTime,
        cfg:   &NavConfig,
    ) -> Steering {
        steer_towards(
            &self.pathfinder,
            &mut agent.nav,
            snap.view,
            snap.occupancy(),
            agent.pos,
            goal,
            now,
            cfg,
            &mut self.stats,
        )
    }

    /// Move `agent` for `dt_secs` according to its steering.
    ///
    /// Only states that intend movement move.  A step never ends inside an
    /// unwalkable or occupied cell other than the one holding the goal, so a
    /// walled-off goal leaves the agent pressed against the wall where stuck
    /// detection will see it.
    pub fn advance(&self, agent: &mut Agent, snap: &WorldSnapshot<'_>, dt_secs: f32, cfg: &NavConfig) -> MoveOutcome {
        if !agent.state.intends_movement() || dt_secs <= 0.0 {
            return MoveOutcome::Held;
        }
        let max_step = agent.speed * dt_secs;
        let from = agent.pos;

        let to = match agent.nav.steering {
            Steering::Hold => return MoveOutcome::Held,
            Steering::FollowPath => {
                let Some(&next) = agent.nav.waypoints.front() else {
                    return MoveOutcome::Held;
                };
                let goal = agent.nav.waypoints.back().copied().unwrap_or(next);
                let (probe, _) = step_towards(from, next, max_step);
                if !can_enter(snap.view, snap.occupancy(), from, probe, goal) {
                    // The world changed under the path.
                    agent.nav.clear();
                    return MoveOutcome::Blocked;
                }
                follow_path(&mut agent.nav.waypoints, from, max_step, cfg.arrive_radius)
            }
            Steering::Direct(goal) => {
                let (to, _) = step_towards(from, goal, max_step);
                if !can_enter(snap.view, snap.occupancy(), from, to, goal) {
                    return MoveOutcome::Blocked;
                }
                to
            }
        };

        agent.pos = to;
        MoveOutcome::Moved { from, to }
    }
}

/// Whether a step from `from` may end at `to` when heading for `goal`.
fn can_enter(view: &dyn WorldView, occ: &Occupancy, from: WorldPos, to: WorldPos, goal: WorldPos) -> bool {
    let cell = view.world_to_grid(to);
    if cell == view.world_to_grid(from) || cell == view.world_to_grid(goal) {
        return true;
    }
    view.is_walkable(cell) && !occ.is_blocked(cell)
}
