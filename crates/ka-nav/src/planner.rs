//! Per-agent path cache and the replan policy around it.
//!
//! # Replan policy
//!
//! 1. Goal farther than `direct_move_tiles` → drop any path and steer
//!    straight at the goal.  Long hauls don't pay for a search.
//! 2. Cached path non-empty and built for the same goal cell → keep it.
//! 3. Otherwise search, unless a recent failure's backoff is still running,
//!    in which case steer directly.  A failure arms the backoff.
//!
//! A cached path whose goal cell differs from the current goal is stale and
//! is discarded before anything reads it.

use std::collections::VecDeque;

use tracing::debug;

use ka_core::{GridPos, NavConfig, SimTime, WorldPos};
use ka_world::{Occupancy, WorldView};

use crate::astar::{Pathfinder, snap_to_passable};

/// How the movement phase should move the agent this tick.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub enum Steering {
    /// Stand still.
    #[default]
    Hold,
    /// Consume the cached waypoints.
    FollowPath,
    /// Head straight for the point, ignoring obstacles.
    Direct(WorldPos),
}

/// Cached navigation state owned by one agent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavState {
    /// Remaining waypoints, consumed front to back.
    pub waypoints:     VecDeque<WorldPos>,
    /// Goal cell the cached waypoints lead to.
    pub path_goal:     Option<GridPos>,
    pub steering:      Steering,
    /// No new search before this time.
    pub backoff_until: Option<SimTime>,
}

impl NavState {
    /// Forget the cached path and stop.
    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.path_goal = None;
        self.steering = Steering::Hold;
    }

    #[inline]
    pub fn has_path(&self) -> bool {
        !self.waypoints.is_empty()
    }

    #[inline]
    pub fn path_len(&self) -> usize {
        self.waypoints.len()
    }

    /// Whether a search is suppressed at `now`.
    #[inline]
    pub fn in_backoff(&self, now: SimTime) -> bool {
        self.backoff_until.is_some_and(|t| now < t)
    }

    /// Put a single detour waypoint in front of the current goal.  The goal
    /// cell is kept so the detour isn't discarded as stale.
    pub fn detour(&mut self, via: WorldPos) {
        self.waypoints.clear();
        self.waypoints.push_back(via);
        self.steering = Steering::FollowPath;
    }
}

/// Counters for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavStats {
    pub searches:     u64,
    pub failures:     u64,
    pub expansions:   u64,
    pub direct_moves: u64,
}

/// Make sure `nav` can take the agent at `from` towards `goal`.
///
/// Returns the steering mode and stores it on `nav`.
#[allow(clippy::too_many_arguments)]
pub fn steer_towards(
    pathfinder: &dyn Pathfinder,
    nav:        &mut NavState,
    view:       &dyn WorldView,
    occupancy:  &Occupancy,
    from:       WorldPos,
    goal:       WorldPos,
    now:        SimTime,
    cfg:        &NavConfig,
    stats:      &mut NavStats,
) -> Steering {
    if view.tiles_between(from, goal) > cfg.direct_move_tiles {
        nav.waypoints.clear();
        nav.path_goal = None;
        stats.direct_moves += 1;
        nav.steering = Steering::Direct(goal);
        return nav.steering;
    }

    let raw_goal = view.world_to_grid(goal);
    let Some(goal_cell) = snap_to_passable(view, occupancy, raw_goal, cfg.goal_snap_radius)
        .or_else(|| occupancy.is_blocked(raw_goal).then_some(raw_goal))
    else {
        nav.clear();
        nav.steering = Steering::Direct(goal);
        return nav.steering;
    };

    if nav.path_goal != Some(goal_cell) {
        nav.waypoints.clear();
        nav.path_goal = None;
    }
    if nav.has_path() {
        nav.steering = Steering::FollowPath;
        return nav.steering;
    }

    if nav.in_backoff(now) {
        stats.direct_moves += 1;
        nav.steering = Steering::Direct(goal);
        return nav.steering;
    }

    let start = view.world_to_grid(from);
    stats.searches += 1;
    match pathfinder.find_path(view, occupancy, start, goal_cell) {
        Ok(path) => {
            stats.expansions += path.expansions as u64;
            nav.waypoints = path
                .cells
                .iter()
                .skip(1)
                .map(|&c| view.grid_to_world(c))
                .collect();
            // Finish on the exact point when the goal wasn't snapped.
            if goal_cell == raw_goal {
                nav.waypoints.pop_back();
                nav.waypoints.push_back(goal);
            }
            nav.path_goal = Some(goal_cell);
            nav.backoff_until = None;
            nav.steering = Steering::FollowPath;
        }
        Err(e) => {
            stats.failures += 1;
            stats.expansions += e.expansions() as u64;
            let until = now.plus_secs(cfg.replan_backoff_secs);
            debug!(error = %e, backoff_until = %until, "path search failed; steering directly");
            nav.waypoints.clear();
            nav.path_goal = Some(goal_cell);
            nav.backoff_until = Some(until);
            stats.direct_moves += 1;
            nav.steering = Steering::Direct(goal);
        }
    }
    nav.steering
}
