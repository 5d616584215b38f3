//! Kinematic helpers: straight-line stepping and waypoint following.

use std::collections::VecDeque;

use ka_core::WorldPos;

/// Move from `pos` towards `target` by at most `max_step` world units.
///
/// Returns the new position and whether `target` was reached.
pub fn step_towards(pos: WorldPos, target: WorldPos, max_step: f32) -> (WorldPos, bool) {
    let dist = pos.distance(target);
    if dist <= max_step || dist <= f32::EPSILON {
        return (target, true);
    }
    let t = max_step.max(0.0) / dist;
    let next = WorldPos::new(pos.x + (target.x - pos.x) * t, pos.y + (target.y - pos.y) * t);
    (next, false)
}

/// Advance along `waypoints` by one step of `max_step`.
///
/// The front waypoint is consumed once the agent is within `arrive_radius`
/// of it.  Returns the new position; an empty queue leaves `pos` unchanged.
pub fn follow_path(
    waypoints:     &mut VecDeque<WorldPos>,
    pos:           WorldPos,
    max_step:      f32,
    arrive_radius: f32,
) -> WorldPos {
    let Some(&next) = waypoints.front() else {
        return pos;
    };
    let (moved, reached) = step_towards(pos, next, max_step);
    if reached || moved.within(next, arrive_radius) {
        waypoints.pop_front();
    }
    moved
}
