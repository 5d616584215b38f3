//! Post-purchase journeys.
//!
//! An agent that bought something recently and is at full health may set
//! off, once per cooldown, either to raid the nearest hostile structure or
//! to push into unexplored territory.  Frontier tiles are picked with weight
//! `max(distance, 1)^frontier_bias`, so archetypes with a positive bias range
//! far and those with a negative one stay close.

use tracing::{debug, info};

use ka_agent::{Agent, AgentState, CommitKind, Goal, Target};
use ka_core::{GridPos, JourneyConfig, SimTime, StreamRng, WorldPos, streams};
use ka_nav::Pathfinder;
use ka_world::WorldView;

use crate::engine::Turn;

/// Bought something within the trigger window, at full health, and not
/// cooling down from the last journey.
pub fn journey_eligible(agent: &Agent, now: SimTime, cfg: &JourneyConfig) -> bool {
    agent.is_full_health()
        && !agent.journey.in_cooldown(now)
        && agent
            .journey
            .last_purchase_at
            .is_some_and(|t| now.secs_since(t) <= cfg.trigger_window_secs)
}

/// Weighted pick among the `max` frontier tiles nearest `from`.
///
/// Candidates are ordered by (distance, cell) before truncation so the pick
/// depends only on the frontier set and the stream.
pub fn pick_frontier(
    view:     &dyn WorldView,
    from:     WorldPos,
    frontier: &[GridPos],
    max:      usize,
    bias:     f32,
    rng:      &mut StreamRng,
) -> Option<GridPos> {
    let mut candidates: Vec<(f32, GridPos)> = frontier
        .iter()
        .map(|&cell| (view.tiles_between(from, view.grid_to_world(cell)), cell))
        .collect();
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    candidates.truncate(max.max(1));

    let weights: Vec<f32> = candidates.iter().map(|&(d, _)| d.max(1.0).powf(bias)).collect();
    rng.weighted_index(&weights).map(|i| candidates[i].1)
}

impl<P: Pathfinder> Turn<'_, '_, P> {
    /// Roll for a journey.  Returns whether one started.
    pub(crate) fn try_journey(&mut self, agent: &mut Agent) -> bool {
        let ctx = self.ctx;
        let cfg = self.cfg;
        if !journey_eligible(agent, ctx.now, &cfg.journey) {
            return false;
        }
        // One roll per purchase.
        agent.journey.last_purchase_at = None;

        let weights = cfg.weights(agent.archetype);
        let snap = ctx.snap;
        let rng = self.rngs.stream(streams::JOURNEY);
        if !rng.gen_bool(weights.journey_chance) {
            debug!(agent = %agent.id, "journey roll failed");
            return false;
        }

        let frontier = snap.frontier();
        let lair = snap.nearest_structure(agent.pos, |s| s.kind.is_hostile());
        let target = match lair {
            Some(lair) if frontier.is_empty() || rng.gen_bool(weights.aggression) => {
                Goal::AttackStructure { id: lair.id }
            }
            _ => {
                let max = cfg.journey.max_frontier_candidates;
                match pick_frontier(snap.view, agent.pos, frontier, max, weights.frontier_bias, rng) {
                    Some(tile) => Goal::Frontier { tile },
                    None => return false,
                }
            }
        };

        self.retarget(agent, AgentState::Moving, Target::Objective(target));
        if matches!(target, Goal::Frontier { .. }) {
            agent.commit.commit(CommitKind::Frontier, ctx.now, cfg.commit.frontier_secs);
        }
        agent.journey.cooldown_until = Some(ctx.now.plus_secs(cfg.journey.cooldown_secs));
        agent.journey.journeys += 1;
        self.stats.journeys += 1;
        info!(agent = %agent.id, tick = %ctx.tick, goal = target.as_str(), "journey started");
        true
    }
}
