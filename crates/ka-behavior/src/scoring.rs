//! Objective scoring and selection.
//!
//! # Formula
//!
//! ```text
//! score = (w_reward · √reward + affinity(kind))
//!         / (1 + w_distance · distance^1.1)
//!         − w_risk · risk
//!         + jitter
//! ```
//!
//! `distance` is in tiles and is multiplied by
//! `scoring.unexplored_multiplier` when the goal cell has never been seen.
//! `risk` is the number of live enemies within `scoring.risk_radius_tiles` of
//! the goal.  `jitter` is uniform in `[-scoring.jitter, scoring.jitter]`,
//! drawn from the objective-jitter stream once per candidate in ascending id
//! order.
//!
//! # Selection
//!
//! Candidates are objectives that are valid and available to the agent
//! (unclaimed, already its own, or held by a stale assignment).  The single
//! best candidate is adopted only if it clears `scoring.min_attractiveness`;
//! ties go to the lower id.

use ka_agent::Agent;
use ka_core::{ArchetypeWeights, EngineConfig, ObjectiveId, ScoringConfig, SimTime, StreamRng, WorldPos};
use ka_world::{Objective, ObjectiveBoard, ObjectiveKind, WorldSnapshot, WorldView};

pub const DISTANCE_EXPONENT: f32 = 1.1;

/// Coarse attractiveness bucket, for diagnostics and UI.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    Low,
    Medium,
    High,
}

impl Tier {
    pub fn of(score: f32, cfg: &ScoringConfig) -> Tier {
        if score >= cfg.tier_high {
            Tier::High
        } else if score >= cfg.tier_medium {
            Tier::Medium
        } else {
            Tier::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Low    => "low",
            Tier::Medium => "medium",
            Tier::High   => "high",
        }
    }
}

/// One row of [`evaluate_objectives`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ObjectiveEvaluation {
    pub objective:  ObjectiveId,
    pub kind:       ObjectiveKind,
    /// Agents holding a soft claim (zero or one).
    pub responders: usize,
    /// Jitter-free score for the evaluating agent.
    pub score:      f32,
    pub tier:       Tier,
}

/// The objective an agent should adopt.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Selection {
    pub objective: ObjectiveId,
    pub score:     f32,
}

#[inline]
pub fn affinity(weights: &ArchetypeWeights, kind: ObjectiveKind) -> f32 {
    match kind {
        ObjectiveKind::Explore => weights.explore_affinity,
        ObjectiveKind::Attack  => weights.attack_affinity,
        ObjectiveKind::Defend  => weights.defend_affinity,
    }
}

/// Distance in tiles, inflated when the goal lies in unexplored territory.
pub fn effective_distance(view: &dyn WorldView, from: WorldPos, goal: WorldPos, cfg: &ScoringConfig) -> f32 {
    let tiles = view.tiles_between(from, goal);
    if view.visibility(view.world_to_grid(goal)).is_explored() {
        tiles
    } else {
        tiles * cfg.unexplored_multiplier
    }
}

/// Live enemies around `goal`.
pub fn risk_near(snap: &WorldSnapshot<'_>, goal: WorldPos, cfg: &ScoringConfig) -> f32 {
    snap.enemies_within(goal, cfg.risk_radius_tiles * snap.tile_size()) as f32
}

/// The formula, without jitter.
pub fn score(weights: &ArchetypeWeights, kind: ObjectiveKind, reward: u32, distance_tiles: f32, risk: f32) -> f32 {
    let appeal = weights.reward * (reward as f32).sqrt() + affinity(weights, kind);
    let falloff = 1.0 + weights.distance * distance_tiles.max(0.0).powf(DISTANCE_EXPONENT);
    appeal / falloff - weights.risk * risk
}

/// `agent`'s jitter-free score for `obj`.
pub fn score_objective(agent: &Agent, obj: &Objective, snap: &WorldSnapshot<'_>, cfg: &EngineConfig) -> f32 {
    let distance = effective_distance(snap.view, agent.pos, obj.goal, &cfg.scoring);
    let risk = risk_near(snap, obj.goal, &cfg.scoring);
    score(cfg.weights(agent.archetype), obj.kind, obj.reward, distance, risk)
}

/// Every valid objective as `agent` would see it, in id order.
///
/// Availability is not applied here so the evaluation also shows objectives
/// other agents are already answering.
pub fn evaluate_objectives(
    agent: &Agent,
    board: &ObjectiveBoard,
    snap:  &WorldSnapshot<'_>,
    cfg:   &EngineConfig,
) -> Vec<ObjectiveEvaluation> {
    board
        .iter()
        .filter(|o| o.is_valid(snap.structures))
        .map(|o| {
            let score = score_objective(agent, o, snap, cfg);
            ObjectiveEvaluation {
                objective:  o.id,
                kind:       o.kind,
                responders: board.responders(o.id),
                score,
                tier:       Tier::of(score, &cfg.scoring),
            }
        })
        .collect()
}

/// Pick the objective `agent` should adopt at `now`, if any.
pub fn select_objective(
    agent: &Agent,
    board: &ObjectiveBoard,
    snap:  &WorldSnapshot<'_>,
    now:   SimTime,
    cfg:   &EngineConfig,
    rng:   &mut StreamRng,
) -> Option<Selection> {
    let ttl_ms = SimTime::from_secs(cfg.commit.claim_ttl_secs).as_millis();
    let mut best: Option<Selection> = None;

    for obj in board.iter() {
        if !obj.is_valid(snap.structures) || !obj.is_available_for(agent.id, now, ttl_ms) {
            continue;
        }
        let score = score_objective(agent, obj, snap, cfg) + rng.symmetric(cfg.scoring.jitter);
        if best.is_none_or(|b| score > b.score) {
            best = Some(Selection { objective: obj.id, score });
        }
    }

    best.filter(|b| b.score >= cfg.scoring.min_attractiveness)
}
