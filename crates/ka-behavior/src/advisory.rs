//! Advisory eligibility, context building, and applying decisions.
//!
//! An agent asks for advice when its cooldown has elapsed, no request is in
//! flight, and it is either hurt in a fight or rich near a marketplace.  With
//! an advisor configured the request is submitted and the reply applied when
//! it turns up; without one the fallback table answers on the spot.
//!
//! `retreat` and `use_potion` act even under a commitment.  The other
//! actions wait until the agent holds no unexpired commitment.

use tracing::{debug, info, warn};

use ka_advisor::{Advisor, AdvisorAction, AdvisorContext, Decision, DecisionOrigin, fallback_decision};
use ka_agent::{Agent, AgentState, CommitKind, DecisionRecord, Goal, Target};
use ka_core::{AdvisorConfig, EngineConfig, SimTime, StructureId, WorldPos, streams};
use ka_nav::Pathfinder;
use ka_world::{StructureKind, WorldSnapshot};

use crate::engine::Turn;
use crate::{holds_commitment, pick_frontier, random_nearby_cell, select_objective};

/// Fighting, or a live enemy within the combat radius.
pub fn in_combat(agent: &Agent, snap: &WorldSnapshot<'_>, cfg: &AdvisorConfig) -> bool {
    agent.state == AgentState::Fighting
        || snap.nearest_enemy_within(agent.pos, cfg.combat_radius_tiles * snap.tile_size()).is_some()
}

pub fn low_health_in_combat(agent: &Agent, snap: &WorldSnapshot<'_>, cfg: &AdvisorConfig) -> bool {
    agent.health_frac() < cfg.low_health && in_combat(agent, snap, cfg)
}

fn market_in_reach(pos: WorldPos, snap: &WorldSnapshot<'_>, cfg: &AdvisorConfig) -> Option<StructureId> {
    let ts = snap.tile_size();
    snap.nearest_structure(pos, |s| s.kind == StructureKind::Marketplace)
        .filter(|m| m.center(ts).within(pos, cfg.market_radius_tiles * ts))
        .map(|m| m.id)
}

pub fn wealthy_near_market(agent: &Agent, snap: &WorldSnapshot<'_>, cfg: &AdvisorConfig) -> bool {
    agent.gold >= cfg.wealthy_gold && market_in_reach(agent.pos, snap, cfg).is_some()
}

/// Cooldown elapsed, nothing pending, and a situation worth advice.
pub fn is_eligible(agent: &Agent, snap: &WorldSnapshot<'_>, now: SimTime, cfg: &AdvisorConfig) -> bool {
    agent.advisory.cooldown_elapsed(now, cfg.cooldown_secs)
        && !agent.advisory.pending
        && (low_health_in_combat(agent, snap, cfg) || wealthy_near_market(agent, snap, cfg))
}

/// Summarize `agent`'s situation for an advisor.
pub fn build_context(agent: &Agent, snap: &WorldSnapshot<'_>, cfg: &EngineConfig) -> AdvisorContext {
    let adv = &cfg.advisor;
    let ts = snap.tile_size();
    let health = agent.health_frac();
    let nearby = adv.nearby_radius_tiles * ts;

    let can_shop = market_in_reach(agent.pos, snap, adv).is_some();
    let affordable = if can_shop {
        snap.research
            .available_items()
            .filter(|i| i.price <= agent.gold)
            .map(|i| i.name.to_owned())
            .collect()
    } else {
        Vec::new()
    };
    let near_safety = snap
        .nearest_structure(agent.pos, |s| s.kind.is_safe_haven())
        .is_some_and(|s| s.is_near(agent.pos, cfg.behavior.safe_radius_tiles, ts));

    AdvisorContext {
        agent:             agent.id,
        archetype:         agent.archetype,
        hp:                agent.hp,
        max_hp:            agent.max_hp,
        gold:              agent.gold,
        potions:           agent.potions,
        in_combat:         in_combat(agent, snap, adv),
        low_health:        health < adv.low_health,
        critical_health:   health < adv.critical_health,
        can_shop,
        affordable,
        potion_affordable: snap.research.potion().is_some_and(|p| p.price <= agent.gold),
        enemies_nearby:    snap.enemies_within(agent.pos, nearby) as u32,
        allies_nearby:     snap.allies_within(agent.id, agent.pos, nearby) as u32,
        near_safety,
    }
}

impl<P: Pathfinder> Turn<'_, '_, P> {
    /// Steps 5 and 6 of a turn: request advice if eligible, then apply any
    /// reply that has arrived.
    pub(crate) fn advisory(&mut self, agent: &mut Agent, advisor: Option<&mut (dyn Advisor + 'static)>) {
        let ctx = self.ctx;
        let cfg = self.cfg;
        let eligible = is_eligible(agent, &ctx.snap, ctx.now, &cfg.advisor);

        let Some(advisor) = advisor else {
            if eligible {
                agent.advisory.last_request = Some(ctx.now);
                let decision = fallback_decision(&build_context(agent, &ctx.snap, cfg));
                self.apply_decision(agent, &decision, DecisionOrigin::Fallback);
            }
            return;
        };

        if eligible {
            agent.advisory.last_request = Some(ctx.now);
            let request = build_context(agent, &ctx.snap, cfg);
            match advisor.submit(agent.id, request.clone()) {
                Ok(()) => {
                    agent.advisory.pending = true;
                    agent.advisory.submitted += 1;
                    self.stats.advisor_requests += 1;
                    debug!(agent = %agent.id, tick = %ctx.tick, advisor = advisor.name(), "advice requested");
                }
                Err(e) => {
                    warn!(agent = %agent.id, advisor = advisor.name(), error = %e, "advisor unavailable; using fallback");
                    let decision = fallback_decision(&request);
                    self.apply_decision(agent, &decision, DecisionOrigin::Fallback);
                }
            }
        }

        if agent.advisory.pending {
            if let Some(advice) = advisor.poll(agent.id) {
                agent.advisory.pending = false;
                self.apply_decision(agent, &advice.decision, advice.origin);
            }
        }
    }

    /// Act on `decision`.  Unknown decisions are recorded and dropped.
    pub(crate) fn apply_decision(&mut self, agent: &mut Agent, decision: &Decision, origin: DecisionOrigin) {
        let ctx = self.ctx;
        let cfg = self.cfg;
        let snap = ctx.snap;
        agent.last_decision = Some(DecisionRecord::from_decision(decision, origin, ctx.now));

        if !decision.is_known() {
            agent.advisory.ignored += 1;
            self.stats.unknown_ignored += 1;
            warn!(agent = %agent.id, %origin, reason = %decision.reason, "ignoring unknown decision");
            return;
        }

        agent.advisory.applied += 1;
        match origin {
            DecisionOrigin::Fallback => self.stats.fallback_applied += 1,
            _ => self.stats.advisor_applied += 1,
        }

        let action = decision.action;
        let overrides = matches!(action, AdvisorAction::Retreat | AdvisorAction::UsePotion);
        if !overrides && holds_commitment(agent, &snap, self.board, ctx.now) {
            debug!(agent = %agent.id, %action, "decision deferred: commitment held");
            return;
        }

        match action {
            AdvisorAction::Retreat => {
                let haven = match decision.target() {
                    Some("castle") => snap.home_base(),
                    Some("marketplace") => {
                        snap.nearest_structure(agent.pos, |s| s.kind == StructureKind::Marketplace)
                    }
                    _ => None,
                }
                .or_else(|| snap.nearest_structure(agent.pos, |s| s.kind.is_safe_haven()));
                if let Some(haven) = haven {
                    self.retarget(agent, AgentState::Retreating, Target::Objective(Goal::Retreat { to: haven.id }));
                    agent.commit.clear();
                }
            }
            AdvisorAction::UsePotion => {
                if !agent.use_potion() {
                    debug!(agent = %agent.id, "no potion to drink");
                }
            }
            AdvisorAction::Fight => {
                let current = agent.target.enemy().filter(|&e| snap.live_enemy(e).is_some());
                let foe = current.or_else(|| {
                    snap.nearest_enemy_within(agent.pos, ctx.tiles(cfg.advisor.nearby_radius_tiles))
                });
                if let Some(enemy) = foe {
                    self.engage(agent, enemy);
                }
            }
            AdvisorAction::BuyItem => {
                let market = snap.nearest_structure(agent.pos, |s| s.kind == StructureKind::Marketplace);
                if let Some(market) = market {
                    self.retarget(agent, AgentState::Moving, Target::Objective(Goal::Shop { id: market.id }));
                }
            }
            AdvisorAction::Explore => {
                if matches!(agent.target, Target::None | Target::Patrol(_)) {
                    self.explore(agent);
                }
            }
            AdvisorAction::AcceptBounty => {
                let pick = select_objective(
                    agent,
                    self.board,
                    &snap,
                    ctx.now,
                    cfg,
                    self.rngs.stream(streams::OBJECTIVE_JITTER),
                );
                if let Some(sel) = pick {
                    self.adopt(agent, sel);
                }
            }
            AdvisorAction::Unknown => {}
        }

        info!(
            agent = %agent.id,
            tick = %ctx.tick,
            %action,
            %origin,
            target = decision.target().unwrap_or(""),
            reason = %decision.reason,
            "decision applied"
        );
    }

    /// Head for a frontier tile, or a random nearby cell when the map is
    /// fully explored.
    fn explore(&mut self, agent: &mut Agent) {
        let ctx = self.ctx;
        let cfg = self.cfg;
        let snap = ctx.snap;
        let rng = self.rngs.stream(streams::EXPLORE);

        let bias = cfg.weights(agent.archetype).frontier_bias;
        let max = cfg.journey.max_frontier_candidates;
        if let Some(tile) = pick_frontier(snap.view, agent.pos, snap.frontier(), max, bias, rng) {
            self.retarget(agent, AgentState::Moving, Target::Objective(Goal::Frontier { tile }));
            agent.commit.commit(CommitKind::Frontier, ctx.now, cfg.commit.frontier_secs);
            return;
        }

        let here = snap.view.world_to_grid(agent.pos);
        if let Some(cell) = random_nearby_cell(&snap, here, cfg.behavior.wander_radius_tiles, rng) {
            self.retarget(agent, AgentState::Moving, Target::Patrol(snap.view.grid_to_world(cell)));
        }
    }
}
