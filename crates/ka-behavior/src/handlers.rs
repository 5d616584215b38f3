//! State handlers and the target bookkeeping they share.
//!
//! | State        | Handler behavior                                              |
//! |--------------|---------------------------------------------------------------|
//! | `Idle`       | adopt an objective, else engage, else journey, else wander    |
//! | `Moving`     | re-check the target, arrive, divert into combat, steer        |
//! | `Fighting`   | drop a dead target, chase one out of range                    |
//! | `Retreating` | head for the nearest safe haven; drink once safe and hurt     |
//! | `Shopping`   | buy one item at the marketplace, then go idle                 |
//! | `Resting`    | heal over time at home until full or capped                   |

use tracing::{debug, info};

use ka_agent::{Agent, AgentState, CommitKind, Goal, Target};
use ka_core::{BehaviorConfig, EnemyId, GridPos, ObjectiveId, SimTime, StreamRng, WorldPos, streams};
use ka_nav::{Pathfinder, approach_point};
use ka_world::{ItemKind, Research, ShopItem, Structure, StructureKind, WorldSnapshot};

use crate::engine::Turn;
use crate::{Selection, Tier, holds_commitment, select_objective};

/// Structure goals count as reached within this many tiles of the footprint.
const STRUCTURE_REACH_TILES: f32 = 1.5;
/// Point goals count as reached within this many tiles.
const POINT_REACH_TILES: f32 = 0.5;
/// Cells drawn when looking for somewhere to wander before giving up.
const WANDER_TRIES: usize = 8;

/// What a shopper buys, if anything: a potion when hurt or out of them,
/// otherwise the strongest affordable upgrade on sale (catalog order breaks
/// ties).
pub fn choose_purchase(agent: &Agent, research: &Research, cfg: &BehaviorConfig) -> Option<&'static ShopItem> {
    let wants_potion = agent.health_frac() < cfg.shop_potion_health || agent.potions == 0;
    if wants_potion && agent.potions < cfg.max_potions {
        if let Some(potion) = research.potion().filter(|p| p.price <= agent.gold) {
            return Some(potion);
        }
    }
    research
        .available_items()
        .filter(|i| i.kind != ItemKind::Potion && i.price <= agent.gold && agent.is_upgrade(i))
        .fold(None, |best: Option<&'static ShopItem>, item| match best {
            Some(b) if b.power >= item.power => Some(b),
            _ => Some(item),
        })
}

/// A random walkable, unoccupied cell within `radius` of `here`, other than
/// `here` itself.
pub fn random_nearby_cell(snap: &WorldSnapshot<'_>, here: GridPos, radius: i32, rng: &mut StreamRng) -> Option<GridPos> {
    let r = radius.max(1);
    let occ = snap.occupancy();
    (0..WANDER_TRIES)
        .map(|_| here.offset(rng.gen_range(-r..=r), rng.gen_range(-r..=r)))
        .find(|&c| c != here && snap.view.is_walkable(c) && !occ.is_blocked(c))
}

impl<P: Pathfinder> Turn<'_, '_, P> {
    /// Run the handler for the agent's state.  A handler that starts a
    /// movement hands straight over to the movement handler so the agent
    /// steers this tick.
    pub(crate) fn dispatch(&mut self, agent: &mut Agent) {
        let before = agent.state;
        self.handle(agent);
        if agent.state != before && agent.state.intends_movement() {
            self.handle(agent);
        }
    }

    fn handle(&mut self, agent: &mut Agent) {
        match agent.state {
            AgentState::Idle       => self.idle(agent),
            AgentState::Moving     => self.moving(agent),
            AgentState::Fighting   => self.fighting(agent),
            AgentState::Retreating => self.retreating(agent),
            AgentState::Shopping   => self.shopping(agent),
            AgentState::Resting    => self.resting(agent),
            AgentState::Dead       => {}
        }
    }

    // ── Target bookkeeping ────────────────────────────────────────────────

    /// Replace state and target, releasing the soft claim and commitment
    /// window the old target held.
    pub(crate) fn retarget(&mut self, agent: &mut Agent, state: AgentState, target: Target) {
        let old = agent.target;
        if old.key() != target.key() {
            if let Some(id) = old.bounty() {
                self.board.release(id, agent.id);
                agent.commit.release(CommitKind::Bounty);
            }
            match old {
                Target::Combat(_) => agent.commit.release(CommitKind::Combat),
                Target::Objective(Goal::Frontier { .. }) => agent.commit.release(CommitKind::Frontier),
                _ => {}
            }
        }
        agent.go(state, target);
    }

    fn abandon(&mut self, agent: &mut Agent, why: &'static str) {
        self.stats.abandoned += 1;
        debug!(agent = %agent.id, target = agent.target.label(), why, "target abandoned");
        self.retarget(agent, AgentState::Idle, Target::None);
    }

    /// Take objective `sel`: soft-claim it and open the bounty window.
    /// Re-adopting the current objective refreshes both.
    pub(crate) fn adopt(&mut self, agent: &mut Agent, sel: Selection) {
        let now = self.ctx.now;
        let Some(obj) = self.board.get(sel.objective) else { return };
        let (id, kind, goal) = (obj.id, obj.kind, obj.goal);
        let switched = agent.target.bounty() != Some(id);

        self.retarget(agent, AgentState::Moving, Target::Objective(Goal::Bounty { id, kind, at: goal }));
        if let Err(e) = self.board.assign(id, agent.id, now) {
            debug!(agent = %agent.id, error = %e, "assignment failed");
        }
        agent.commit.commit(CommitKind::Bounty, now, self.cfg.commit.bounty_secs);

        if switched {
            self.stats.adopted += 1;
            info!(
                agent = %agent.id,
                tick = %self.ctx.tick,
                objective = %id,
                kind = kind.as_str(),
                score = sel.score,
                tier = Tier::of(sel.score, &self.cfg.scoring).as_str(),
                "objective adopted"
            );
        }
    }

    /// Fight `enemy`, opening the combat window when it is a new target.
    pub(crate) fn engage(&mut self, agent: &mut Agent, enemy: EnemyId) {
        let Some(foe) = self.ctx.snap.live_enemy(enemy) else { return };
        let in_range = foe.pos.within(agent.pos, agent.attack_range);
        let fresh = agent.target != Target::Combat(enemy);

        let state = if in_range { AgentState::Fighting } else { AgentState::Moving };
        self.retarget(agent, state, Target::Combat(enemy));
        if in_range {
            agent.nav.clear();
        }
        if fresh {
            agent.commit.commit(CommitKind::Combat, self.ctx.now, self.cfg.commit.combat_secs);
            debug!(agent = %agent.id, %enemy, in_range, "engaging");
        }
    }

    /// Where the current target is, or `None` once it is no longer worth
    /// pursuing.
    fn goal_point(&self, agent: &Agent) -> Option<WorldPos> {
        let snap = self.ctx.snap;
        match agent.target {
            Target::None => None,
            Target::Combat(enemy) => snap.live_enemy(enemy).map(|e| e.pos),
            Target::Patrol(p) => Some(p),
            Target::Objective(Goal::Bounty { id, .. }) => {
                let obj = self.board.get(id).filter(|o| o.is_valid(snap.structures))?;
                let goal_blocked = snap.occupancy().is_blocked(snap.view.world_to_grid(obj.goal));
                match obj.target.and_then(|s| snap.structure(s)) {
                    Some(s) if goal_blocked => Some(self.approach(s, agent.pos)),
                    _ => Some(obj.goal),
                }
            }
            Target::Objective(Goal::Frontier { tile }) => Some(snap.view.grid_to_world(tile)),
            Target::Objective(goal) => {
                let s = goal.structure().and_then(|id| snap.structure(id)).filter(|s| s.is_alive())?;
                Some(self.approach(s, agent.pos))
            }
        }
    }

    fn approach(&self, s: &Structure, from: WorldPos) -> WorldPos {
        approach_point(self.ctx.snap.view, self.ctx.snap.occupancy(), s, from)
    }

    fn has_arrived(&self, agent: &Agent, goal: WorldPos) -> bool {
        let snap = self.ctx.snap;
        let ts = self.ctx.tile_size();
        let at_point = agent.pos.within(goal, POINT_REACH_TILES * ts);
        match agent.target {
            Target::Combat(_) => agent.pos.within(goal, agent.attack_range),
            Target::Objective(Goal::Bounty { .. }) => {
                agent.pos.within(goal, self.cfg.behavior.claim_radius_tiles * ts)
            }
            Target::Objective(Goal::Frontier { tile }) => {
                at_point || snap.view.visibility(tile).is_explored()
            }
            Target::Objective(goal_kind) => {
                at_point
                    || goal_kind
                        .structure()
                        .and_then(|id| snap.structure(id))
                        .is_some_and(|s| s.is_near(agent.pos, STRUCTURE_REACH_TILES, ts))
            }
            Target::Patrol(_) | Target::None => at_point,
        }
    }

    pub(crate) fn steer(&mut self, agent: &mut Agent, goal: WorldPos) {
        self.mobility.steer(agent, goal, &self.ctx.snap, self.ctx.now, &self.cfg.nav);
    }

    // ── Idle ──────────────────────────────────────────────────────────────

    fn idle(&mut self, agent: &mut Agent) {
        let ctx = self.ctx;
        let cfg = self.cfg;

        let pick = select_objective(
            agent,
            self.board,
            &ctx.snap,
            ctx.now,
            cfg,
            self.rngs.stream(streams::OBJECTIVE_JITTER),
        );
        if let Some(sel) = pick {
            self.adopt(agent, sel);
            return;
        }

        let engage_radius = ctx.tiles(cfg.behavior.engage_radius_tiles);
        if let Some(enemy) = ctx.snap.nearest_enemy_within(agent.pos, engage_radius) {
            self.engage(agent, enemy);
            return;
        }

        if self.try_journey(agent) {
            return;
        }

        self.wander(agent);
    }

    fn wander(&mut self, agent: &mut Agent) {
        let snap = self.ctx.snap;
        let cfg = self.cfg;
        let behavior = &cfg.behavior;
        let rng = self.rngs.stream(streams::IDLE_WANDER);
        if !rng.gen_bool(behavior.wander_chance) {
            return;
        }
        let here = snap.view.world_to_grid(agent.pos);
        if let Some(cell) = random_nearby_cell(&snap, here, behavior.wander_radius_tiles, rng) {
            self.retarget(agent, AgentState::Moving, Target::Patrol(snap.view.grid_to_world(cell)));
        }
    }

    // ── Moving ────────────────────────────────────────────────────────────

    fn moving(&mut self, agent: &mut Agent) {
        if agent.target.bounty().is_some() {
            self.reconsider_bounty(agent);
            if agent.state != AgentState::Moving {
                return;
            }
        }

        let Some(goal) = self.goal_point(agent) else {
            self.abandon(agent, "target invalid");
            return;
        };
        if self.has_arrived(agent, goal) {
            self.arrive(agent);
            return;
        }

        // Going home never diverts into combat.
        let going_home = matches!(agent.target, Target::Objective(Goal::GoingHome { .. }));
        if !going_home && self.divert_to_combat(agent) {
            return;
        }

        self.steer(agent, goal);
    }

    /// Once the bounty window lapses, selection runs again and may switch.
    fn reconsider_bounty(&mut self, agent: &mut Agent) {
        let ctx = self.ctx;
        let cfg = self.cfg;
        let Some(current) = agent.target.bounty() else { return };
        if agent.commit.is_active(CommitKind::Bounty, ctx.now) {
            return;
        }

        let pick = select_objective(
            agent,
            self.board,
            &ctx.snap,
            ctx.now,
            cfg,
            self.rngs.stream(streams::OBJECTIVE_JITTER),
        );
        if let Some(sel) = pick {
            if sel.objective != current {
                debug!(agent = %agent.id, from = %current, to = %sel.objective, "switching objective");
            }
            self.adopt(agent, sel);
            return;
        }

        let ttl_ms = SimTime::from_secs(cfg.commit.claim_ttl_secs).as_millis();
        let still_mine = self
            .board
            .get(current)
            .is_some_and(|o| o.is_valid(ctx.snap.structures) && o.is_available_for(agent.id, ctx.now, ttl_ms));
        if still_mine {
            if let Err(e) = self.board.assign(current, agent.id, ctx.now) {
                debug!(agent = %agent.id, error = %e, "assignment failed");
            }
            agent.commit.commit(CommitKind::Bounty, ctx.now, cfg.commit.bounty_secs);
        } else {
            self.abandon(agent, "objective taken");
        }
    }

    fn arrive(&mut self, agent: &mut Agent) {
        match agent.target {
            Target::Combat(_) => {
                agent.state = AgentState::Fighting;
                agent.nav.clear();
            }
            Target::Objective(Goal::GoingHome { .. }) => {
                agent.start_resting(self.ctx.now, &self.cfg.rest);
                debug!(agent = %agent.id, hp = agent.hp, "resting at home");
            }
            Target::Objective(Goal::Bounty { id, .. }) => self.claim(agent, id),
            Target::Objective(Goal::Shop { .. }) => {
                agent.state = AgentState::Shopping;
                agent.nav.clear();
            }
            Target::Objective(Goal::Defend { id }) => {
                let (snap, pos) = (self.ctx.snap, agent.pos);
                let attacker = snap
                    .attackers_of(id)
                    .min_by(|a, b| a.pos.distance_sq(pos).total_cmp(&b.pos.distance_sq(pos)));
                match attacker {
                    Some(enemy) => self.engage(agent, enemy.id),
                    None => self.retarget(agent, AgentState::Idle, Target::None),
                }
            }
            _ => self.retarget(agent, AgentState::Idle, Target::None),
        }
    }

    fn claim(&mut self, agent: &mut Agent, id: ObjectiveId) {
        match self.board.claim(id, agent.id) {
            Ok(reward) => {
                agent.gold += reward;
                self.stats.claimed += 1;
                info!(agent = %agent.id, tick = %self.ctx.tick, objective = %id, reward, "objective claimed");
            }
            Err(e) => debug!(agent = %agent.id, error = %e, "claim failed"),
        }
        self.retarget(agent, AgentState::Idle, Target::None);
    }

    /// An enemy within attack range becomes the combat target unless an
    /// unexpired commitment holds a still-valid one.
    fn divert_to_combat(&mut self, agent: &mut Agent) -> bool {
        let snap = self.ctx.snap;
        let Some(enemy) = snap.nearest_enemy_within(agent.pos, agent.attack_range) else {
            return false;
        };
        if holds_commitment(agent, &snap, self.board, self.ctx.now) {
            return false;
        }
        self.engage(agent, enemy);
        true
    }

    // ── Fighting ──────────────────────────────────────────────────────────

    fn fighting(&mut self, agent: &mut Agent) {
        let foe = agent.target.enemy().and_then(|id| self.ctx.snap.live_enemy(id));
        let Some(foe) = foe else {
            debug!(agent = %agent.id, "combat target gone");
            self.retarget(agent, AgentState::Idle, Target::None);
            return;
        };
        if !foe.pos.within(agent.pos, agent.attack_range) {
            agent.state = AgentState::Moving;
        }
    }

    // ── Retreating ────────────────────────────────────────────────────────

    fn retreating(&mut self, agent: &mut Agent) {
        let snap = self.ctx.snap;
        let ts = self.ctx.tile_size();
        let cfg = self.cfg;
        let behavior = &cfg.behavior;

        let chosen = match agent.target {
            Target::Objective(Goal::Retreat { to }) => snap.structure(to).filter(|s| s.is_alive()),
            _ => None,
        };
        let Some(haven) = chosen.or_else(|| snap.nearest_structure(agent.pos, |s| s.kind.is_safe_haven())) else {
            self.retarget(agent, AgentState::Idle, Target::None);
            return;
        };

        if haven.is_near(agent.pos, behavior.safe_radius_tiles, ts) {
            self.retarget(agent, AgentState::Idle, Target::None);
            if agent.health_frac() < behavior.retreat_potion_health && agent.use_potion() {
                debug!(agent = %agent.id, hp = agent.hp, "safe: drank a potion");
            }
            return;
        }

        let target = Target::Objective(Goal::Retreat { to: haven.id });
        if agent.target != target {
            self.retarget(agent, AgentState::Retreating, target);
        }
        let goal = self.approach(haven, agent.pos);
        self.steer(agent, goal);
    }

    // ── Shopping ──────────────────────────────────────────────────────────

    fn shopping(&mut self, agent: &mut Agent) {
        let snap = self.ctx.snap;
        let ts = self.ctx.tile_size();
        let cfg = self.cfg;
        let reach = cfg.behavior.safe_radius_tiles;
        let near = |s: &&Structure| s.is_alive() && s.is_near(agent.pos, reach, ts);

        let chosen = match agent.target {
            Target::Objective(Goal::Shop { id }) => snap.structure(id).filter(near),
            _ => None,
        };
        let market = chosen.or_else(|| {
            snap.nearest_structure(agent.pos, |s| s.kind == StructureKind::Marketplace)
                .filter(near)
        });

        if market.is_some() {
            if let Some(item) = choose_purchase(agent, snap.research, &cfg.behavior) {
                if agent.buy(item, cfg.behavior.max_potions) {
                    agent.journey.last_purchase_at = Some(self.ctx.now);
                    self.stats.purchases += 1;
                    info!(agent = %agent.id, item = item.name, price = item.price, gold = agent.gold, "purchase");
                }
            }
        }
        self.retarget(agent, AgentState::Idle, Target::None);
    }

    // ── Resting ───────────────────────────────────────────────────────────

    /// Heal `heal_per_interval` every `heal_interval_secs` until full or the
    /// per-rest cap; leave early when home is attacked or the agent has been
    /// moved away from it.
    pub(crate) fn resting(&mut self, agent: &mut Agent) {
        let snap = self.ctx.snap;
        let now = self.ctx.now;
        let cfg = self.cfg;
        let rest = &cfg.rest;

        let Some(home) = agent.home.and_then(|id| snap.structure(id)).filter(|s| s.is_alive()) else {
            agent.finish_resting();
            return;
        };
        if snap.is_under_attack(home.id) {
            info!(agent = %agent.id, home = %home.id, "home attacked; leaving rest");
            agent.finish_resting();
            return;
        }
        if !home.is_near(agent.pos, rest.home_radius_tiles, self.ctx.tile_size()) {
            debug!(agent = %agent.id, "displaced from home; leaving rest");
            agent.finish_resting();
            return;
        }

        let step_ms = SimTime::from_secs(rest.heal_interval_secs).as_millis().max(1);
        while now >= agent.rest.next_heal_at
            && !agent.is_full_health()
            && agent.rest.healed_this_rest < rest.heal_cap
        {
            let before = agent.hp;
            agent.heal(rest.heal_per_interval.min(rest.heal_cap - agent.rest.healed_this_rest));
            agent.rest.healed_this_rest += agent.hp - before;
            agent.rest.next_heal_at = agent.rest.next_heal_at.plus_ms(step_ms);
        }

        if agent.is_full_health() || agent.rest.healed_this_rest >= rest.heal_cap {
            debug!(agent = %agent.id, hp = agent.hp, healed = agent.rest.healed_this_rest, "done resting");
            agent.finish_resting();
        }
    }
}
