//! Combat resolution, run once per tick after movement.
//!
//! Blows land only on strike ticks.  Agents swing first in ascending id
//! order, then enemies in ascending id order, so an enemy killed this tick
//! does not answer.  An enemy that is hit while doing nothing else starts
//! chasing its attacker; enemies never move on their own.

use tracing::{debug, info};

use ka_agent::{AgentState, AgentStore, Target};
use ka_core::{AgentId, EnemyId, Tick};
use ka_world::{World, WorldView};

use crate::SimRules;

/// What happened in one combat phase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CombatReport {
    /// Blows landed by agents on enemies.
    pub agent_hits:     u32,
    /// Blows landed by enemies on agents.
    pub enemy_hits:     u32,
    /// Blows landed by enemies on structures.
    pub structure_hits: u32,
    pub slain:          Vec<EnemyId>,
    pub fallen:         Vec<AgentId>,
}

/// Resolve one strike tick.  Call only when
/// [`SimRules::is_strike_tick`] holds.
pub fn resolve_combat(agents: &mut AgentStore, world: &mut World, rules: &SimRules, tick: Tick) -> CombatReport {
    let mut report = CombatReport::default();
    agents_strike(agents, world, rules, tick, &mut report);
    enemies_strike(agents, world, rules, tick, &mut report);
    report
}

fn agents_strike(agents: &mut AgentStore, world: &mut World, rules: &SimRules, tick: Tick, report: &mut CombatReport) {
    for agent in agents.iter_mut() {
        if !agent.is_alive() || agent.state != AgentState::Fighting {
            continue;
        }
        let Target::Combat(id) = agent.target else { continue };
        let Some(enemy) = world.enemy_mut(id).filter(|e| e.is_alive()) else { continue };
        if !enemy.pos.within(agent.pos, agent.attack_range) {
            continue;
        }

        enemy.hp = enemy.hp.saturating_sub(agent.attack());
        report.agent_hits += 1;
        if enemy.chasing.is_none() && enemy.attacking.is_none() {
            enemy.chasing = Some(agent.id);
        }
        if !enemy.is_alive() {
            enemy.chasing = None;
            enemy.attacking = None;
            agent.gold += rules.gold_per_kill;
            report.slain.push(id);
            info!(agent = %agent.id, enemy = %id, %tick, gold = rules.gold_per_kill, "enemy slain");
        }
    }
}

fn enemies_strike(agents: &mut AgentStore, world: &mut World, rules: &SimRules, tick: Tick, report: &mut CombatReport) {
    let ts = world.map.tile_size();
    let reach = rules.enemy_reach_tiles * ts;
    let World { enemies, structures, .. } = world;

    for enemy in enemies.iter_mut().filter(|e| e.is_alive()) {
        if let Some(victim) = enemy.chasing {
            let Some(agent) = agents.get_mut(victim).filter(|a| a.is_alive()) else {
                enemy.chasing = None;
                continue;
            };
            if agent.pos.within(enemy.pos, reach) {
                report.enemy_hits += 1;
                if agent.take_damage(enemy.attack) {
                    enemy.chasing = None;
                    report.fallen.push(victim);
                    info!(agent = %victim, enemy = %enemy.id, %tick, "agent fell");
                }
            }
            continue;
        }

        let Some(sid) = enemy.attacking else { continue };
        let Some(structure) = structures.iter_mut().find(|s| s.id == sid && s.is_alive()) else {
            enemy.attacking = None;
            continue;
        };
        if structure.is_near(enemy.pos, rules.enemy_reach_tiles, ts) {
            structure.hp = structure.hp.saturating_sub(enemy.attack);
            report.structure_hits += 1;
            if !structure.is_alive() {
                enemy.attacking = None;
                info!(structure = %sid, kind = structure.kind.as_str(), enemy = %enemy.id, %tick, "structure destroyed");
            } else {
                debug!(structure = %sid, hp = structure.hp, enemy = %enemy.id, "structure hit");
            }
        }
    }
}
