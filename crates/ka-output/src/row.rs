//! Plain data row types written by output backends.

use ka_agent::Agent;
use ka_core::{SimTime, Tick};
use ka_sim::TickSummary;

/// One agent's state at a snapshot tick.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSnapshotRow {
    pub agent_id:        u32,
    pub tick:            u64,
    pub time_ms:         u64,
    pub x:               f32,
    pub y:               f32,
    pub state:           &'static str,
    /// Kind of target: `none`, `combat`, `bounty`, `patrol`, …
    pub target:          &'static str,
    pub intent:          &'static str,
    pub hp:              u32,
    pub gold:            u32,
    pub potions:         u32,
    pub stuck_events:    u32,
    /// Most recent advisory decision; empty if none yet.
    pub decision:        &'static str,
    /// `advisor` or `fallback`; empty if no decision yet.
    pub decision_origin: &'static str,
}

impl AgentSnapshotRow {
    pub fn from_agent(tick: Tick, now: SimTime, agent: &Agent) -> Self {
        let (decision, decision_origin) = agent
            .last_decision
            .as_ref()
            .map_or(("", ""), |d| (d.action.as_str(), d.origin.as_str()));
        Self {
            agent_id: agent.id.0,
            tick: tick.0,
            time_ms: now.as_millis(),
            x: agent.pos.x,
            y: agent.pos.y,
            state: agent.state.as_str(),
            target: agent.target.label(),
            intent: agent.intent,
            hp: agent.hp,
            gold: agent.gold,
            potions: agent.potions,
            stuck_events: agent.stuck.stuck_events,
            decision,
            decision_origin,
        }
    }
}

/// Counters for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:              u64,
    pub time_ms:           u64,
    pub living:            u32,
    pub interrupts:        u32,
    pub forced_resets:     u32,
    pub moved:             u32,
    pub blocked:           u32,
    pub enemies_slain:     u32,
    pub agents_lost:       u32,
    pub objectives_closed: u32,
}

impl From<&TickSummary> for TickSummaryRow {
    fn from(s: &TickSummary) -> Self {
        Self {
            tick:              s.tick.0,
            time_ms:           s.now.as_millis(),
            living:            s.living,
            interrupts:        s.interrupts,
            forced_resets:     s.forced_resets,
            moved:             s.moved,
            blocked:           s.blocked,
            enemies_slain:     s.enemies_slain,
            agents_lost:       s.agents_lost,
            objectives_closed: s.objectives_closed,
        }
    }
}
