//! World rules the simulation applies around the engine: combat cadence,
//! enemy reach, kill rewards and sight.

use ka_core::Tick;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimRules {
    /// Seconds between blows, for agents and enemies alike.
    pub attack_interval_secs: f32,
    /// How close an enemy must be to hit an agent or a structure's edge.
    pub enemy_reach_tiles:    f32,
    /// Gold paid to the agent landing a killing blow.
    pub gold_per_kill:        u32,
    /// Fog-of-war sight radius around each living agent.
    pub sight_radius_tiles:   i32,
}

impl Default for SimRules {
    fn default() -> Self {
        Self {
            attack_interval_secs: 1.0,
            enemy_reach_tiles:    1.5,
            gold_per_kill:        10,
            sight_radius_tiles:   5,
        }
    }
}

impl SimRules {
    /// Ticks between blows at `tick_hz`, never less than one.
    pub fn strike_every(&self, tick_hz: u32) -> u64 {
        let ticks = (self.attack_interval_secs.max(0.0) * tick_hz as f32).round() as u64;
        ticks.max(1)
    }

    /// Whether blows land on `tick`.  Tick zero is a strike tick.
    #[inline]
    pub fn is_strike_tick(&self, tick: Tick, tick_hz: u32) -> bool {
        tick.0.is_multiple_of(self.strike_every(tick_hz))
    }
}
