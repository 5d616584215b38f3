//! `TraceDigest`: a whole run folded into one 64-bit value.
//!
//! Two runs with the same digest saw the same tick counters and the same
//! agent, enemy, structure and board state at every snapshot.  Floats are
//! folded by bit pattern, strings through the stable FNV-1a hash, so the
//! value is identical across processes and platforms.

use std::fmt;

use ka_agent::AgentStore;
use ka_core::rng::{MIXING_CONSTANT, mix64, stable_hash};
use ka_core::{SimTime, Tick};
use ka_sim::{SimObserver, TickSummary};
use ka_world::{ObjectiveBoard, World};

use crate::{AgentSnapshotRow, TickSummaryRow};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceDigest {
    hash:      u64,
    ticks:     u64,
    snapshots: u64,
}

impl Default for TraceDigest {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceDigest {
    pub fn new() -> Self {
        Self { hash: MIXING_CONSTANT, ticks: 0, snapshots: 0 }
    }

    /// The digest so far.
    #[inline]
    pub fn value(&self) -> u64 {
        self.hash
    }

    /// Tick summaries folded so far.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Snapshots folded so far.
    #[inline]
    pub fn snapshots(&self) -> u64 {
        self.snapshots
    }

    #[inline]
    fn fold(&mut self, word: u64) {
        self.hash = mix64(self.hash ^ word);
    }

    fn fold_str(&mut self, s: &str) {
        self.fold(stable_hash(s.as_bytes()));
    }

    pub fn fold_snapshot_row(&mut self, row: &AgentSnapshotRow) {
        self.fold(u64::from(row.agent_id));
        self.fold(row.tick);
        self.fold(row.time_ms);
        self.fold(pair(row.x.to_bits(), row.y.to_bits()));
        self.fold_str(row.state);
        self.fold_str(row.target);
        self.fold_str(row.intent);
        self.fold(pair(row.hp, row.gold));
        self.fold(pair(row.potions, row.stuck_events));
        self.fold_str(row.decision);
        self.fold_str(row.decision_origin);
    }

    pub fn fold_summary_row(&mut self, row: &TickSummaryRow) {
        self.ticks += 1;
        self.fold(row.tick);
        self.fold(row.time_ms);
        self.fold(pair(row.living, row.interrupts));
        self.fold(pair(row.forced_resets, row.moved));
        self.fold(pair(row.blocked, row.enemies_slain));
        self.fold(pair(row.agents_lost, row.objectives_closed));
    }

    fn fold_world(&mut self, world: &World, board: &ObjectiveBoard) {
        for enemy in &world.enemies {
            self.fold(pair(enemy.pos.x.to_bits(), enemy.pos.y.to_bits()));
            self.fold(u64::from(enemy.hp));
        }
        for structure in &world.structures {
            self.fold(u64::from(structure.hp));
        }
        self.fold(board.len() as u64);
        self.fold(board.total_paid);
        self.fold(u64::from(board.claims));
        for obj in board.iter() {
            self.fold(u64::from(obj.id.0));
            self.fold(u64::from(obj.assigned_to().map_or(u32::MAX, |a| a.0)));
        }
    }
}

/// Two 32-bit words as one 64-bit word.
#[inline]
fn pair(hi: u32, lo: u32) -> u64 {
    (u64::from(hi) << 32) | u64::from(lo)
}

impl fmt::Display for TraceDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.hash)
    }
}

impl SimObserver for TraceDigest {
    fn on_tick_end(&mut self, _tick: Tick, summary: &TickSummary) {
        self.fold_summary_row(&TickSummaryRow::from(summary));
    }

    fn on_snapshot(&mut self, tick: Tick, now: SimTime, agents: &AgentStore, world: &World, board: &ObjectiveBoard) {
        self.snapshots += 1;
        for agent in agents.iter() {
            self.fold_snapshot_row(&AgentSnapshotRow::from_agent(tick, now, agent));
        }
        self.fold_world(world, board);
    }
}
