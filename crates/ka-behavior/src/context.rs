//! Read-only inputs shared by every agent's turn within one tick.

use ka_core::{SimTime, Tick};
use ka_world::WorldSnapshot;

/// Everything an agent's turn may read about the current tick.
///
/// Built once per tick by ka-sim and shared by every agent.  The only
/// mutable world state an agent can touch, the objective board, is passed
/// separately.
#[derive(Clone, Copy)]
pub struct TickContext<'a> {
    pub tick: Tick,

    /// Simulated time at the start of the tick.  The engine's only clock.
    pub now: SimTime,

    pub snap: WorldSnapshot<'a>,
}

impl<'a> TickContext<'a> {
    #[inline]
    pub fn new(tick: Tick, now: SimTime, snap: WorldSnapshot<'a>) -> Self {
        Self { tick, now, snap }
    }

    #[inline]
    pub fn tile_size(&self) -> f32 {
        self.snap.tile_size()
    }

    /// `n` tiles in world units.
    #[inline]
    pub fn tiles(&self, n: f32) -> f32 {
        n * self.tile_size()
    }
}
