//! Simulation observer trait for progress reporting and data collection.

use ka_agent::AgentStore;
use ka_core::{SimTime, Tick};
use ka_world::{ObjectiveBoard, World};

/// Per-tick counters handed to [`SimObserver::on_tick_end`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub tick:          Tick,
    /// Simulated time at the start of the tick.
    pub now:           SimTime,
    pub living:        u32,
    /// Turns that ended in a priority interrupt.
    pub interrupts:    u32,
    pub forced_resets: u32,
    pub moved:         u32,
    pub blocked:       u32,
    pub enemies_slain: u32,
    pub agents_lost:   u32,
    /// Objectives dropped from the board as claimed or invalid.
    pub objectives_closed: u32,
}

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
///         if tick.0 % self.interval == 0 {
///             println!("{tick}: {} alive, {} moved", summary.living, summary.moved);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick with that tick's counters.
    fn on_tick_end(&mut self, _tick: Tick, _summary: &TickSummary) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks` ticks).
    ///
    /// Provides read-only access to agents, world and objectives so output
    /// writers can record state without the sim knowing any output format.
    fn on_snapshot(
        &mut self,
        _tick:   Tick,
        _now:    SimTime,
        _agents: &AgentStore,
        _world:  &World,
        _board:  &ObjectiveBoard,
    ) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// Two observers driven as one, `.0` before `.1` at every hook.
impl<A: SimObserver, B: SimObserver> SimObserver for (A, B) {
    fn on_tick_start(&mut self, tick: Tick) {
        self.0.on_tick_start(tick);
        self.1.on_tick_start(tick);
    }

    fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
        self.0.on_tick_end(tick, summary);
        self.1.on_tick_end(tick, summary);
    }

    fn on_snapshot(
        &mut self,
        tick:   Tick,
        now:    SimTime,
        agents: &AgentStore,
        world:  &World,
        board:  &ObjectiveBoard,
    ) {
        self.0.on_snapshot(tick, now, agents, world, board);
        self.1.on_snapshot(tick, now, agents, world, board);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.0.on_sim_end(final_tick);
        self.1.on_sim_end(final_tick);
    }
}
