//! Simulation time model.
//!
//! # Design
//!
//! Two counters advance together:
//!
//! - `Tick` counts calls to [`SimClock::advance`].
//! - `SimTime` is elapsed simulated time in whole milliseconds, accumulated
//!   only from the per-tick delta handed to `advance`.
//!
//! `SimTime` is the only time source the engine consults.  Nothing reads the
//! host's wall clock, so replaying the same sequence of deltas reproduces every
//! timestamp exactly.  Sub-millisecond remainders are carried between ticks
//! rather than dropped, so a 60 Hz run does not drift.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimTime ───────────────────────────────────────────────────────────────────

/// Elapsed simulated time in milliseconds since the start of the run.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    #[inline]
    pub fn from_secs(secs: f32) -> SimTime {
        SimTime(secs_to_ms(secs))
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_secs(self) -> f32 {
        self.0 as f32 / 1000.0
    }

    #[inline]
    pub fn plus_ms(self, ms: u64) -> SimTime {
        SimTime(self.0.saturating_add(ms))
    }

    /// `self + secs`, rounded to the nearest millisecond.
    #[inline]
    pub fn plus_secs(self, secs: f32) -> SimTime {
        self.plus_ms(secs_to_ms(secs))
    }

    /// Milliseconds from `earlier` to `self`; zero if `earlier` is later.
    #[inline]
    pub fn millis_since(self, earlier: SimTime) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    #[inline]
    pub fn secs_since(self, earlier: SimTime) -> f32 {
        self.millis_since(earlier) as f32 / 1000.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}s", self.0 / 1000, self.0 % 1000)
    }
}

#[inline]
fn secs_to_ms(secs: f32) -> u64 {
    if secs <= 0.0 || !secs.is_finite() {
        return 0;
    }
    (secs as f64 * 1000.0).round() as u64
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// The simulation clock.  Advanced only by the supplied per-tick delta.
#[derive(Clone, Debug, Default)]
pub struct SimClock {
    pub current_tick: Tick,
    now:              SimTime,
    /// Fractional milliseconds not yet folded into `now`.
    carry_ms:         f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one tick of `dt_secs` simulated seconds.
    ///
    /// Negative or non-finite deltas advance the tick counter but not time.
    pub fn advance(&mut self, dt_secs: f32) {
        self.current_tick = self.current_tick + 1;
        if !dt_secs.is_finite() || dt_secs <= 0.0 {
            return;
        }
        let total = self.carry_ms + dt_secs as f64 * 1000.0;
        let whole = total.floor();
        self.carry_ms = total - whole;
        self.now = self.now.plus_ms(whole as u64);
    }

    /// Current simulated time.
    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.now.0
    }

    /// Back to tick zero, time zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.current_tick, self.now)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level run configuration.
///
/// Typically loaded from JSON by the application and handed to the sim
/// builder alongside an [`EngineConfig`][crate::EngineConfig].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Master seed.  The same seed always produces identical runs.
    pub seed: u64,

    /// Fixed tick rate used by `run`.  Default: 60.
    pub tick_hz: u32,

    /// Total ticks to simulate.
    pub total_ticks: u64,

    /// Emit a snapshot every N ticks.  0 disables snapshots.
    pub output_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed:                  42,
            tick_hz:               60,
            total_ticks:           3_600,
            output_interval_ticks: 60,
        }
    }
}

impl SimConfig {
    /// Seconds covered by one tick at `tick_hz`.
    #[inline]
    pub fn tick_secs(&self) -> f32 {
        1.0 / self.tick_hz.max(1) as f32
    }

    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    pub fn make_clock(&self) -> SimClock {
        SimClock::new()
    }
}
