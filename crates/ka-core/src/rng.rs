//! Named, independently seeded pseudorandom streams.
//!
//! # Determinism strategy
//!
//! Every subsystem that makes a randomized choice draws from its own named
//! stream.  A stream's seed is
//!
//!   seed = mix64(base_seed XOR fnv1a64(name))
//!
//! `fnv1a64` is a fixed, process-independent hash; `std`'s `RandomState` is
//! never involved.  Consequences:
//!
//! - Adding draws to one subsystem never shifts the sequence another sees.
//! - Streams can be created lazily in any order; a stream's sequence depends
//!   only on the base seed, its name, and how many draws it has served.
//! - A global reseed discards all streams at once.

use std::collections::BTreeMap;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
pub const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME:  u64 = 0x0000_0100_0000_01b3;

/// Stable 64-bit FNV-1a hash of `bytes`.
#[inline]
pub fn stable_hash(bytes: &[u8]) -> u64 {
    let mut h = FNV_OFFSET;
    for &b in bytes {
        h ^= b as u64;
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

/// SplitMix64 finalizer.  Spreads nearby inputs across the seed space.
#[inline]
pub fn mix64(mut z: u64) -> u64 {
    z = z.wrapping_add(MIXING_CONSTANT);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Seed for the stream called `name` under `base_seed`.
#[inline]
pub fn stream_seed(base_seed: u64, name: &str) -> u64 {
    mix64(base_seed ^ stable_hash(name.as_bytes()))
}

/// Well-known stream names.  One per subsystem; never share.
pub mod streams {
    pub const DEFEND_NEUTRAL:  &str = "defend_neutral";
    pub const OBJECTIVE_JITTER: &str = "objective_jitter";
    pub const JOURNEY:         &str = "journey";
    pub const IDLE_WANDER:     &str = "idle_wander";
    pub const EXPLORE:         &str = "explore";
    pub const MOCK_ADVISOR:    &str = "mock_advisor";
}

// ── StreamRng ─────────────────────────────────────────────────────────────────

/// One deterministic stream.
#[derive(Debug)]
pub struct StreamRng(SmallRng);

impl StreamRng {
    /// Seed directly (tests, worker threads that own a private stream).
    pub fn new(seed: u64) -> Self {
        StreamRng(SmallRng::seed_from_u64(seed))
    }

    /// The stream `name` under `base_seed`.
    pub fn for_stream(base_seed: u64, name: &str) -> Self {
        Self::new(stream_seed(base_seed, name))
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        if p.is_nan() {
            return false;
        }
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform in `[-amplitude, amplitude]`; zero when `amplitude <= 0`.
    #[inline]
    pub fn symmetric(&mut self, amplitude: f32) -> f32 {
        if amplitude > 0.0 && amplitude.is_finite() {
            self.0.gen_range(-amplitude..=amplitude)
        } else {
            0.0
        }
    }

    /// Pick an index with probability proportional to `weights`.
    ///
    /// Non-positive and non-finite weights never win.  Returns `None` when no
    /// weight is positive.  Exactly one draw is consumed whenever a pick is
    /// possible.
    pub fn weighted_index(&mut self, weights: &[f32]) -> Option<usize> {
        let usable = |w: f32| if w.is_finite() && w > 0.0 { w as f64 } else { 0.0 };
        let total: f64 = weights.iter().map(|&w| usable(w)).sum();
        if total <= 0.0 {
            return None;
        }
        let mut roll = self.0.r#gen::<f64>() * total;
        let mut last = None;
        for (i, &w) in weights.iter().enumerate() {
            let w = usable(w);
            if w == 0.0 {
                continue;
            }
            if roll < w {
                return Some(i);
            }
            roll -= w;
            last = Some(i);
        }
        // Rounding can leave `roll` a hair above the last bucket.
        last
    }
}

// ── RngStreams ────────────────────────────────────────────────────────────────

/// Registry of named streams for one run.
///
/// Streams are created on first use.  Iteration order never matters because
/// a stream's sequence depends only on its name, but a `BTreeMap` keeps debug
/// output stable anyway.
pub struct RngStreams {
    base_seed: u64,
    streams:   BTreeMap<&'static str, StreamRng>,
}

impl RngStreams {
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed, streams: BTreeMap::new() }
    }

    #[inline]
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// The stream called `name`, created on first access.
    pub fn stream(&mut self, name: &'static str) -> &mut StreamRng {
        let base = self.base_seed;
        self.streams
            .entry(name)
            .or_insert_with(|| StreamRng::for_stream(base, name))
    }

    /// Explicit global reseed: every stream restarts from the new base.
    pub fn reseed(&mut self, base_seed: u64) {
        self.base_seed = base_seed;
        self.streams.clear();
    }

    /// Names of the streams touched so far, in sorted order.
    pub fn active_streams(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.streams.keys().copied()
    }
}
