//! `ka-core` — foundational types for the `rust_ka` agent engine.
//!
//! Every other `ka-*` crate depends on this one.  It has no `ka-*`
//! dependencies and few external ones (`rand`, `thiserror`, `serde`,
//! `serde_json`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `EnemyId`, `StructureId`, `ObjectiveId`        |
//! | [`geo`]         | `WorldPos`, `GridPos`                                     |
//! | [`time`]        | `Tick`, `SimTime`, `SimClock`, `SimConfig`                |
//! | [`rng`]         | `StreamRng`, `RngStreams`, stable seed derivation         |
//! | [`archetype`]   | `Archetype`, `ArchetypeWeights`, `ArchetypeTable`         |
//! | [`config`]      | `EngineConfig` and its tunable groups                     |
//! | [`error`]       | `CoreError`, `CoreResult`                                 |
//!
//! # Determinism
//!
//! The engine reads time only from [`SimClock`] and randomness only from
//! [`RngStreams`].  Given the same seed, config and per-tick deltas, two runs
//! are identical.

pub mod archetype;
pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use archetype::{Archetype, ArchetypeTable, ArchetypeWeights};
pub use config::{
    AdvisorConfig, BehaviorConfig, CommitConfig, EngineConfig, JourneyConfig, NavConfig,
    RestConfig, ScoringConfig, StuckConfig,
};
pub use error::{CoreError, CoreResult};
pub use geo::{GridPos, WorldPos};
pub use ids::{AgentId, EnemyId, ObjectiveId, StructureId};
pub use rng::{RngStreams, StreamRng, streams};
pub use time::{SimClock, SimConfig, SimTime, Tick};
