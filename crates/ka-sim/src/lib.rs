//! `ka-sim` — tick loop orchestrator for the rust_ka agent engine.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Fog       — visible cells fade to seen; each living agent reveals
//!                 rules.sight_radius_tiles around itself.
//!   ② Decide    — build SpatialCache + WorldSnapshot once, then
//!                 DecisionEngine::tick_agent for each agent, ascending id.
//!   ③ Move      — DecisionEngine::advance for each agent against the
//!                 same snapshot.
//!   ④ Combat    — on strike ticks: agents hit their combat target, then
//!                 enemies hit the agent they chase or the structure they
//!                 attack.  The fallen release their soft claims.
//!   ⑤ Upkeep    — claimed and invalidated objectives leave the board.
//!   clock.advance(1 / tick_hz)
//! ```
//!
//! # Crate layout
//!
//! | Module         | Contents                                             |
//! |----------------|------------------------------------------------------|
//! | [`sim`]        | `Sim` and the tick loop                              |
//! | [`builder`]    | `SimBuilder` — validation and assembly               |
//! | [`observer`]   | `SimObserver`, `NoopObserver`, `TickSummary`         |
//! | [`rules`]      | `SimRules` — combat cadence, reach, sight            |
//! | [`combat`]     | `resolve_combat`, `CombatReport`                     |
//! | [`scenario`]   | `Scenario::village` — a ready-made world             |
//! | [`error`]      | `SimError`, `SimResult<T>`                           |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ka_core::{EngineConfig, SimConfig};
//! use ka_sim::{NoopObserver, Scenario};
//!
//! let mut sim = Scenario::village(8)
//!     .into_builder(SimConfig::default(), EngineConfig::default())
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod combat;
pub mod error;
pub mod observer;
pub mod rules;
pub mod scenario;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use combat::{CombatReport, resolve_combat};
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, TickSummary};
pub use rules::SimRules;
pub use scenario::Scenario;
pub use sim::Sim;
