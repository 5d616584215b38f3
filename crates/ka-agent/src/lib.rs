//! `ka-agent` — the agent data model for the `rust_ka` engine.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`state`]     | `AgentState`, `Target`, `Goal`, `TargetKey`                   |
//! | [`agent`]     | `Agent`, commitments, stuck/advisory/rest/journey bookkeeping |
//! | [`store`]     | `AgentStore` — agents by ascending `AgentId`                  |
//! | [`builder`]   | `AgentStoreBuilder`, `AgentSpawn`                             |
//!
//! An agent is mutated only by the engine on its own turn and by its own
//! movement and combat resolution, never by another agent.

pub mod agent;
pub mod builder;
pub mod state;
pub mod store;


pub use agent::{
    AdvisoryBook, Agent, CommitKind, Commitments, DecisionRecord, Gear, JourneyState, RestState,
    StuckTracker,
};
pub use builder::{AgentSpawn, AgentStoreBuilder};
pub use state::{AgentState, Goal, Target, TargetKey};
pub use store::AgentStore;
