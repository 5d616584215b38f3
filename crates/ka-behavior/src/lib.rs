//! `ka-behavior` — the per-agent decision engine.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                    |
//! |-----------------|-------------------------------------------------------------|
//! | [`context`]     | `TickContext` — tick, clock and world snapshot for a turn   |
//! | [`engine`]      | `DecisionEngine`, `EngineStats`, `TurnOutcome`              |
//! | [`interrupts`]  | `Interrupt`, `check_interrupts`, `holds_commitment`         |
//! | [`scoring`]     | objective scoring, tiers and selection                      |
//! | [`advisory`]    | advisory eligibility, context building, decision handling   |
//! | [`journey`]     | post-purchase journeys and frontier picking                 |
//! | [`handlers`]    | the state handlers and `choose_purchase`                    |
//! | [`error`]       | `BehaviorError`, `BehaviorResult<T>`                        |
//!
//! # A turn
//!
//! [`DecisionEngine::tick_agent`] runs once per living agent per tick, in
//! ascending `AgentId` order.  It reads the world through the tick's
//! [`TickContext`], writes only the agent itself and the objective board,
//! and draws randomness only from named [`RngStreams`](ka_core::RngStreams).
//! Movement happens afterwards, in a separate phase driven by the simulation.

pub mod advisory;
pub mod context;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod interrupts;
pub mod journey;
pub mod scoring;


pub use advisory::{build_context, in_combat, is_eligible, low_health_in_combat, wealthy_near_market};
pub use context::TickContext;
pub use engine::{DecisionEngine, EngineStats, TurnOutcome, intent_label};
pub use error::{BehaviorError, BehaviorResult};
pub use handlers::{choose_purchase, random_nearby_cell};
pub use interrupts::{Interrupt, check_interrupts, holds_commitment};
pub use journey::{journey_eligible, pick_frontier};
pub use scoring::{
    DISTANCE_EXPONENT, ObjectiveEvaluation, Selection, Tier, affinity, effective_distance,
    evaluate_objectives, risk_near, score, score_objective, select_objective,
};
