//! `ka-mobility` — getting agents unstuck and moving them.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                        |
//! |-------------|-----------------------------------------------------------------|
//! | [`stuck`]   | `detect_stuck`, `recover`, `Recovery`, `default_patrol`         |
//! | [`engine`]  | `MobilityEngine<P>` — steering through a `Pathfinder`, movement |
//!
//! # Per-tick order
//!
//! 1. The decision engine calls [`detect_stuck`] then [`recover`] before any
//!    handler runs; an abandoned target ends the agent's turn.
//! 2. Handlers call [`MobilityEngine::steer`] for their resolved goal.
//! 3. After every agent has decided, the simulation calls
//!    [`MobilityEngine::advance`] for each agent in id order.

pub mod engine;
pub mod stuck;


pub use engine::{MobilityEngine, MoveOutcome};
pub use stuck::{NO_PROGRESS, Recovery, default_patrol, detect_stuck, recover};
