//! `ka-nav` — grid pathfinding and movement for the rust_ka agent engine.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                       |
//! |----------------|----------------------------------------------------------------|
//! | [`astar`]      | Bounded 8-connected A*, `Pathfinder` trait, `AStarPathfinder`  |
//! | [`perimeter`]  | `best_adjacent_tile` — closest free cell around a footprint    |
//! | [`planner`]    | `NavState` path cache, `steer_towards` replan policy           |
//! | [`movement`]   | `step_towards`, `follow_path`                                  |
//! | [`error`]      | `NavError`, `NavResult<T>`                                     |
//!
//! Search failure is an expected outcome, not an error condition for the
//! simulation: `steer_towards` arms a backoff and falls back to direct
//! steering, and stuck recovery in `ka-mobility` handles the rest.

pub mod astar;
pub mod error;
pub mod movement;
pub mod perimeter;
pub mod planner;


pub use astar::{AStarPathfinder, GridPath, Pathfinder, find_path, snap_to_passable};
pub use error::{NavError, NavResult};
pub use movement::{follow_path, step_towards};
pub use perimeter::{approach_point, best_adjacent_tile};
pub use planner::{NavState, NavStats, Steering, steer_towards};
