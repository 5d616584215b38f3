//! `ka-world` — the world as the decision engine sees it.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                    |
//! |-----------------|-------------------------------------------------------------|
//! | [`view`]        | `WorldView` trait — walkability, grid↔world, visibility     |
//! | [`map`]         | `TileMap`, `TileKind`, `Visibility`                         |
//! | [`structure`]   | `Structure`, `StructureKind`, footprints and perimeters     |
//! | [`enemy`]       | `Enemy`                                                     |
//! | [`objective`]   | `Objective`, `ClaimState`, `ObjectiveBoard`                 |
//! | [`research`]    | `Research` unlock table and the market `CATALOG`            |
//! | [`occupancy`]   | `Occupancy` — cells blocked by solid footprints             |
//! | [`index`]       | `PointIndex<T>` — R-tree radius queries                     |
//! | [`snapshot`]    | `World`, `SpatialCache`, `WorldSnapshot`, `AllyView`        |
//! | [`error`]       | `WorldError`, `WorldResult<T>`                              |
//!
//! The simulation owns a [`World`] and an [`ObjectiveBoard`].  Each tick it
//! rebuilds a [`SpatialCache`], wraps both in a [`WorldSnapshot`], and hands
//! the snapshot to the engine together with `&mut ObjectiveBoard`.

pub mod enemy;
pub mod error;
pub mod index;
pub mod map;
pub mod objective;
pub mod occupancy;
pub mod research;
pub mod snapshot;
pub mod structure;
pub mod view;


pub use enemy::Enemy;
pub use error::{WorldError, WorldResult};
pub use index::PointIndex;
pub use map::{DEFAULT_TILE_SIZE, TileKind, TileMap, Visibility};
pub use objective::{ClaimState, Objective, ObjectiveBoard, ObjectiveKind};
pub use occupancy::Occupancy;
pub use research::{CATALOG, ItemKind, Research, ShopItem};
pub use snapshot::{AllyView, SpatialCache, World, WorldSnapshot};
pub use structure::{Structure, StructureKind};
pub use view::WorldView;
