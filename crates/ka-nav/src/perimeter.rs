//! Goal selection for footprint targets.

use ka_core::{GridPos, WorldPos};
use ka_world::{Occupancy, Structure, WorldView};

/// The walkable, unblocked cell in the ring around `structure` closest to
/// `from`.  Ties keep ring order (clockwise from the top-left corner).
pub fn best_adjacent_tile<V: WorldView + ?Sized>(
    view:      &V,
    occupancy: &Occupancy,
    structure: &Structure,
    from:      WorldPos,
) -> Option<GridPos> {
    structure
        .perimeter()
        .into_iter()
        .filter(|&c| view.is_walkable(c) && !occupancy.is_blocked(c))
        .min_by(|&a, &b| {
            let da = view.grid_to_world(a).distance_sq(from);
            let db = view.grid_to_world(b).distance_sq(from);
            da.total_cmp(&db)
        })
}

/// World-space goal for approaching `structure`: the best perimeter cell's
/// center, or the structure's center when the whole ring is blocked.
pub fn approach_point<V: WorldView + ?Sized>(
    view:      &V,
    occupancy: &Occupancy,
    structure: &Structure,
    from:      WorldPos,
) -> WorldPos {
    match best_adjacent_tile(view, occupancy, structure, from) {
        Some(cell) => view.grid_to_world(cell),
        None => structure.center(view.tile_size()),
    }
}
