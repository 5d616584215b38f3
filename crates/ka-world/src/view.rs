//! The world query surface consumed by navigation and the decision engine.

use ka_core::{GridPos, WorldPos};

use crate::map::Visibility;

/// Read-only terrain queries.
///
/// Out-of-bounds cells are never walkable and always `Unseen`.  The default
/// conversions assume square tiles with the origin at the top-left corner of
/// cell `[0, 0]`.
pub trait WorldView {
    /// Edge length of one tile in world units.
    fn tile_size(&self) -> f32;

    fn in_bounds(&self, cell: GridPos) -> bool;

    /// Terrain walkability only.  Structure footprints are a separate layer.
    fn is_walkable(&self, cell: GridPos) -> bool;

    fn visibility(&self, cell: GridPos) -> Visibility;

    /// Floor-divide a world position into its containing cell.
    #[inline]
    fn world_to_grid(&self, pos: WorldPos) -> GridPos {
        let ts = self.tile_size();
        GridPos::new((pos.x / ts).floor() as i32, (pos.y / ts).floor() as i32)
    }

    /// Center of `cell` in world space.
    #[inline]
    fn grid_to_world(&self, cell: GridPos) -> WorldPos {
        let ts = self.tile_size();
        WorldPos::new((cell.x as f32 + 0.5) * ts, (cell.y as f32 + 0.5) * ts)
    }

    /// Distance between two world positions, in tiles.
    #[inline]
    fn tiles_between(&self, a: WorldPos, b: WorldPos) -> f32 {
        a.distance(b) / self.tile_size()
    }
}
