//! The tile map: terrain plus per-cell visibility.

use ka_core::GridPos;

use crate::view::WorldView;
use crate::{WorldError, WorldResult};

/// Default edge length of one tile, in world units.
pub const DEFAULT_TILE_SIZE: f32 = 32.0;

/// Terrain of one cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum TileKind {
    #[default]
    Grass,
    Path,
    Tree,
    Water,
    Rock,
}

impl TileKind {
    #[inline]
    pub fn is_passable(self) -> bool {
        matches!(self, TileKind::Grass | TileKind::Path)
    }
}

/// Fog-of-war state of one cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Visibility {
    #[default]
    Unseen,
    /// Seen at some point, not currently in anyone's sight.
    Seen,
    Visible,
}

impl Visibility {
    #[inline]
    pub fn is_explored(self) -> bool {
        self != Visibility::Unseen
    }
}

/// Row-major terrain and visibility grid.
#[derive(Clone, Debug)]
pub struct TileMap {
    width:      i32,
    height:     i32,
    tile_size:  f32,
    tiles:      Vec<TileKind>,
    visibility: Vec<Visibility>,
}

impl TileMap {
    /// An all-grass, all-unseen map.
    pub fn new(width: i32, height: i32, tile_size: f32) -> Self {
        let n = (width.max(0) as usize) * (height.max(0) as usize);
        Self {
            width:      width.max(0),
            height:     height.max(0),
            tile_size,
            tiles:      vec![TileKind::Grass; n],
            visibility: vec![Visibility::Unseen; n],
        }
    }

    /// Like [`new`](Self::new) but every cell starts `Seen`.
    pub fn revealed(width: i32, height: i32, tile_size: f32) -> Self {
        let mut map = Self::new(width, height, tile_size);
        map.visibility.fill(Visibility::Seen);
        map
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    fn idx(&self, cell: GridPos) -> Option<usize> {
        if cell.x < 0 || cell.y < 0 || cell.x >= self.width || cell.y >= self.height {
            return None;
        }
        Some(cell.y as usize * self.width as usize + cell.x as usize)
    }

    pub fn tile(&self, cell: GridPos) -> Option<TileKind> {
        self.idx(cell).map(|i| self.tiles[i])
    }

    pub fn set_tile(&mut self, cell: GridPos, kind: TileKind) -> WorldResult<()> {
        let i = self.idx(cell).ok_or(WorldError::OutOfBounds(cell))?;
        self.tiles[i] = kind;
        Ok(())
    }

    pub fn set_visibility(&mut self, cell: GridPos, vis: Visibility) -> WorldResult<()> {
        let i = self.idx(cell).ok_or(WorldError::OutOfBounds(cell))?;
        self.visibility[i] = vis;
        Ok(())
    }

    /// Demote every `Visible` cell to `Seen`.  Call before re-revealing
    /// around the current sight sources.
    pub fn fade_visible(&mut self) {
        for v in &mut self.visibility {
            if *v == Visibility::Visible {
                *v = Visibility::Seen;
            }
        }
    }

    /// Mark cells within `radius` tiles (Euclidean) of `center` visible.
    pub fn reveal(&mut self, center: GridPos, radius: i32) {
        let r2 = radius * radius;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy > r2 {
                    continue;
                }
                if let Some(i) = self.idx(center.offset(dx, dy)) {
                    self.visibility[i] = Visibility::Visible;
                }
            }
        }
    }

    /// Unseen passable cells orthogonally adjacent to an explored cell, in
    /// row-major order.
    pub fn frontier_tiles(&self) -> Vec<GridPos> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = GridPos::new(x, y);
                let Some(i) = self.idx(cell) else { continue };
                if self.visibility[i].is_explored() || !self.tiles[i].is_passable() {
                    continue;
                }
                let borders_explored = GridPos::ORTHOGONAL.iter().any(|&(dx, dy)| {
                    self.idx(cell.offset(dx, dy))
                        .is_some_and(|j| self.visibility[j].is_explored())
                });
                if borders_explored {
                    out.push(cell);
                }
            }
        }
        out
    }
}

impl WorldView for TileMap {
    #[inline]
    fn tile_size(&self) -> f32 {
        self.tile_size
    }

    #[inline]
    fn in_bounds(&self, cell: GridPos) -> bool {
        self.idx(cell).is_some()
    }

    #[inline]
    fn is_walkable(&self, cell: GridPos) -> bool {
        self.idx(cell).is_some_and(|i| self.tiles[i].is_passable())
    }

    #[inline]
    fn visibility(&self, cell: GridPos) -> Visibility {
        self.idx(cell).map_or(Visibility::Unseen, |i| self.visibility[i])
    }
}
