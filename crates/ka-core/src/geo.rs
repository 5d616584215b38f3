//! World-space and grid-space coordinates.
//!
//! `WorldPos` is a continuous position in world units (pixels of the original
//! tile grid).  `GridPos` is an integer cell coordinate.  Conversion between
//! the two needs the tile size and lives on the world view, not here.

use std::fmt;

/// A continuous world-space position.
#[derive(Copy, Clone, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance_sq(self, other: WorldPos) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    #[inline]
    pub fn distance(self, other: WorldPos) -> f32 {
        self.distance_sq(other).sqrt()
    }

    /// `true` if `other` lies within `radius` (inclusive).
    #[inline]
    pub fn within(self, other: WorldPos, radius: f32) -> bool {
        self.distance_sq(other) <= radius * radius
    }

    /// Coordinates as an `[f32; 2]`, the point type used by `rstar`.
    #[inline]
    pub fn to_array(self) -> [f32; 2] {
        [self.x, self.y]
    }
}

impl fmt::Display for WorldPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// An integer grid cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    /// The four orthogonal offsets in fixed N, E, S, W order.
    pub const ORTHOGONAL: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

    /// The four diagonal offsets in fixed NE, SE, SW, NW order.
    pub const DIAGONAL: [(i32, i32); 4] = [(1, -1), (1, 1), (-1, 1), (-1, -1)];

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> GridPos {
        GridPos::new(self.x + dx, self.y + dy)
    }

    #[inline]
    pub fn manhattan(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    #[inline]
    pub fn chebyshev(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// All eight neighbors, orthogonal first, each group in fixed order.
    pub fn neighbors8(self) -> impl Iterator<Item = GridPos> {
        Self::ORTHOGONAL
            .into_iter()
            .chain(Self::DIAGONAL)
            .map(move |(dx, dy)| self.offset(dx, dy))
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}
