//! Placed structures and their footprints.

use ka_core::{GridPos, StructureId, WorldPos};

/// What a structure is.  Decides safety, hostility and footprint size.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StructureKind {
    /// The home base.  Always solid, even before construction completes.
    Castle,
    Marketplace,
    /// An agent's home building (hero guild).
    Guild,
    House,
    Farm,
    Tower,
    /// Hostile spawner.
    Lair,
}

impl StructureKind {
    /// Default footprint in tiles.
    pub fn default_size(self) -> (i32, i32) {
        match self {
            StructureKind::Castle => (3, 3),
            StructureKind::Marketplace | StructureKind::Guild | StructureKind::Lair => (2, 2),
            StructureKind::House | StructureKind::Farm | StructureKind::Tower => (1, 1),
        }
    }

    /// Agents retreat towards these.
    #[inline]
    pub fn is_safe_haven(self) -> bool {
        matches!(self, StructureKind::Castle | StructureKind::Marketplace)
    }

    #[inline]
    pub fn is_hostile(self) -> bool {
        self == StructureKind::Lair
    }

    /// Buildings nobody calls home.  Agents may answer their distress calls.
    #[inline]
    pub fn is_neutral(self) -> bool {
        matches!(self, StructureKind::House | StructureKind::Farm | StructureKind::Tower)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StructureKind::Castle      => "castle",
            StructureKind::Marketplace => "marketplace",
            StructureKind::Guild       => "guild",
            StructureKind::House       => "house",
            StructureKind::Farm        => "farm",
            StructureKind::Tower       => "tower",
            StructureKind::Lair        => "lair",
        }
    }
}

/// A structure occupying a rectangle of cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Structure {
    pub id:          StructureId,
    pub kind:        StructureKind,
    /// Top-left cell of the footprint.
    pub origin:      GridPos,
    pub width:       i32,
    pub height:      i32,
    pub hp:          u32,
    pub max_hp:      u32,
    pub constructed: bool,
}

impl Structure {
    /// A fully built structure with the kind's default footprint.
    pub fn new(id: StructureId, kind: StructureKind, origin: GridPos, max_hp: u32) -> Self {
        let (width, height) = kind.default_size();
        Self { id, kind, origin, width, height, hp: max_hp, max_hp, constructed: true }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Whether the footprint blocks movement.  Dead and unbuilt structures
    /// don't, except the castle which always does while standing.
    #[inline]
    pub fn is_solid(&self) -> bool {
        self.is_alive() && (self.constructed || self.kind == StructureKind::Castle)
    }

    #[inline]
    pub fn is_damaged(&self) -> bool {
        self.is_alive() && self.hp < self.max_hp
    }

    #[inline]
    pub fn contains(&self, cell: GridPos) -> bool {
        cell.x >= self.origin.x
            && cell.y >= self.origin.y
            && cell.x < self.origin.x + self.width
            && cell.y < self.origin.y + self.height
    }

    /// Every covered cell, row-major.
    pub fn footprint(&self) -> impl Iterator<Item = GridPos> + '_ {
        (0..self.height).flat_map(move |dy| {
            (0..self.width).map(move |dx| self.origin.offset(dx, dy))
        })
    }

    /// The one-cell ring around the footprint, clockwise from the top-left
    /// corner.  The order is fixed.
    pub fn perimeter(&self) -> Vec<GridPos> {
        let (x0, y0) = (self.origin.x - 1, self.origin.y - 1);
        let (x1, y1) = (self.origin.x + self.width, self.origin.y + self.height);
        let mut ring = Vec::with_capacity(2 * (self.width + self.height) as usize + 4);
        for x in x0..=x1 {
            ring.push(GridPos::new(x, y0));
        }
        for y in (y0 + 1)..=y1 {
            ring.push(GridPos::new(x1, y));
        }
        for x in (x0..x1).rev() {
            ring.push(GridPos::new(x, y1));
        }
        for y in ((y0 + 1)..y1).rev() {
            ring.push(GridPos::new(x0, y));
        }
        ring
    }

    /// Whether `pos` is within `radius_tiles` of the footprint's edge,
    /// measured from the center so large footprints reach further.
    pub fn is_near(&self, pos: WorldPos, radius_tiles: f32, tile_size: f32) -> bool {
        let reach = radius_tiles + self.width.max(self.height) as f32 * 0.5;
        pos.within(self.center(tile_size), reach * tile_size)
    }

    /// Center of the footprint in world space.
    pub fn center(&self, tile_size: f32) -> WorldPos {
        WorldPos::new(
            (self.origin.x as f32 + self.width as f32 * 0.5) * tile_size,
            (self.origin.y as f32 + self.height as f32 * 0.5) * tile_size,
        )
    }
}
