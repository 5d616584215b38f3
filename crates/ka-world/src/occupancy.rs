//! Cells covered by solid structure footprints.

use rustc_hash::FxHashSet;

use ka_core::GridPos;

use crate::structure::Structure;

/// The set of cells blocked by solid structures this tick.
#[derive(Clone, Debug, Default)]
pub struct Occupancy {
    cells: FxHashSet<GridPos>,
}

impl Occupancy {
    pub fn from_structures<'a>(structures: impl IntoIterator<Item = &'a Structure>) -> Self {
        let mut cells = FxHashSet::default();
        for s in structures {
            if s.is_solid() {
                cells.extend(s.footprint());
            }
        }
        Self { cells }
    }

    #[inline]
    pub fn is_blocked(&self, cell: GridPos) -> bool {
        self.cells.contains(&cell)
    }

    pub fn block(&mut self, cell: GridPos) {
        self.cells.insert(cell);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
