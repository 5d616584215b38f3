//! R-tree point index for radius queries over enemies and other movers.
//!
//! `rstar`'s nearest-neighbor order is unspecified for equidistant points, so
//! every query here collects candidates and breaks ties by id.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use ka_core::WorldPos;

#[derive(Clone, Debug)]
struct Entry<T> {
    point: [f32; 2],
    id:    T,
}

impl<T> RTreeObject for Entry<T> {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl<T> PointDistance for Entry<T> {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Bulk-loaded, immutable point index.  Rebuild once per tick.
pub struct PointIndex<T> {
    tree: RTree<Entry<T>>,
}

impl<T: Copy + Ord> PointIndex<T> {
    pub fn build(points: impl IntoIterator<Item = (WorldPos, T)>) -> Self {
        let entries = points
            .into_iter()
            .map(|(pos, id)| Entry { point: pos.to_array(), id })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    pub fn empty() -> Self {
        Self { tree: RTree::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Ids within `radius` of `pos`, nearest first, ties by id.
    pub fn within(&self, pos: WorldPos, radius: f32) -> Vec<T> {
        let p = pos.to_array();
        let mut hits: Vec<(f32, T)> = self
            .tree
            .locate_within_distance(p, radius * radius)
            .map(|e| (e.distance_2(&p), e.id))
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits.into_iter().map(|(_, id)| id).collect()
    }

    /// The nearest id within `radius`, ties by id.
    pub fn nearest_within(&self, pos: WorldPos, radius: f32) -> Option<T> {
        let p = pos.to_array();
        self.tree
            .locate_within_distance(p, radius * radius)
            .map(|e| (e.distance_2(&p), e.id))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, id)| id)
    }

    pub fn count_within(&self, pos: WorldPos, radius: f32) -> usize {
        self.tree.locate_within_distance(pos.to_array(), radius * radius).count()
    }
}
