//! Owned world state and the read-only per-tick snapshot built from it.

use ka_core::{AgentId, EnemyId, GridPos, StructureId, WorldPos};

use crate::enemy::Enemy;
use crate::index::PointIndex;
use crate::map::TileMap;
use crate::occupancy::Occupancy;
use crate::research::Research;
use crate::structure::{Structure, StructureKind};
use crate::view::WorldView;

// ── World ─────────────────────────────────────────────────────────────────────

/// Everything the engine reads about the world, owned by the simulation.
///
/// Objectives are deliberately not here: they are the one thing the engine
/// writes, so they live in a separate [`ObjectiveBoard`][crate::ObjectiveBoard]
/// that can be borrowed mutably while the snapshot is alive.
#[derive(Clone, Debug)]
pub struct World {
    pub map:        TileMap,
    pub structures: Vec<Structure>,
    pub enemies:    Vec<Enemy>,
    pub research:   Research,
}

impl World {
    pub fn new(map: TileMap) -> Self {
        Self { map, structures: Vec::new(), enemies: Vec::new(), research: Research::new() }
    }

    /// Place a built structure with its kind's default footprint.
    pub fn add_structure(&mut self, kind: StructureKind, origin: GridPos, max_hp: u32) -> StructureId {
        let id = StructureId(self.structures.len() as u32);
        self.structures.push(Structure::new(id, kind, origin, max_hp));
        id
    }

    pub fn add_enemy(&mut self, pos: WorldPos, max_hp: u32) -> EnemyId {
        let id = EnemyId(self.enemies.len() as u32);
        self.enemies.push(Enemy::new(id, pos, max_hp));
        id
    }

    pub fn structure_mut(&mut self, id: StructureId) -> Option<&mut Structure> {
        self.structures.iter_mut().find(|s| s.id == id)
    }

    pub fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }
}

// ── SpatialCache ──────────────────────────────────────────────────────────────

/// Derived lookup structures, rebuilt once per tick from [`World`].
pub struct SpatialCache {
    pub enemy_index: PointIndex<EnemyId>,
    pub occupancy:   Occupancy,
    /// Unexplored frontier cells, row-major.
    pub frontier:    Vec<GridPos>,
}

impl SpatialCache {
    pub fn build(world: &World) -> Self {
        Self {
            enemy_index: PointIndex::build(
                world.enemies.iter().filter(|e| e.is_alive()).map(|e| (e.pos, e.id)),
            ),
            occupancy:   Occupancy::from_structures(&world.structures),
            frontier:    world.map.frontier_tiles(),
        }
    }
}

// ── WorldSnapshot ─────────────────────────────────────────────────────────────

/// Another agent as seen at the start of the tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AllyView {
    pub id:    AgentId,
    pub pos:   WorldPos,
    pub alive: bool,
}

/// Read-only view of the world shared by every agent during one tick.
#[derive(Clone, Copy)]
pub struct WorldSnapshot<'a> {
    pub view:       &'a dyn WorldView,
    pub structures: &'a [Structure],
    pub enemies:    &'a [Enemy],
    pub research:   &'a Research,
    pub cache:      &'a SpatialCache,
    pub allies:     &'a [AllyView],
}

impl<'a> WorldSnapshot<'a> {
    pub fn new(world: &'a World, cache: &'a SpatialCache, allies: &'a [AllyView]) -> Self {
        Self {
            view:       &world.map,
            structures: &world.structures,
            enemies:    &world.enemies,
            research:   &world.research,
            cache,
            allies,
        }
    }

    #[inline]
    pub fn tile_size(&self) -> f32 {
        self.view.tile_size()
    }

    #[inline]
    pub fn occupancy(&self) -> &'a Occupancy {
        &self.cache.occupancy
    }

    #[inline]
    pub fn frontier(&self) -> &'a [GridPos] {
        &self.cache.frontier
    }

    // ── Structures ────────────────────────────────────────────────────────

    pub fn structure(&self, id: StructureId) -> Option<&'a Structure> {
        self.structures.iter().find(|s| s.id == id)
    }

    /// The standing castle, if any.
    pub fn home_base(&self) -> Option<&'a Structure> {
        self.structures
            .iter()
            .find(|s| s.kind == StructureKind::Castle && s.is_alive())
    }

    /// Nearest standing structure matching `pred`; ties by id.
    pub fn nearest_structure(
        &self,
        pos:  WorldPos,
        pred: impl Fn(&Structure) -> bool,
    ) -> Option<&'a Structure> {
        let ts = self.tile_size();
        self.structures
            .iter()
            .filter(|s| s.is_alive() && pred(s))
            .min_by(|a, b| {
                let da = a.center(ts).distance_sq(pos);
                let db = b.center(ts).distance_sq(pos);
                da.total_cmp(&db).then(a.id.cmp(&b.id))
            })
    }

    // ── Enemies ───────────────────────────────────────────────────────────

    pub fn enemy(&self, id: EnemyId) -> Option<&'a Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// The enemy if it exists and is alive.
    pub fn live_enemy(&self, id: EnemyId) -> Option<&'a Enemy> {
        self.enemy(id).filter(|e| e.is_alive())
    }

    /// Live enemies currently hitting structure `id`, in id order.
    pub fn attackers_of(&self, id: StructureId) -> impl Iterator<Item = &'a Enemy> + 'a {
        self.enemies
            .iter()
            .filter(move |e| e.is_alive() && e.attacking == Some(id))
    }

    pub fn is_under_attack(&self, id: StructureId) -> bool {
        self.attackers_of(id).next().is_some()
    }

    /// Nearest live enemy within `radius` world units; ties by id.
    pub fn nearest_enemy_within(&self, pos: WorldPos, radius: f32) -> Option<EnemyId> {
        self.cache.enemy_index.nearest_within(pos, radius)
    }

    pub fn enemies_within(&self, pos: WorldPos, radius: f32) -> usize {
        self.cache.enemy_index.count_within(pos, radius)
    }

    // ── Allies ────────────────────────────────────────────────────────────

    /// Living agents other than `me` within `radius` world units.
    pub fn allies_within(&self, me: AgentId, pos: WorldPos, radius: f32) -> usize {
        self.allies
            .iter()
            .filter(|a| a.alive && a.id != me && a.pos.within(pos, radius))
            .count()
    }
}
