//! A small ready-made world for demos, tests and benchmarks.

use ka_agent::{AgentSpawn, AgentStore, AgentStoreBuilder};
use ka_core::{Archetype, EngineConfig, GridPos, SimConfig, SimTime, WorldPos};
use ka_world::{DEFAULT_TILE_SIZE, ObjectiveBoard, ObjectiveKind, StructureKind, TileKind, TileMap, World};

use crate::SimBuilder;

pub const VILLAGE_WIDTH: i32 = 40;
pub const VILLAGE_HEIGHT: i32 = 30;

/// World, agents and opening objectives, ready to hand to a [`SimBuilder`].
#[derive(Clone, Debug)]
pub struct Scenario {
    pub world:  World,
    pub agents: AgentStore,
    pub board:  ObjectiveBoard,
}

impl Scenario {
    /// A castle town under fog with a pond, a tree line, a marketplace, a
    /// guild every agent calls home, a house under attack and a lair in
    /// the far corner.  Three bounties are posted: explore the north-west,
    /// defend the house, raze the lair.
    ///
    /// Agents stand in rows south of the castle and cycle through the
    /// archetypes in [`Archetype::ALL`] order.
    pub fn village(agent_count: usize) -> Self {
        let ts = DEFAULT_TILE_SIZE;
        let at = |x: f32, y: f32| WorldPos::new(x * ts, y * ts);

        let mut map = TileMap::new(VILLAGE_WIDTH, VILLAGE_HEIGHT, ts);
        for y in 4..8 {
            for x in 20..25 {
                paint(&mut map, GridPos::new(x, y), TileKind::Water);
            }
        }
        for y in 10..22 {
            if y != 16 {
                paint(&mut map, GridPos::new(12, y), TileKind::Tree);
            }
        }
        map.reveal(GridPos::new(19, 15), 8);

        let mut world = World::new(map);
        let _castle = world.add_structure(StructureKind::Castle, GridPos::new(18, 13), 500);
        let _market = world.add_structure(StructureKind::Marketplace, GridPos::new(24, 13), 200);
        let guild = world.add_structure(StructureKind::Guild, GridPos::new(14, 13), 200);
        let house = world.add_structure(StructureKind::House, GridPos::new(10, 20), 120);
        let _farm = world.add_structure(StructureKind::Farm, GridPos::new(26, 20), 80);
        let lair = world.add_structure(StructureKind::Lair, GridPos::new(34, 4), 300);

        for pos in [at(12.0, 20.5), at(10.5, 22.0)] {
            let id = world.add_enemy(pos, 30);
            if let Some(raider) = world.enemy_mut(id) {
                raider.attacking = Some(house);
            }
        }
        world.add_enemy(at(33.0, 7.0), 40);
        world.add_enemy(at(36.5, 7.0), 40);

        let mut board = ObjectiveBoard::new();
        board.place(ObjectiveKind::Explore, at(4.5, 4.5), 30, None, SimTime::ZERO);
        board.place(ObjectiveKind::Defend, at(10.5, 20.5), 40, Some(house), SimTime::ZERO);
        board.place(ObjectiveKind::Attack, at(35.0, 5.0), 80, Some(lair), SimTime::ZERO);

        let spawns = (0..agent_count).map(|i| {
            let x = 15 + (i % 6) as i32;
            let y = 17 + (i / 6) as i32;
            AgentSpawn::at(at(x as f32 + 0.5, y as f32 + 0.5))
                .name(format!("hero-{i}"))
                .archetype(Archetype::ALL[i % Archetype::ALL.len()])
                .gold(20 + 10 * (i % 3) as u32)
                .potions(1)
                .home(guild)
        });
        let agents = AgentStoreBuilder::new(ts).spawn_all(spawns).build();

        Self { world, agents, board }
    }

    /// Hand everything to a [`SimBuilder`].
    pub fn into_builder(self, config: SimConfig, engine: EngineConfig) -> SimBuilder {
        SimBuilder::new(config, engine, self.world, self.agents).board(self.board)
    }
}

fn paint(map: &mut TileMap, cell: GridPos, kind: TileKind) {
    // Every painted cell is inside the fixed map.
    let _ = map.set_tile(cell, kind);
}
