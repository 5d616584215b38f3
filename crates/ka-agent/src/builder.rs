//! Fluent construction of an [`AgentStore`].
//!
//! # Usage
//!
//! ```rust
//! use ka_agent::{AgentSpawn, AgentStoreBuilder};
//! use ka_core::{Archetype, WorldPos};
//!
//! let store = AgentStoreBuilder::new(32.0)
//!     .spawn(AgentSpawn::at(WorldPos::new(48.0, 48.0)).archetype(Archetype::Brave))
//!     .spawn(AgentSpawn::at(WorldPos::new(80.0, 48.0)).gold(40))
//!     .build();
//!
//! assert_eq!(store.len(), 2);
//! ```

use ka_core::{AgentId, Archetype, StructureId, WorldPos};

use crate::{Agent, AgentStore};

/// Initial values for one agent.  Anything not set keeps the defaults of
/// [`Agent::new`].
#[derive(Clone, Debug)]
pub struct AgentSpawn {
    pos:       WorldPos,
    name:      Option<String>,
    archetype: Archetype,
    max_hp:    Option<u32>,
    hp:        Option<u32>,
    gold:      u32,
    potions:   u32,
    speed:     Option<f32>,
    home:      Option<StructureId>,
}

impl AgentSpawn {
    pub fn at(pos: WorldPos) -> Self {
        Self {
            pos,
            name: None,
            archetype: Archetype::default(),
            max_hp: None,
            hp: None,
            gold: 0,
            potions: 0,
            speed: None,
            home: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn archetype(mut self, archetype: Archetype) -> Self {
        self.archetype = archetype;
        self
    }

    pub fn max_hp(mut self, max_hp: u32) -> Self {
        self.max_hp = Some(max_hp);
        self
    }

    /// Starting hp; clamped to max hp.
    pub fn hp(mut self, hp: u32) -> Self {
        self.hp = Some(hp);
        self
    }

    pub fn gold(mut self, gold: u32) -> Self {
        self.gold = gold;
        self
    }

    pub fn potions(mut self, potions: u32) -> Self {
        self.potions = potions;
        self
    }

    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn home(mut self, home: StructureId) -> Self {
        self.home = Some(home);
        self
    }
}

/// Builds an [`AgentStore`]; ids are assigned in spawn order from zero.
pub struct AgentStoreBuilder {
    tile_size: f32,
    spawns:    Vec<AgentSpawn>,
}

impl AgentStoreBuilder {
    pub fn new(tile_size: f32) -> Self {
        Self { tile_size, spawns: Vec::new() }
    }

    pub fn spawn(mut self, spawn: AgentSpawn) -> Self {
        self.spawns.push(spawn);
        self
    }

    pub fn spawn_all(mut self, spawns: impl IntoIterator<Item = AgentSpawn>) -> Self {
        self.spawns.extend(spawns);
        self
    }

    pub fn build(self) -> AgentStore {
        let agents = self
            .spawns
            .into_iter()
            .enumerate()
            .map(|(i, s)| {
                let mut agent = Agent::new(AgentId(i as u32), s.pos, self.tile_size);
                if let Some(name) = s.name {
                    agent.name = name;
                }
                agent.archetype = s.archetype;
                if let Some(max_hp) = s.max_hp {
                    agent.max_hp = max_hp;
                    agent.hp = max_hp;
                }
                if let Some(hp) = s.hp {
                    agent.hp = hp.min(agent.max_hp);
                }
                agent.gold = s.gold;
                agent.potions = s.potions;
                if let Some(speed) = s.speed {
                    agent.speed = speed;
                }
                agent.home = s.home;
                agent
            })
            .collect();
        AgentStore::from_agents(agents)
    }
}
