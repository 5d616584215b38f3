//! Hostile units.  Their behavior is external; the engine only reads them.

use ka_core::{AgentId, EnemyId, StructureId, WorldPos};

pub const DEFAULT_ENEMY_ATTACK: u32 = 8;

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub id:        EnemyId,
    pub pos:       WorldPos,
    pub hp:        u32,
    pub max_hp:    u32,
    /// Raw damage per hit.
    pub attack:    u32,
    /// Structure this enemy is currently hitting, if any.
    pub attacking: Option<StructureId>,
    /// Agent this enemy is currently chasing, if any.
    pub chasing:   Option<AgentId>,
}

impl Enemy {
    pub fn new(id: EnemyId, pos: WorldPos, max_hp: u32) -> Self {
        Self { id, pos, hp: max_hp, max_hp, attack: DEFAULT_ENEMY_ATTACK, attacking: None, chasing: None }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }
}
