//! Behavior states and the tagged target union.

use std::fmt;

use ka_core::{EnemyId, GridPos, ObjectiveId, StructureId, WorldPos};
use ka_world::ObjectiveKind;

/// Top-level behavior state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum AgentState {
    #[default]
    Idle,
    Moving,
    Fighting,
    Retreating,
    Shopping,
    Resting,
    Dead,
}

impl AgentState {
    /// States in which the agent is trying to get somewhere.  Only these are
    /// watched by stuck detection.
    #[inline]
    pub fn intends_movement(self) -> bool {
        matches!(self, AgentState::Moving | AgentState::Retreating)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgentState::Idle       => "idle",
            AgentState::Moving     => "moving",
            AgentState::Fighting   => "fighting",
            AgentState::Retreating => "retreating",
            AgentState::Shopping   => "shopping",
            AgentState::Resting    => "resting",
            AgentState::Dead       => "dead",
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a [`Target::Objective`] leads.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Goal {
    /// A placed bounty.  `at` is the objective's goal point.
    Bounty { id: ObjectiveId, kind: ObjectiveKind, at: WorldPos },
    /// An unexplored frontier tile picked by a journey roll.
    Frontier { tile: GridPos },
    /// A hostile structure picked by a journey roll.
    AttackStructure { id: StructureId },
    /// A friendly structure under attack.
    Defend { id: StructureId },
    /// The agent's home, to rest.
    GoingHome { id: StructureId },
    /// A marketplace, to shop.
    Shop { id: StructureId },
    /// A safe haven, to recover.
    Retreat { to: StructureId },
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Bounty { .. }          => "bounty",
            Goal::Frontier { .. }        => "frontier",
            Goal::AttackStructure { .. } => "attack_structure",
            Goal::Defend { .. }          => "defend",
            Goal::GoingHome { .. }       => "going_home",
            Goal::Shop { .. }            => "shop",
            Goal::Retreat { .. }         => "retreat",
        }
    }

    /// The structure this goal is about, if it is about one.
    pub fn structure(&self) -> Option<StructureId> {
        match *self {
            Goal::AttackStructure { id }
            | Goal::Defend { id }
            | Goal::GoingHome { id }
            | Goal::Shop { id } => Some(id),
            Goal::Retreat { to } => Some(to),
            Goal::Bounty { .. } | Goal::Frontier { .. } => None,
        }
    }
}

/// What the agent is currently after.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub enum Target {
    #[default]
    None,
    Combat(EnemyId),
    Objective(Goal),
    Patrol(WorldPos),
}

impl Target {
    /// Identity of the target, ignoring anything that can drift (such as
    /// the position stored in a bounty goal).
    pub fn key(&self) -> TargetKey {
        match *self {
            Target::None       => TargetKey::None,
            Target::Combat(id) => TargetKey::Combat(id),
            Target::Patrol(p)  => TargetKey::Patrol(p.x.to_bits(), p.y.to_bits()),
            Target::Objective(goal) => match goal {
                Goal::Bounty { id, .. }          => TargetKey::Bounty(id),
                Goal::Frontier { tile }          => TargetKey::Frontier(tile),
                Goal::AttackStructure { id }     => TargetKey::AttackStructure(id),
                Goal::Defend { id }              => TargetKey::Defend(id),
                Goal::GoingHome { id }           => TargetKey::GoingHome(id),
                Goal::Shop { id }                => TargetKey::Shop(id),
                Goal::Retreat { to }             => TargetKey::Retreat(to),
            },
        }
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Target::None)
    }

    #[inline]
    pub fn goal(&self) -> Option<Goal> {
        match *self {
            Target::Objective(goal) => Some(goal),
            _ => None,
        }
    }

    #[inline]
    pub fn enemy(&self) -> Option<EnemyId> {
        match *self {
            Target::Combat(id) => Some(id),
            _ => None,
        }
    }

    /// The bounty being pursued, if any.
    pub fn bounty(&self) -> Option<ObjectiveId> {
        match *self {
            Target::Objective(Goal::Bounty { id, .. }) => Some(id),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Target::None         => "none",
            Target::Combat(_)    => "combat",
            Target::Objective(g) => g.as_str(),
            Target::Patrol(_)    => "patrol",
        }
    }
}

/// Hashable identity of a [`Target`].  Recovery attempts and path caches are
/// keyed by this.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetKey {
    None,
    Combat(EnemyId),
    Bounty(ObjectiveId),
    Frontier(GridPos),
    AttackStructure(StructureId),
    Defend(StructureId),
    GoingHome(StructureId),
    Shop(StructureId),
    Retreat(StructureId),
    /// Patrol point by raw float bits.
    Patrol(u32, u32),
}
