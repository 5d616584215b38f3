//! Objectives (bounties) and the board that owns them.
//!
//! # Claiming
//!
//! Assignment is a *soft* claim: an agent that adopts an objective stamps
//! `Assigned { agent, at }`.  Other agents treat the objective as taken until
//! the stamp is older than the claim TTL, after which anyone may take it
//! over.  Nothing stops two agents walking to the same goal in the window
//! where one assignment has gone stale; the first to arrive claims it and
//! the other finds it invalid.

use ka_core::{AgentId, ObjectiveId, SimTime, StructureId, WorldPos};
use tracing::debug;

use crate::structure::Structure;
use crate::{WorldError, WorldResult};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectiveKind {
    Explore,
    Attack,
    Defend,
}

impl ObjectiveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectiveKind::Explore => "explore",
            ObjectiveKind::Attack  => "attack",
            ObjectiveKind::Defend  => "defend",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ClaimState {
    #[default]
    Unclaimed,
    Assigned { agent: AgentId, at: SimTime },
    Claimed(AgentId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Objective {
    pub id:        ObjectiveId,
    pub kind:      ObjectiveKind,
    pub reward:    u32,
    pub goal:      WorldPos,
    /// Structure the objective is about (attack/defend).
    pub target:    Option<StructureId>,
    pub claim:     ClaimState,
    pub placed_at: SimTime,
}

impl Objective {
    /// Whether `agent` may adopt this objective at `now`.
    ///
    /// True when unclaimed, already assigned to `agent`, or assigned to
    /// someone else more than `ttl_ms` ago.
    pub fn is_available_for(&self, agent: AgentId, now: SimTime, ttl_ms: u64) -> bool {
        match self.claim {
            ClaimState::Unclaimed => true,
            ClaimState::Assigned { agent: holder, at } => {
                holder == agent || now.millis_since(at) > ttl_ms
            }
            ClaimState::Claimed(_) => false,
        }
    }

    /// Stamp a soft claim for `agent`.  No-op once claimed.
    pub fn assign(&mut self, agent: AgentId, now: SimTime) {
        if !self.is_claimed() {
            self.claim = ClaimState::Assigned { agent, at: now };
        }
    }

    /// Drop any soft claim.  A hard claim is permanent.
    pub fn unassign(&mut self) {
        if matches!(self.claim, ClaimState::Assigned { .. }) {
            self.claim = ClaimState::Unclaimed;
        }
    }

    /// Hard-claim for `agent`, returning the reward.
    pub fn claim(&mut self, agent: AgentId) -> WorldResult<u32> {
        if let ClaimState::Claimed(by) = self.claim {
            return Err(WorldError::AlreadyClaimed { id: self.id, by });
        }
        self.claim = ClaimState::Claimed(agent);
        Ok(self.reward)
    }

    #[inline]
    pub fn is_claimed(&self) -> bool {
        matches!(self.claim, ClaimState::Claimed(_))
    }

    pub fn assigned_to(&self) -> Option<AgentId> {
        match self.claim {
            ClaimState::Assigned { agent, .. } => Some(agent),
            _ => None,
        }
    }

    /// Still worth pursuing given the current structures.
    ///
    /// Claimed objectives are never valid.  Attack and defend objectives
    /// require their target structure to exist and stand.
    pub fn is_valid(&self, structures: &[Structure]) -> bool {
        if self.is_claimed() {
            return false;
        }
        match (self.kind, self.target) {
            (ObjectiveKind::Explore, _) => true,
            (_, None) => true,
            (_, Some(id)) => structures.iter().any(|s| s.id == id && s.is_alive()),
        }
    }

    #[inline]
    pub fn is_near(&self, pos: WorldPos, radius: f32) -> bool {
        self.goal.within(pos, radius)
    }
}

// ── ObjectiveBoard ────────────────────────────────────────────────────────────

/// All live objectives, kept in ascending id order.
#[derive(Clone, Debug, Default)]
pub struct ObjectiveBoard {
    objectives:    Vec<Objective>,
    next_id:       u32,
    /// Total reward of every objective ever placed.
    pub total_placed: u64,
    /// Total reward paid out by claims.
    pub total_paid:   u64,
    pub claims:       u32,
}

impl ObjectiveBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a new objective.
    pub fn place(
        &mut self,
        kind:   ObjectiveKind,
        goal:   WorldPos,
        reward: u32,
        target: Option<StructureId>,
        now:    SimTime,
    ) -> ObjectiveId {
        let id = ObjectiveId(self.next_id);
        self.next_id += 1;
        self.total_placed += reward as u64;
        self.objectives.push(Objective {
            id,
            kind,
            reward,
            goal,
            target,
            claim: ClaimState::Unclaimed,
            placed_at: now,
        });
        debug!(%id, kind = kind.as_str(), reward, "objective placed");
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objectives.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objectives.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Objective> {
        self.objectives.iter()
    }

    pub fn get(&self, id: ObjectiveId) -> Option<&Objective> {
        self.objectives
            .binary_search_by_key(&id, |o| o.id)
            .ok()
            .map(|i| &self.objectives[i])
    }

    pub fn get_mut(&mut self, id: ObjectiveId) -> Option<&mut Objective> {
        match self.objectives.binary_search_by_key(&id, |o| o.id) {
            Ok(i) => Some(&mut self.objectives[i]),
            Err(_) => None,
        }
    }

    pub fn assign(&mut self, id: ObjectiveId, agent: AgentId, now: SimTime) -> WorldResult<()> {
        let obj = self.get_mut(id).ok_or(WorldError::ObjectiveNotFound(id))?;
        obj.assign(agent, now);
        Ok(())
    }

    /// Release `agent`'s soft claim on `id`, if it still holds one.
    pub fn release(&mut self, id: ObjectiveId, agent: AgentId) {
        if let Some(obj) = self.get_mut(id) {
            if obj.assigned_to() == Some(agent) {
                obj.unassign();
            }
        }
    }

    /// Drop every soft claim `agent` holds; returns how many were dropped.
    pub fn release_all(&mut self, agent: AgentId) -> usize {
        let mut released = 0;
        for obj in &mut self.objectives {
            if obj.assigned_to() == Some(agent) {
                obj.unassign();
                released += 1;
            }
        }
        released
    }

    /// Hard-claim `id` for `agent` and return the reward.
    pub fn claim(&mut self, id: ObjectiveId, agent: AgentId) -> WorldResult<u32> {
        let obj = self.get_mut(id).ok_or(WorldError::ObjectiveNotFound(id))?;
        let reward = obj.claim(agent)?;
        self.total_paid += reward as u64;
        self.claims += 1;
        debug!(%id, %agent, reward, "objective claimed");
        Ok(reward)
    }

    /// Remove claimed and invalid objectives; returns the removed ids.
    pub fn remove_invalid(&mut self, structures: &[Structure]) -> Vec<ObjectiveId> {
        let mut removed = Vec::new();
        self.objectives.retain(|o| {
            let keep = o.is_valid(structures);
            if !keep {
                removed.push(o.id);
            }
            keep
        });
        removed
    }

    /// Agents currently holding a soft claim on `id` (zero or one).
    pub fn responders(&self, id: ObjectiveId) -> usize {
        self.get(id).map_or(0, |o| o.assigned_to().is_some() as usize)
    }
}
