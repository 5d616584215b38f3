//! Agent storage.
//!
//! Agents live in one `Vec` indexed by `AgentId`, so iteration is always in
//! ascending id order.  The engine processes agents in exactly that order.

use ka_core::{AgentId, CoreError, CoreResult};
use ka_world::AllyView;

use crate::Agent;

#[derive(Clone, Debug, Default)]
pub struct AgentStore {
    agents: Vec<Agent>,
}

impl AgentStore {
    pub(crate) fn from_agents(agents: Vec<Agent>) -> Self {
        debug_assert!(agents.iter().enumerate().all(|(i, a)| a.id.index() == i));
        Self { agents }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// All ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agents.iter().map(|a| a.id)
    }

    #[inline]
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.index())
    }

    #[inline]
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id.index())
    }

    pub fn try_get(&self, id: AgentId) -> CoreResult<&Agent> {
        self.get(id).ok_or(CoreError::AgentNotFound(id))
    }

    pub fn try_get_mut(&mut self, id: AgentId) -> CoreResult<&mut Agent> {
        self.get_mut(id).ok_or(CoreError::AgentNotFound(id))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Agent> {
        self.agents.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Agent> {
        self.agents.iter_mut()
    }

    pub fn living(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.iter().filter(|a| a.is_alive())
    }

    pub fn living_count(&self) -> usize {
        self.living().count()
    }

    /// Positions of every agent as of now, for the per-tick snapshot.
    pub fn ally_views(&self) -> Vec<AllyView> {
        self.agents
            .iter()
            .map(|a| AllyView { id: a.id, pos: a.pos, alive: a.is_alive() })
            .collect()
    }
}
