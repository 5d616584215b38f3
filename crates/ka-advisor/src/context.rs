//! The situation snapshot handed to an advisor.

use ka_core::{AgentId, Archetype};

/// Plain-data summary of one agent's situation at submit time.
///
/// Built by the decision engine from the world snapshot; advisors never see
/// engine state directly.  It is `Clone + Send` so it can cross to the worker
/// thread, and serializable for providers that forward it as JSON.
#[derive(Clone, Debug, PartialEq, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct AdvisorContext {
    pub agent:           AgentId,
    pub archetype:       Archetype,
    pub hp:              u32,
    pub max_hp:          u32,
    pub gold:            u32,
    pub potions:         u32,
    /// A live enemy is within combat radius.
    pub in_combat:       bool,
    pub low_health:      bool,
    pub critical_health: bool,
    /// A marketplace is within shopping radius.
    pub can_shop:        bool,
    /// Names of items on offer here the agent can pay for.
    pub affordable:      Vec<String>,
    pub potion_affordable: bool,
    pub enemies_nearby:  u32,
    pub allies_nearby:   u32,
    /// Within a few tiles of a castle or marketplace.
    pub near_safety:     bool,
}

impl AdvisorContext {
    /// Health as a whole percentage, rounded.
    pub fn health_pct(&self) -> u32 {
        if self.max_hp == 0 {
            return 0;
        }
        ((self.hp as f64 / self.max_hp as f64) * 100.0).round() as u32
    }

    #[inline]
    pub fn has_potions(&self) -> bool {
        self.potions > 0
    }

    /// More enemies around than the agent plus its nearby allies.
    #[inline]
    pub fn outnumbered(&self) -> bool {
        self.enemies_nearby > self.allies_nearby + 1
    }

    /// Hurt, short on potions, and able to buy one here.
    pub fn needs_supplies(&self) -> bool {
        self.can_shop && self.low_health && self.potions < 2 && self.potion_affordable
    }
}
