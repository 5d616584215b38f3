//! The local decision table used when no advisor is configured or the
//! advisor's provider fails.

use crate::{AdvisorAction, AdvisorContext, Decision};

/// First matching row wins:
///
/// | Situation                     | Decision                           |
/// |-------------------------------|------------------------------------|
/// | critical health, has potion   | `use_potion`                       |
/// | critical health, no potion    | `retreat` → castle                 |
/// | low health in combat, potion  | `use_potion`                       |
/// | low health in combat          | `retreat` → marketplace            |
/// | can shop and needs supplies   | `buy_item` → potion                |
/// | enemies nearby and healthy    | `fight`                            |
/// | otherwise                     | `explore`                          |
pub fn fallback_decision(ctx: &AdvisorContext) -> Decision {
    use AdvisorAction::*;

    if ctx.critical_health {
        return if ctx.has_potions() {
            Decision::new(UsePotion, None, "fallback: critical health, using potion")
        } else {
            Decision::new(Retreat, Some("castle"), "fallback: critical health, retreating")
        };
    }
    if ctx.low_health && ctx.in_combat {
        return if ctx.has_potions() {
            Decision::new(UsePotion, None, "fallback: low health in combat, using potion")
        } else {
            Decision::new(Retreat, Some("marketplace"), "fallback: low health in combat, retreating")
        };
    }
    if ctx.needs_supplies() {
        return Decision::new(BuyItem, Some("healing_potion"), "fallback: low on health, buying potion");
    }
    if ctx.enemies_nearby > 0 && !ctx.low_health {
        return Decision::new(Fight, None, "fallback: enemies nearby, engaging");
    }
    Decision::new(Explore, None, "fallback: nothing to do, exploring")
}
