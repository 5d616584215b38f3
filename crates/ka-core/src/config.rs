//! Engine tunables.
//!
//! Every number the decision engine, navigation and stuck recovery consult
//! lives here.  Each group deserializes with `#[serde(default)]`, so a config
//! file only needs the keys it overrides:
//!
//! ```json
//! { "stuck": { "stuck_secs": 3.0 }, "nav": { "max_expansions": 4000 } }
//! ```

use std::path::Path;

use crate::archetype::{Archetype, ArchetypeTable, ArchetypeWeights};
use crate::{CoreError, CoreResult};

/// All engine tunables.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub stuck:      StuckConfig,
    pub commit:     CommitConfig,
    pub scoring:    ScoringConfig,
    pub nav:        NavConfig,
    pub advisor:    AdvisorConfig,
    pub rest:       RestConfig,
    pub journey:    JourneyConfig,
    pub behavior:   BehaviorConfig,
    pub archetypes: ArchetypeTable,
}

impl EngineConfig {
    /// Parse from a JSON string and validate.
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    #[inline]
    pub fn weights(&self, archetype: Archetype) -> &ArchetypeWeights {
        self.archetypes.get(archetype)
    }

    /// Reject values that would make the engine misbehave silently.
    pub fn validate(&self) -> CoreResult<()> {
        if self.nav.max_expansions == 0 {
            return Err(CoreError::Config("nav.max_expansions must be > 0".into()));
        }
        if self.stuck.max_attempts == 0 {
            return Err(CoreError::Config("stuck.max_attempts must be > 0".into()));
        }
        if !(self.stuck.displacement_tiles > 0.0) {
            return Err(CoreError::Config("stuck.displacement_tiles must be > 0".into()));
        }
        if self.scoring.unexplored_multiplier < 1.0 {
            return Err(CoreError::Config(
                "scoring.unexplored_multiplier must be >= 1 (a penalty, not a bonus)".into(),
            ));
        }
        if self.advisor.critical_health > self.advisor.low_health {
            return Err(CoreError::Config(
                "advisor.critical_health must not exceed advisor.low_health".into(),
            ));
        }
        if self.rest.heal_interval_secs <= 0.0 {
            return Err(CoreError::Config("rest.heal_interval_secs must be > 0".into()));
        }
        Ok(())
    }
}

// ── Groups ────────────────────────────────────────────────────────────────────

/// Stuck detection and recovery.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StuckConfig {
    /// Displacement (in tiles) that counts as progress.
    pub displacement_tiles: f32,
    /// Seconds without progress before an agent is flagged stuck.
    pub stuck_secs:         f32,
    /// Recovery attempts allowed per target before the patrol fallback.
    pub max_attempts:       u8,
    /// Minimum spacing between recovery attempts.
    pub backoff_secs:       f32,
}

impl Default for StuckConfig {
    fn default() -> Self {
        Self {
            displacement_tiles: 0.25,
            stuck_secs:         2.0,
            max_attempts:       3,
            backoff_secs:       0.5,
        }
    }
}

/// Commitment windows and the soft claim TTL.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CommitConfig {
    pub combat_secs:    f32,
    pub bounty_secs:    f32,
    pub frontier_secs:  f32,
    /// An assignment older than this no longer blocks other agents.
    pub claim_ttl_secs: f32,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            combat_secs:    1.5,
            bounty_secs:    2.5,
            frontier_secs:  6.0,
            claim_ttl_secs: 5.0,
        }
    }
}

/// Objective scoring.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Distance multiplier when the goal cell has never been seen.
    pub unexplored_multiplier: f32,
    /// Objectives scoring below this are ignored.
    pub min_attractiveness:    f32,
    /// Half-width of the symmetric jitter added to each score.
    pub jitter:                f32,
    /// Enemies within this many tiles of a goal add to its risk.
    pub risk_radius_tiles:     f32,
    /// Scores at or above this are tier "medium".
    pub tier_medium:           f32,
    /// Scores at or above this are tier "high".
    pub tier_high:             f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            unexplored_multiplier: 1.5,
            min_attractiveness:    0.25,
            jitter:                0.05,
            risk_radius_tiles:     5.0,
            tier_medium:           1.0,
            tier_high:             2.0,
        }
    }
}

/// Pathfinding and path following.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Hard cap on node expansions per search.
    pub max_expansions:      usize,
    /// Beyond this many tiles agents steer straight at the goal.
    pub direct_move_tiles:   f32,
    /// After a failed search, no new search until this has elapsed.
    pub replan_backoff_secs: f32,
    /// World-unit radius at which a waypoint counts as reached.
    pub arrive_radius:       f32,
    /// Unwalkable goals snap to a walkable cell within this many tiles.
    pub goal_snap_radius:    i32,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            max_expansions:      8_000,
            direct_move_tiles:   48.0,
            replan_backoff_secs: 0.75,
            arrive_radius:       4.0,
            goal_snap_radius:    4,
        }
    }
}

/// Advisory eligibility and the context flags sent to advisors.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Minimum spacing between requests from one agent.
    pub cooldown_secs:       f32,
    /// Health fraction below which an agent is "low health".
    pub low_health:          f32,
    /// Health fraction below which an agent is "critical".
    pub critical_health:     f32,
    /// Gold at or above which an agent counts as wealthy.
    pub wealthy_gold:        u32,
    /// A marketplace within this many tiles makes a wealthy agent eligible.
    pub market_radius_tiles: f32,
    /// An enemy within this many tiles means "in combat".
    pub combat_radius_tiles: f32,
    /// Enemies within this many tiles are "nearby".
    pub nearby_radius_tiles: f32,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            cooldown_secs:       2.0,
            low_health:          0.5,
            critical_health:     0.25,
            wealthy_gold:        30,
            market_radius_tiles: 6.0,
            combat_radius_tiles: 2.0,
            nearby_radius_tiles: 12.0,
        }
    }
}

/// Going home and resting.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RestConfig {
    pub heal_interval_secs:   f32,
    pub heal_per_interval:    u32,
    /// Maximum hp healed in one rest.
    pub heal_cap:             u32,
    /// Damage taken since leaving home that sends an agent back.
    pub damage_trigger:       u32,
    /// An agent that left home missing at least this much hp …
    pub hurt_on_leave:        u32,
    /// … goes back after this much further damage.
    pub extra_damage_trigger: u32,
    /// Within this many tiles of home counts as "at home".
    pub home_radius_tiles:    f32,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            heal_interval_secs:   2.0,
            heal_per_interval:    1,
            heal_cap:             30,
            damage_trigger:       10,
            hurt_on_leave:        10,
            extra_damage_trigger: 5,
            home_radius_tiles:    2.0,
        }
    }
}

/// Post-purchase journeys.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct JourneyConfig {
    /// A purchase this recent (at full health) can trigger a journey.
    pub trigger_window_secs:     f32,
    pub cooldown_secs:           f32,
    /// Frontier candidates considered per roll, nearest first.
    pub max_frontier_candidates: usize,
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            trigger_window_secs:     3.0,
            cooldown_secs:           30.0,
            max_frontier_candidates: 64,
        }
    }
}

/// State-handler thresholds.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Idle agents engage enemies within this many tiles.
    pub engage_radius_tiles:    f32,
    /// Neutral structures under attack within this many tiles are noticed.
    pub awareness_radius_tiles: f32,
    /// After declining a distress call, don't reconsider the same structure
    /// for this long.
    pub distress_recheck_secs:  f32,
    /// Retreat ends within this many tiles of safety.
    pub safe_radius_tiles:      f32,
    /// Objectives are claimed within this many tiles of their goal.
    pub claim_radius_tiles:     f32,
    /// Per-tick chance that an idle agent wanders.
    pub wander_chance:          f64,
    pub wander_radius_tiles:    i32,
    /// Drink a potion after retreating when below this health fraction.
    pub retreat_potion_health:  f32,
    /// Buy a potion when below this health fraction.
    pub shop_potion_health:     f32,
    pub max_potions:            u32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            engage_radius_tiles:    8.0,
            awareness_radius_tiles: 10.0,
            distress_recheck_secs:  5.0,
            safe_radius_tiles:      2.0,
            claim_radius_tiles:     1.0,
            wander_chance:          0.01,
            wander_radius_tiles:    6,
            retreat_potion_health:  0.7,
            shop_potion_health:     0.8,
            max_potions:            5,
        }
    }
}
