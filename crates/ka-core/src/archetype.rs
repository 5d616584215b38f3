//! Agent archetypes (personalities) and their decision weights.

use std::fmt;

/// The personality an agent was spawned with.  Fixed for the agent's life.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Brave,
    Cautious,
    Greedy,
    #[default]
    Balanced,
}

impl Archetype {
    pub const ALL: [Archetype; 4] = [
        Archetype::Brave,
        Archetype::Cautious,
        Archetype::Greedy,
        Archetype::Balanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Archetype::Brave    => "brave",
            Archetype::Cautious => "cautious",
            Archetype::Greedy   => "greedy",
            Archetype::Balanced => "balanced",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-archetype weights consulted by objective scoring, interrupts and the
/// journey roll.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ArchetypeWeights {
    /// Multiplier on `sqrt(reward)`.
    pub reward:   f32,
    /// Multiplier on `distance^1.1` in the denominator.
    pub distance: f32,
    /// Multiplier on the risk penalty.
    pub risk:     f32,

    /// Flat bonus added to explore objectives.
    pub explore_affinity: f32,
    /// Flat bonus added to attack objectives.
    pub attack_affinity:  f32,
    /// Flat bonus added to defend objectives.
    pub defend_affinity:  f32,

    /// Probability of answering a neutral structure's distress call.
    pub defend_willingness: f64,
    /// Probability of setting off on a journey after shopping.
    pub journey_chance:     f64,
    /// Given a journey, probability of choosing a hostile structure over a
    /// frontier tile (when one exists).
    pub aggression:         f64,
    /// Exponent on distance when weighting frontier tiles.  Positive prefers
    /// far tiles, negative prefers near ones.
    pub frontier_bias:      f32,
}

impl Default for ArchetypeWeights {
    fn default() -> Self {
        Self::balanced()
    }
}

impl ArchetypeWeights {
    pub fn balanced() -> Self {
        Self {
            reward:             1.0,
            distance:           0.15,
            risk:               1.0,
            explore_affinity:   0.5,
            attack_affinity:    0.5,
            defend_affinity:    0.5,
            defend_willingness: 0.5,
            journey_chance:     0.35,
            aggression:         0.5,
            frontier_bias:      0.0,
        }
    }

    pub fn brave() -> Self {
        Self {
            reward:             0.9,
            distance:           0.12,
            risk:               0.4,
            explore_affinity:   0.6,
            attack_affinity:    1.2,
            defend_affinity:    0.8,
            defend_willingness: 0.8,
            journey_chance:     0.6,
            aggression:         0.7,
            frontier_bias:      1.0,
        }
    }

    pub fn cautious() -> Self {
        Self {
            reward:             0.8,
            distance:           0.25,
            risk:               1.8,
            explore_affinity:   0.3,
            attack_affinity:    0.1,
            defend_affinity:    0.6,
            defend_willingness: 0.25,
            journey_chance:     0.15,
            aggression:         0.2,
            frontier_bias:      -1.0,
        }
    }

    pub fn greedy() -> Self {
        Self {
            reward:             1.5,
            distance:           0.15,
            risk:               1.0,
            explore_affinity:   0.4,
            attack_affinity:    0.6,
            defend_affinity:    0.2,
            defend_willingness: 0.2,
            journey_chance:     0.3,
            aggression:         0.4,
            frontier_bias:      0.5,
        }
    }
}

/// Weights for every archetype.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ArchetypeTable {
    pub brave:    ArchetypeWeights,
    pub cautious: ArchetypeWeights,
    pub greedy:   ArchetypeWeights,
    pub balanced: ArchetypeWeights,
}

impl Default for ArchetypeTable {
    fn default() -> Self {
        Self {
            brave:    ArchetypeWeights::brave(),
            cautious: ArchetypeWeights::cautious(),
            greedy:   ArchetypeWeights::greedy(),
            balanced: ArchetypeWeights::balanced(),
        }
    }
}

impl ArchetypeTable {
    #[inline]
    pub fn get(&self, archetype: Archetype) -> &ArchetypeWeights {
        match archetype {
            Archetype::Brave    => &self.brave,
            Archetype::Cautious => &self.cautious,
            Archetype::Greedy   => &self.greedy,
            Archetype::Balanced => &self.balanced,
        }
    }
}
