//! One agent's state and the bookkeeping the engine keeps on it.

use ka_advisor::{AdvisorAction, Decision, DecisionOrigin};
use ka_core::{AgentId, Archetype, RestConfig, SimTime, StructureId, WorldPos};
use ka_nav::NavState;
use ka_world::{ItemKind, ShopItem};

use crate::{AgentState, Target, TargetKey};

// ── Bookkeeping ───────────────────────────────────────────────────────────────

/// The three commitment windows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CommitKind {
    Combat,
    Bounty,
    Frontier,
}

/// Expiry times of the commitment windows.  A window is active while `now`
/// is strictly before its expiry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Commitments {
    pub combat_until:   Option<SimTime>,
    pub bounty_until:   Option<SimTime>,
    pub frontier_until: Option<SimTime>,
}

impl Commitments {
    fn slot(&mut self, kind: CommitKind) -> &mut Option<SimTime> {
        match kind {
            CommitKind::Combat   => &mut self.combat_until,
            CommitKind::Bounty   => &mut self.bounty_until,
            CommitKind::Frontier => &mut self.frontier_until,
        }
    }

    pub fn until(&self, kind: CommitKind) -> Option<SimTime> {
        match kind {
            CommitKind::Combat   => self.combat_until,
            CommitKind::Bounty   => self.bounty_until,
            CommitKind::Frontier => self.frontier_until,
        }
    }

    pub fn commit(&mut self, kind: CommitKind, now: SimTime, secs: f32) {
        *self.slot(kind) = Some(now.plus_secs(secs));
    }

    pub fn release(&mut self, kind: CommitKind) {
        *self.slot(kind) = None;
    }

    #[inline]
    pub fn is_active(&self, kind: CommitKind, now: SimTime) -> bool {
        self.until(kind).is_some_and(|t| now < t)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Progress checkpoint and recovery counter for stuck detection.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StuckTracker {
    pub checkpoint_pos:  WorldPos,
    pub checkpoint_at:   SimTime,
    pub stuck:           bool,
    pub reason:          Option<&'static str>,
    /// Recovery attempts made for `attempt_key`.
    pub attempts:        u8,
    pub attempt_key:     Option<TargetKey>,
    pub last_attempt_at: Option<SimTime>,
    /// Times the stuck flag was raised over the agent's life.
    pub stuck_events:    u32,
    /// Times recovery abandoned a target.
    pub forced_resets:   u32,
}

impl StuckTracker {
    /// Record progress: new checkpoint, flag and attempts cleared.
    pub fn checkpoint(&mut self, pos: WorldPos, now: SimTime) {
        self.checkpoint_pos = pos;
        self.checkpoint_at = now;
        self.clear_flag();
        self.reset_attempts();
    }

    pub fn clear_flag(&mut self) {
        self.stuck = false;
        self.reason = None;
    }

    pub fn reset_attempts(&mut self) {
        self.attempts = 0;
        self.attempt_key = None;
        self.last_attempt_at = None;
    }

    pub fn raise(&mut self, reason: &'static str) {
        if !self.stuck {
            self.stuck_events += 1;
        }
        self.stuck = true;
        self.reason = Some(reason);
    }
}

/// Advisory request bookkeeping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdvisoryBook {
    pub last_request: Option<SimTime>,
    pub pending:      bool,
    pub submitted:    u32,
    pub applied:      u32,
    pub ignored:      u32,
}

impl AdvisoryBook {
    pub fn cooldown_elapsed(&self, now: SimTime, cooldown_secs: f32) -> bool {
        self.last_request
            .is_none_or(|t| now >= t.plus_secs(cooldown_secs))
    }
}

/// Rest bookkeeping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RestState {
    /// Damage taken since last leaving home.
    pub damage_since_left: u32,
    /// HP when last leaving home.  `None` before the first rest.
    pub hp_when_left:      Option<u32>,
    pub healed_this_rest:  u32,
    pub next_heal_at:      SimTime,
}

/// Journey bookkeeping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JourneyState {
    pub last_purchase_at: Option<SimTime>,
    pub cooldown_until:   Option<SimTime>,
    pub journeys:         u32,
}

impl JourneyState {
    #[inline]
    pub fn in_cooldown(&self, now: SimTime) -> bool {
        self.cooldown_until.is_some_and(|t| now < t)
    }
}

/// The last decision applied to an agent and where it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecisionRecord {
    pub action: AdvisorAction,
    pub target: Option<String>,
    pub reason: String,
    pub origin: DecisionOrigin,
    pub at:     SimTime,
}

impl DecisionRecord {
    pub fn from_decision(decision: &Decision, origin: DecisionOrigin, at: SimTime) -> Self {
        Self {
            action: decision.action,
            target: decision.target.clone(),
            reason: decision.reason.clone(),
            origin,
            at,
        }
    }
}

/// An equipped weapon or armor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gear {
    pub name:  &'static str,
    pub power: u32,
}

// ── Agent ─────────────────────────────────────────────────────────────────────

pub const BASE_HP: u32 = 100;
pub const BASE_ATTACK: u32 = 10;
pub const BASE_DEFENSE: u32 = 5;
pub const DEFAULT_SPEED: f32 = 120.0;
pub const DEFAULT_POTION_HEAL: u32 = 50;

/// One autonomous agent.  Owned by [`AgentStore`](crate::AgentStore) and
/// mutated only by the engine on the agent's own turn.
#[derive(Clone, Debug)]
pub struct Agent {
    pub id:           AgentId,
    pub name:         String,
    pub archetype:    Archetype,

    pub pos:          WorldPos,
    /// Where the agent appeared; patrol fallback when there is no home base.
    pub spawn:        WorldPos,
    pub state:        AgentState,
    pub target:       Target,

    pub hp:           u32,
    pub max_hp:       u32,
    pub gold:         u32,
    pub potions:      u32,
    pub potion_heal:  u32,
    pub weapon:       Option<Gear>,
    pub armor:        Option<Gear>,
    /// World units.
    pub attack_range: f32,
    /// World units per second.
    pub speed:        f32,
    pub home:         Option<StructureId>,

    pub nav:          NavState,
    pub commit:       Commitments,
    pub stuck:        StuckTracker,
    pub advisory:     AdvisoryBook,
    pub rest:         RestState,
    pub journey:      JourneyState,

    /// Neutral structure whose distress call was last declined, and when.
    pub declined_distress: Option<(StructureId, SimTime)>,

    /// Free-form diagnostic label, refreshed every tick.
    pub intent:        &'static str,
    pub last_decision: Option<DecisionRecord>,
}

impl Agent {
    pub fn new(id: AgentId, pos: WorldPos, tile_size: f32) -> Self {
        Self {
            id,
            name: format!("agent-{}", id.0),
            archetype: Archetype::default(),
            pos,
            spawn: pos,
            state: AgentState::Idle,
            target: Target::None,
            hp: BASE_HP,
            max_hp: BASE_HP,
            gold: 0,
            potions: 0,
            potion_heal: DEFAULT_POTION_HEAL,
            weapon: None,
            armor: None,
            attack_range: tile_size * 1.5,
            speed: DEFAULT_SPEED,
            home: None,
            nav: NavState::default(),
            commit: Commitments::default(),
            stuck: StuckTracker { checkpoint_pos: pos, ..StuckTracker::default() },
            advisory: AdvisoryBook::default(),
            rest: RestState::default(),
            journey: JourneyState::default(),
            declined_distress: None,
            intent: "idle",
            last_decision: None,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state != AgentState::Dead && self.hp > 0
    }

    /// Health in `[0, 1]`.
    pub fn health_frac(&self) -> f32 {
        if self.max_hp == 0 {
            return 0.0;
        }
        self.hp as f32 / self.max_hp as f32
    }

    #[inline]
    pub fn is_full_health(&self) -> bool {
        self.hp >= self.max_hp
    }

    pub fn attack(&self) -> u32 {
        BASE_ATTACK + self.weapon.map_or(0, |g| g.power)
    }

    pub fn defense(&self) -> u32 {
        BASE_DEFENSE + self.armor.map_or(0, |g| g.power)
    }

    // ── Targets ───────────────────────────────────────────────────────────

    /// Replace the target.  A change of identity drops the cached path.
    /// Returns whether the identity changed.
    pub fn set_target(&mut self, target: Target) -> bool {
        let changed = target.key() != self.target.key();
        if changed {
            self.nav.clear();
        }
        self.target = target;
        changed
    }

    /// Set state and target together.
    pub fn go(&mut self, state: AgentState, target: Target) -> bool {
        self.state = state;
        self.set_target(target)
    }

    /// Drop the target and stand idle.
    pub fn stand_down(&mut self) {
        self.go(AgentState::Idle, Target::None);
    }

    // ── Health ────────────────────────────────────────────────────────────

    /// Apply `amount` raw damage, reduced by defense with a floor of one.
    /// Returns `true` if this killed the agent.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        let dealt = amount.saturating_sub(self.defense()).max(1);
        self.hp = self.hp.saturating_sub(dealt);
        self.rest.damage_since_left += dealt;
        if self.hp == 0 {
            self.state = AgentState::Dead;
            self.target = Target::None;
            self.nav.clear();
            return true;
        }
        false
    }

    pub fn heal(&mut self, amount: u32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    /// Drink a potion if one is carried.
    pub fn use_potion(&mut self) -> bool {
        if self.potions == 0 {
            return false;
        }
        self.potions -= 1;
        self.heal(self.potion_heal);
        true
    }

    // ── Resting ───────────────────────────────────────────────────────────

    /// Hurt enough since leaving home to go back and rest.
    pub fn should_go_home_to_rest(&self, cfg: &RestConfig) -> bool {
        if self.state == AgentState::Resting {
            return false;
        }
        if self.rest.damage_since_left >= cfg.damage_trigger {
            return true;
        }
        // Left home still hurt: a smaller extra hit is enough.
        let missing_when_left = self.rest.hp_when_left.map_or(0, |hp| self.max_hp.saturating_sub(hp));
        missing_when_left > cfg.hurt_on_leave && self.rest.damage_since_left >= cfg.extra_damage_trigger
    }

    pub fn start_resting(&mut self, now: SimTime, cfg: &RestConfig) {
        self.state = AgentState::Resting;
        self.target = Target::None;
        self.nav.clear();
        self.rest.healed_this_rest = 0;
        self.rest.next_heal_at = now.plus_secs(cfg.heal_interval_secs);
    }

    /// Leave home: the damage counters restart from here.
    pub fn finish_resting(&mut self) {
        self.state = AgentState::Idle;
        self.rest.hp_when_left = Some(self.hp);
        self.rest.damage_since_left = 0;
        self.rest.healed_this_rest = 0;
    }

    // ── Shopping ──────────────────────────────────────────────────────────

    /// Pay for and take `item`.  Fails without charge when the agent can't
    /// afford it or already carries `max_potions` potions.
    pub fn buy(&mut self, item: &ShopItem, max_potions: u32) -> bool {
        if self.gold < item.price {
            return false;
        }
        match item.kind {
            ItemKind::Potion => {
                if self.potions >= max_potions {
                    return false;
                }
                self.potions += 1;
            }
            ItemKind::Weapon => self.weapon = Some(Gear { name: item.name, power: item.power }),
            ItemKind::Armor => self.armor = Some(Gear { name: item.name, power: item.power }),
        }
        self.gold -= item.price;
        true
    }

    /// Whether `item` would improve on what is equipped.
    pub fn is_upgrade(&self, item: &ShopItem) -> bool {
        match item.kind {
            ItemKind::Potion => false,
            ItemKind::Weapon => item.power > self.weapon.map_or(0, |g| g.power),
            ItemKind::Armor => item.power > self.armor.map_or(0, |g| g.power),
        }
    }
}
