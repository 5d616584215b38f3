//! The advisory decision vocabulary and reply parsing.

use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::{AdvisorError, AdvisorResult};

/// What an advisor may tell an agent to do.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisorAction {
    Retreat,
    Fight,
    BuyItem,
    UsePotion,
    Explore,
    AcceptBounty,
    /// Anything outside the vocabulary.  Recorded, never acted on.
    Unknown,
}

impl AdvisorAction {
    pub const ALL: [AdvisorAction; 7] = [
        AdvisorAction::Retreat,
        AdvisorAction::Fight,
        AdvisorAction::BuyItem,
        AdvisorAction::UsePotion,
        AdvisorAction::Explore,
        AdvisorAction::AcceptBounty,
        AdvisorAction::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AdvisorAction::Retreat      => "retreat",
            AdvisorAction::Fight        => "fight",
            AdvisorAction::BuyItem      => "buy_item",
            AdvisorAction::UsePotion    => "use_potion",
            AdvisorAction::Explore      => "explore",
            AdvisorAction::AcceptBounty => "accept_bounty",
            AdvisorAction::Unknown      => "unknown",
        }
    }

    /// Parse an action label.  Case and `-`/`_` are not significant; labels
    /// outside the vocabulary map to [`AdvisorAction::Unknown`].
    pub fn from_label(label: &str) -> Self {
        let norm = label.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == norm)
            .unwrap_or(AdvisorAction::Unknown)
    }
}

impl fmt::Display for AdvisorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an applied decision came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOrigin {
    /// A response polled from the configured advisor.
    Advisor,
    /// The local fallback table, evaluated synchronously.
    Fallback,
    /// The engine's own handlers.
    #[default]
    Engine,
}

impl DecisionOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            DecisionOrigin::Advisor  => "advisor",
            DecisionOrigin::Fallback => "fallback",
            DecisionOrigin::Engine   => "engine",
        }
    }
}

impl fmt::Display for DecisionOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decision together with where it came from, as handed out by
/// [`resolve`](crate::resolve) and [`Advisor::poll`](crate::Advisor::poll).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Advice {
    pub decision: Decision,
    pub origin:   DecisionOrigin,
}

impl Advice {
    pub fn from_advisor(decision: Decision) -> Self {
        Self { decision, origin: DecisionOrigin::Advisor }
    }

    pub fn from_fallback(decision: Decision) -> Self {
        Self { decision, origin: DecisionOrigin::Fallback }
    }
}

/// One advisory decision: `{action, target, reason}`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Decision {
    pub action: AdvisorAction,
    /// Free-form target hint ("castle", "marketplace", an item name).
    /// Empty targets are stored as `None`.
    pub target: Option<String>,
    pub reason: String,
}

impl Decision {
    pub fn new(action: AdvisorAction, target: Option<&str>, reason: impl Into<String>) -> Self {
        Self {
            action,
            target: target.filter(|t| !t.is_empty()).map(str::to_owned),
            reason: reason.into(),
        }
    }

    /// An `unknown` decision carrying why it could not be understood.
    pub fn unknown(reason: impl Into<String>) -> Self {
        Self::new(AdvisorAction::Unknown, None, reason)
    }

    #[inline]
    pub fn is_known(&self) -> bool {
        self.action != AdvisorAction::Unknown
    }

    #[inline]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

/// Parse an advisor's text reply.
///
/// The outermost `{ … }` span is extracted so replies wrapped in prose or code
/// fences still parse.  `reasoning` is accepted in place of `reason`.  An
/// action outside the vocabulary, or a missing one, yields
/// [`AdvisorAction::Unknown`]; only text with no JSON object in it is an
/// error.
pub fn parse_decision(text: &str) -> AdvisorResult<Decision> {
    let text = text.trim();
    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Err(AdvisorError::Malformed("no JSON object in reply".into()));
    };
    if end < start {
        return Err(AdvisorError::Malformed("no JSON object in reply".into()));
    }

    let value: Value = serde_json::from_str(&text[start..=end])?;
    let Value::Object(map) = value else {
        return Err(AdvisorError::Malformed("reply is not a JSON object".into()));
    };

    let field = |key: &str| map.get(key).and_then(Value::as_str);

    let action = field("action").map(AdvisorAction::from_label).unwrap_or(AdvisorAction::Unknown);
    let reason = field("reason").or_else(|| field("reasoning")).unwrap_or_default();
    let decision = Decision::new(action, field("target").map(str::trim), reason);

    if !decision.is_known() {
        debug!(raw = ?field("action"), "advisor reply names no known action");
    }
    Ok(decision)
}
