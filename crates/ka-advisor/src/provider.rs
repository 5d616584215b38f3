//! Decision providers: whatever actually produces the advisor's reply text.
//!
//! A provider is the opaque external reasoner.  The engine only ever sees
//! the parsed [`Decision`]; [`resolve`] turns a provider reply (or failure)
//! into one.

use std::collections::VecDeque;

use serde_json::json;
use tracing::warn;

use ka_core::{AgentId, Archetype, StreamRng, streams};

use crate::{Advice, AdvisorContext, AdvisorError, AdvisorResult, Decision, fallback_decision, parse_decision};

/// Produces a text reply for one context.
pub trait DecisionProvider: Send {
    fn name(&self) -> &str;

    fn complete(&mut self, ctx: &AdvisorContext) -> AdvisorResult<String>;
}

/// Ask `provider` about `ctx` and turn the outcome into a decision.
///
/// - provider failure → the fallback table, with origin `Fallback`;
/// - reply with no JSON object → `unknown` (the engine logs and ignores it);
/// - otherwise the parsed reply.
///
/// Anything the provider actually answered has origin `Advisor`.
pub fn resolve(provider: &mut dyn DecisionProvider, agent: AgentId, ctx: &AdvisorContext) -> Advice {
    match provider.complete(ctx) {
        Ok(text) => match parse_decision(&text) {
            Ok(decision) => Advice::from_advisor(decision),
            Err(e) => {
                warn!(%agent, provider = provider.name(), error = %e, "unparseable advisor reply");
                Advice::from_advisor(Decision::unknown(e.to_string()))
            }
        },
        Err(e) => {
            warn!(%agent, provider = provider.name(), error = %e, "provider failed; using fallback table");
            Advice::from_fallback(fallback_decision(ctx))
        }
    }
}

// ── MockProvider ──────────────────────────────────────────────────────────────

/// Rule-based stand-in for an external reasoner.
///
/// Personality-flavored rules over the context flags; the few coin flips it
/// makes come from its own named stream so replies are reproducible.
#[derive(Debug)]
pub struct MockProvider {
    rng: StreamRng,
}

impl MockProvider {
    pub fn new(base_seed: u64) -> Self {
        Self { rng: StreamRng::for_stream(base_seed, streams::MOCK_ADVISOR) }
    }

    fn decide(&mut self, ctx: &AdvisorContext) -> (&'static str, &'static str, String) {
        let pct = ctx.health_pct();
        let timid = matches!(ctx.archetype, Archetype::Cautious | Archetype::Greedy);

        if ctx.critical_health {
            return if ctx.has_potions() {
                ("use_potion", "", format!("critical health at {pct}%, drinking"))
            } else {
                ("retreat", "castle", format!("critical health at {pct}% and no potions"))
            };
        }

        if ctx.low_health {
            match ctx.archetype {
                Archetype::Brave => {
                    if ctx.has_potions() && pct < 30 {
                        return ("use_potion", "", "getting low, drinking to keep fighting".into());
                    }
                    if ctx.in_combat && !ctx.outnumbered() {
                        return ("fight", "", "still got fight left".into());
                    }
                }
                Archetype::Cautious | Archetype::Greedy => {
                    return if ctx.has_potions() {
                        ("use_potion", "", "health getting low".into())
                    } else {
                        ("retreat", "marketplace", "low health and no potions".into())
                    };
                }
                Archetype::Balanced => {
                    if ctx.has_potions() && pct < 40 {
                        return ("use_potion", "", "drinking at moderate health".into());
                    }
                }
            }
        }

        if ctx.outnumbered() && ctx.in_combat {
            if timid {
                return ("retreat", "castle", "outnumbered".into());
            }
            if ctx.archetype == Archetype::Brave && self.rng.gen_bool(0.3) {
                return ("retreat", "castle", "outnumbered, tactical retreat".into());
            }
        }

        if ctx.can_shop && !ctx.in_combat && !ctx.affordable.is_empty() {
            if ctx.low_health {
                return ("buy_item", "healing_potion", "buying a potion while I can".into());
            }
            if ctx.archetype == Archetype::Greedy || self.rng.gen_bool(0.4) {
                return ("buy_item", "healing_potion", "stocking up".into());
            }
        }

        if ctx.in_combat {
            return ("fight", "", "engaging".into());
        }
        ("explore", "", "looking for adventure".into())
    }
}

impl DecisionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn complete(&mut self, ctx: &AdvisorContext) -> AdvisorResult<String> {
        let (action, target, reasoning) = self.decide(ctx);
        let reply = json!({ "action": action, "target": target, "reasoning": reasoning });
        Ok(reply.to_string())
    }
}

// ── ScriptedProvider ──────────────────────────────────────────────────────────

/// Replays canned replies in order.  Once the script runs out every call
/// fails, which exercises the fallback path.
#[derive(Debug, Default, Clone)]
pub struct ScriptedProvider {
    replies: VecDeque<Result<String, String>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { replies: replies.into_iter().map(|s| Ok(s.into())).collect() }
    }

    /// Queue a reply.
    pub fn reply(mut self, text: impl Into<String>) -> Self {
        self.replies.push_back(Ok(text.into()));
        self
    }

    /// Queue a provider failure.
    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.replies.push_back(Err(message.into()));
        self
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }
}

impl DecisionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn complete(&mut self, _ctx: &AdvisorContext) -> AdvisorResult<String> {
        match self.replies.pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(msg)) => Err(AdvisorError::Provider(msg)),
            None => Err(AdvisorError::Provider("script exhausted".into())),
        }
    }
}
