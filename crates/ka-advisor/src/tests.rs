//! Unit tests for ka-advisor.

use std::time::{Duration, Instant};

use ka_core::{AgentId, Archetype};

use crate::*;

fn ctx() -> AdvisorContext {
    AdvisorContext {
        agent: AgentId(1),
        archetype: Archetype::Balanced,
        hp: 100,
        max_hp: 100,
        gold: 0,
        potions: 0,
        ..AdvisorContext::default()
    }
}

/// Poll until a decision shows up or two seconds pass.
fn wait_for(advisor: &mut dyn Advisor, agent: AgentId) -> Option<Advice> {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if let Some(d) = advisor.poll(agent) {
            return Some(d);
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    None
}

#[cfg(test)]
mod parsing {
    use super::*;

    #[test]
    fn plain_object() {
        let d = parse_decision(r#"{"action":"retreat","target":"castle","reason":"hurt"}"#).unwrap();
        assert_eq!(d.action, AdvisorAction::Retreat);
        assert_eq!(d.target(), Some("castle"));
        assert_eq!(d.reason, "hurt");
    }

    #[test]
    fn object_wrapped_in_prose() {
        let text = "Sure! Here you go:\n```json\n{\"action\": \"buy_item\", \"target\": \"iron_sword\", \"reasoning\": \"upgrade\"}\n```";
        let d = parse_decision(text).unwrap();
        assert_eq!(d.action, AdvisorAction::BuyItem);
        assert_eq!(d.target(), Some("iron_sword"));
        assert_eq!(d.reason, "upgrade", "reasoning is an alias of reason");
    }

    #[test]
    fn labels_are_normalized() {
        assert_eq!(AdvisorAction::from_label(" Use-Potion "), AdvisorAction::UsePotion);
        assert_eq!(AdvisorAction::from_label("ACCEPT_BOUNTY"), AdvisorAction::AcceptBounty);
    }

    #[test]
    fn out_of_vocabulary_is_unknown() {
        let d = parse_decision(r#"{"action":"dance","target":""}"#).unwrap();
        assert_eq!(d.action, AdvisorAction::Unknown);
        assert_eq!(d.target, None, "empty target is none");
        assert!(!d.is_known());

        let d = parse_decision(r#"{"target":"castle"}"#).unwrap();
        assert_eq!(d.action, AdvisorAction::Unknown);
    }

    #[test]
    fn malformed_text_is_an_error() {
        assert!(matches!(parse_decision("retreat now!"), Err(AdvisorError::Malformed(_))));
        assert!(matches!(parse_decision("} backwards {"), Err(AdvisorError::Malformed(_))));
        assert!(matches!(parse_decision("{not json}"), Err(AdvisorError::Json(_))));
    }
}

#[cfg(test)]
mod fallback_table {
    use super::*;

    #[test]
    fn critical_health() {
        let mut c = AdvisorContext { critical_health: true, low_health: true, hp: 10, ..ctx() };
        assert_eq!(fallback_decision(&c).action, AdvisorAction::Retreat);
        assert_eq!(fallback_decision(&c).target(), Some("castle"));
        c.potions = 1;
        assert_eq!(fallback_decision(&c).action, AdvisorAction::UsePotion);
    }

    #[test]
    fn low_health_in_combat() {
        let mut c = AdvisorContext { low_health: true, in_combat: true, enemies_nearby: 1, ..ctx() };
        let d = fallback_decision(&c);
        assert_eq!(d.action, AdvisorAction::Retreat);
        assert_eq!(d.target(), Some("marketplace"));
        c.potions = 2;
        assert_eq!(fallback_decision(&c).action, AdvisorAction::UsePotion);
    }

    #[test]
    fn shop_when_hurt_and_short() {
        let c = AdvisorContext {
            low_health: true,
            can_shop: true,
            potion_affordable: true,
            potions: 1,
            ..ctx()
        };
        assert_eq!(fallback_decision(&c).action, AdvisorAction::BuyItem);

        let stocked = AdvisorContext { potions: 2, ..c.clone() };
        assert_eq!(fallback_decision(&stocked).action, AdvisorAction::Explore);
        let broke = AdvisorContext { potion_affordable: false, ..c };
        assert_eq!(fallback_decision(&broke).action, AdvisorAction::Explore);
    }

    #[test]
    fn fight_only_when_healthy() {
        let c = AdvisorContext { enemies_nearby: 2, ..ctx() };
        assert_eq!(fallback_decision(&c).action, AdvisorAction::Fight);
        let hurt = AdvisorContext { low_health: true, ..c };
        assert_eq!(fallback_decision(&hurt).action, AdvisorAction::Explore);
    }

    #[test]
    fn default_is_explore() {
        assert_eq!(fallback_decision(&ctx()).action, AdvisorAction::Explore);
    }

    #[test]
    fn context_helpers() {
        let c = AdvisorContext { hp: 33, max_hp: 120, enemies_nearby: 3, allies_nearby: 1, ..ctx() };
        assert_eq!(c.health_pct(), 28);
        assert!(c.outnumbered());
        assert_eq!(AdvisorContext { max_hp: 0, ..c }.health_pct(), 0);
    }
}

#[cfg(test)]
mod providers {
    use super::*;

    #[test]
    fn provider_failure_uses_fallback() {
        let mut p = ScriptedProvider::default().fail("offline");
        let c = AdvisorContext { enemies_nearby: 1, ..ctx() };
        let advice = resolve(&mut p, AgentId(1), &c);
        assert_eq!(advice.decision, fallback_decision(&c));
        assert_eq!(advice.origin, DecisionOrigin::Fallback);
    }

    #[test]
    fn answered_replies_come_from_the_advisor() {
        let mut p = ScriptedProvider::new([r#"{"action":"fight"}"#]).fail("offline");
        let first = resolve(&mut p, AgentId(1), &ctx());
        assert_eq!(first.origin, DecisionOrigin::Advisor);
        assert_eq!(first.decision.action, AdvisorAction::Fight);
        assert_eq!(resolve(&mut p, AgentId(1), &ctx()).origin, DecisionOrigin::Fallback);
        assert_eq!(resolve(&mut p, AgentId(1), &ctx()).origin, DecisionOrigin::Fallback, "exhausted script");
    }

    #[test]
    fn unparseable_reply_is_unknown() {
        let mut p = ScriptedProvider::new(["no idea"]);
        let advice = resolve(&mut p, AgentId(1), &ctx());
        assert_eq!(advice.decision.action, AdvisorAction::Unknown);
        assert_eq!(advice.origin, DecisionOrigin::Advisor);
        assert_eq!(p.remaining(), 0);
    }

    #[test]
    fn mock_is_reproducible() {
        let contexts: Vec<_> = (0..40u32)
            .map(|i| AdvisorContext {
                archetype: Archetype::ALL[(i % 4) as usize],
                hp: 100 - i * 2,
                low_health: i > 25,
                in_combat: i % 3 == 0,
                can_shop: i % 5 == 0,
                affordable: vec!["healing_potion".into()],
                enemies_nearby: i % 4,
                ..ctx()
            })
            .collect();
        let run = |seed| {
            let mut p = MockProvider::new(seed);
            contexts.iter().map(|c| resolve(&mut p, c.agent, c)).collect::<Vec<_>>()
        };
        assert_eq!(run(7), run(7));
        assert!(!format!("{:?}", MockProvider::new(7)).is_empty());
    }

    #[test]
    fn mock_rules() {
        let mut p = MockProvider::new(1);
        let critical = AdvisorContext { critical_health: true, low_health: true, hp: 10, ..ctx() };
        assert_eq!(resolve(&mut p, AgentId(1), &critical).decision.action, AdvisorAction::Retreat);

        let cautious = AdvisorContext { archetype: Archetype::Cautious, low_health: true, hp: 45, potions: 1, ..ctx() };
        assert_eq!(resolve(&mut p, AgentId(1), &cautious).decision.action, AdvisorAction::UsePotion);

        let brawl = AdvisorContext { in_combat: true, enemies_nearby: 1, ..ctx() };
        assert_eq!(resolve(&mut p, AgentId(1), &brawl).decision.action, AdvisorAction::Fight);
    }
}

#[cfg(test)]
mod advisors {
    use super::*;

    #[test]
    fn inline_resolves_on_submit() {
        let mut adv = InlineAdvisor::new(ScriptedProvider::new([r#"{"action":"fight"}"#]));
        assert!(adv.poll(AgentId(3)).is_none());
        adv.submit(AgentId(3), ctx()).unwrap();
        let advice = adv.poll(AgentId(3)).expect("ready after submit");
        assert_eq!(advice.decision.action, AdvisorAction::Fight);
        assert_eq!(advice.origin, DecisionOrigin::Advisor);
        assert!(adv.poll(AgentId(3)).is_none(), "poll hands a decision out once");
    }

    #[test]
    fn channel_round_trip_per_agent() {
        let provider = ScriptedProvider::default()
            .reply(r#"{"action":"retreat","target":"castle"}"#)
            .reply(r#"{"action":"explore"}"#);
        let mut adv = ChannelAdvisor::spawn(provider);
        adv.submit(AgentId(1), ctx()).unwrap();
        adv.submit(AgentId(2), ctx()).unwrap();

        let d1 = wait_for(&mut adv, AgentId(1)).expect("reply for agent 1");
        let d2 = wait_for(&mut adv, AgentId(2)).expect("reply for agent 2");
        assert_eq!(d1.decision.action, AdvisorAction::Retreat);
        assert_eq!(d2.decision.action, AdvisorAction::Explore);
        assert_eq!(d1.origin, DecisionOrigin::Advisor);
        assert_eq!(adv.ready_len(), 0);
    }

    #[test]
    fn channel_falls_back_when_provider_fails() {
        let mut adv = ChannelAdvisor::spawn(ScriptedProvider::default());
        let c = AdvisorContext { critical_health: true, low_health: true, potions: 1, ..ctx() };
        adv.submit(AgentId(9), c).unwrap();
        let d = wait_for(&mut adv, AgentId(9)).expect("fallback reply");
        assert_eq!(d.decision.action, AdvisorAction::UsePotion);
        assert_eq!(d.origin, DecisionOrigin::Fallback);
    }

    #[test]
    fn inline_keeps_the_fallback_origin() {
        let mut adv = InlineAdvisor::new(ScriptedProvider::default().fail("rate limited"));
        adv.submit(AgentId(4), ctx()).unwrap();
        let advice = adv.poll(AgentId(4)).expect("fallback is still handed out");
        assert_eq!(advice.origin, DecisionOrigin::Fallback);
        assert_eq!(advice.decision, fallback_decision(&ctx()));
    }

    #[test]
    fn drop_joins_worker() {
        let adv = ChannelAdvisor::spawn(MockProvider::new(0));
        assert_eq!(adv.name(), "mock");
        drop(adv);
    }
}
