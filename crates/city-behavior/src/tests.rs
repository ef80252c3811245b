//! Unit tests for city-behavior.

use city_citizen::Citizen;
use city_core::{CitizenId, Phase, Position, Tick};
use city_schedule::{Activity, Destination, Schedule, ScheduleWindow};

use crate::{BehaviorState, CitizenView, DecisionContext, DecisionTrigger, NeighborView};

// ── Helpers ───────────────────────────────────────────────────────────────────

const HOME: Position = Position { x: 0, y: 0 };
const WORK: Position = Position { x: 5, y: 5 };

/// 24-tick day: sleep 0–8, commute 8, work 9–17, leisure 17–24.
fn day_schedule() -> Schedule {
    Schedule::new(
        vec![
            ScheduleWindow::new(0, 8, Activity::Sleep, Destination::Home),
            ScheduleWindow::new(8, 1, Activity::Commute, Destination::Anywhere),
            ScheduleWindow::new(9, 8, Activity::Work, Destination::Work),
            ScheduleWindow::new(17, 7, Activity::Leisure, Destination::Anywhere),
        ],
        24,
    )
}

fn worker(id: u32) -> Citizen {
    let mut c = Citizen::new(format!("citizen-{id}"), HOME)
        .with_work(WORK)
        .with_schedule(day_schedule());
    c.id = CitizenId(id);
    c
}

fn neighbor(id: u32, co_located: bool) -> NeighborView {
    NeighborView {
        id: CitizenId(id),
        name: format!("citizen-{id}"),
        co_located,
        affinity: None,
        relationship: None,
    }
}

fn context(neighbors: Vec<NeighborView>) -> DecisionContext {
    DecisionContext {
        citizen:   CitizenView::new(&worker(0), HOME),
        state:     BehaviorState::default(),
        trigger:   DecisionTrigger::ScheduleBoundary,
        scheduled: Some(Activity::Leisure),
        tick:      Tick(20),
        day:       0,
        phase:     Phase::Day,
        memories:  Vec::new(),
        neighbors,
    }
}

// ── Transitions ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod transitions {
    use city_core::OracleConfig;

    use super::*;
    use crate::{Action, BehaviorEngine, Effect, IdleReason, Movement, OracleError, Resolution, Situation, Step};

    fn at<'a>(citizen: &'a Citizen, state: &'a BehaviorState, tick: u64) -> Situation<'a> {
        Situation {
            citizen,
            state,
            position: HOME,
            tick: Tick(tick),
            nearby: None,
            last_interrupt: None,
        }
    }

    fn engine() -> BehaviorEngine {
        BehaviorEngine::new(OracleConfig::default())
    }

    #[test]
    fn scheduled_follows_window_destination() {
        let c = worker(0);
        let state = BehaviorState::default();
        let step = engine().evaluate(at(&c, &state, 10));
        assert_eq!(
            step,
            Step::Settled(Resolution {
                state:   BehaviorState::Scheduled { activity: Some(Activity::Work) },
                effects: vec![Effect::MoveTo { target: WORK, movement: Movement::Teleport }],
                error:   None,
            })
        );
    }

    #[test]
    fn no_move_when_already_there_or_anywhere() {
        let c = worker(0);
        let state = BehaviorState::default();
        let Step::Settled(r) = engine().evaluate(Situation { position: WORK, ..at(&c, &state, 10) }) else {
            panic!("expected settled");
        };
        assert!(r.effects.is_empty());

        let Step::Settled(r) = engine().evaluate(at(&c, &state, 20)) else {
            panic!("expected settled");
        };
        assert_eq!(r.state, BehaviorState::Scheduled { activity: Some(Activity::Leisure) });
        assert!(r.effects.is_empty());
    }

    #[test]
    fn boundary_starts_decision() {
        let c = worker(0);
        let state = BehaviorState::default();
        for tick in [8, 9, 17, 24] {
            assert_eq!(
                engine().evaluate(at(&c, &state, tick)),
                Step::Decide(DecisionTrigger::ScheduleBoundary),
                "tick {tick}"
            );
        }
    }

    #[test]
    fn proximity_interrupt_respects_cooldown() {
        let c = worker(0);
        let state = BehaviorState::default();
        let nearby = Situation { nearby: Some(CitizenId(3)), ..at(&c, &state, 12) };
        assert_eq!(engine().evaluate(nearby), Step::Decide(DecisionTrigger::Proximity(CitizenId(3))));

        let cooling = Situation { last_interrupt: Some(Tick(10)), ..nearby };
        assert!(matches!(engine().evaluate(cooling), Step::Settled(_)));

        let cooled = Situation { last_interrupt: Some(Tick(4)), ..nearby };
        assert!(matches!(engine().evaluate(cooled), Step::Decide(_)));
    }

    #[test]
    fn sleeping_citizens_are_not_interrupted() {
        let c = worker(0);
        let state = BehaviorState::default();
        let s = Situation { nearby: Some(CitizenId(1)), ..at(&c, &state, 3) };
        assert!(matches!(engine().evaluate(s), Step::Settled(_)));
    }

    #[test]
    fn acting_until_deadline_then_scheduled() {
        let c = worker(0);
        let state = BehaviorState::Acting { action: Action::Work, started: Tick(9), until: Tick(12) };

        let Step::Settled(r) = engine().evaluate(at(&c, &state, 11)) else {
            panic!("expected settled");
        };
        assert_eq!(r.state, state);
        assert!(r.effects.is_empty());

        let Step::Settled(r) = engine().evaluate(at(&c, &state, 12)) else {
            panic!("expected settled");
        };
        assert_eq!(r.state, BehaviorState::Scheduled { activity: Some(Activity::Work) });
    }

    #[test]
    fn action_ending_on_boundary_decides_again() {
        let c = worker(0);
        let state = BehaviorState::Acting { action: Action::Rest, started: Tick(13), until: Tick(17) };
        assert_eq!(
            engine().evaluate(at(&c, &state, 17)),
            Step::Decide(DecisionTrigger::ScheduleBoundary)
        );
    }

    #[test]
    fn idle_waits_for_next_boundary() {
        let c = worker(0);
        let state = BehaviorState::Idle { since: Tick(9), reason: IdleReason::OracleTimeout };

        let Step::Settled(r) = engine().evaluate(at(&c, &state, 12)) else {
            panic!("expected settled");
        };
        assert_eq!(r.state, state);

        let Step::Settled(r) = engine().evaluate(at(&c, &state, 17)) else {
            panic!("expected settled");
        };
        assert_eq!(r.state, BehaviorState::Scheduled { activity: Some(Activity::Leisure) });
    }

    #[test]
    fn stale_deciding_becomes_idle() {
        let c = worker(0);
        let state = BehaviorState::Deciding { since: Tick(4), trigger: DecisionTrigger::ScheduleBoundary };
        let Step::Settled(r) = engine().evaluate(at(&c, &state, 5)) else {
            panic!("expected settled");
        };
        assert_eq!(r.state, BehaviorState::Idle { since: Tick(5), reason: IdleReason::Cancelled });
        assert_eq!(r.error, Some(OracleError::Cancelled));
    }
}

// ── Validation and resolution ─────────────────────────────────────────────────

#[cfg(test)]
mod resolution {
    use city_core::OracleConfig;
    use city_memory::{EntityRef, MemoryKind};

    use super::*;
    use crate::{Action, BehaviorEngine, Effect, IdleReason, Movement, OracleError, OracleReply};

    fn engine() -> BehaviorEngine {
        BehaviorEngine::new(OracleConfig { max_action_ticks: 10, ..OracleConfig::default() })
    }

    fn assert_malformed(reply: OracleReply, ctx: &DecisionContext) {
        let r = engine().resolve(ctx, Ok(reply.clone()));
        assert!(
            matches!(r.error, Some(OracleError::Malformed(_))),
            "{reply:?} should be malformed, got {:?}",
            r.error
        );
        assert_eq!(r.state, BehaviorState::Idle { since: ctx.tick, reason: IdleReason::MalformedReply });
        assert!(r.effects.is_empty());
    }

    #[test]
    fn unrecognized_reply_degrades_to_idle() {
        assert_malformed(OracleReply::Unrecognized { raw: "juggle".into() }, &context(vec![]));
    }

    #[test]
    fn duration_must_be_in_bounds() {
        let ctx = context(vec![]);
        assert_malformed(OracleReply::Rest { duration: 0 }, &ctx);
        assert_malformed(OracleReply::Work { duration: 11 }, &ctx);
        assert!(engine().validate_reply(&ctx, OracleReply::Work { duration: 10 }).is_ok());
    }

    #[test]
    fn converse_partner_must_be_in_snapshot() {
        let ctx = context(vec![neighbor(1, true)]);
        let converse = |with: u32| OracleReply::Converse {
            with: CitizenId(with),
            sentiment: 0.5,
            duration: 1,
            topic: None,
        };
        assert_malformed(converse(7), &ctx);
        assert_malformed(converse(0), &ctx);
        assert!(engine().validate_reply(&ctx, converse(1)).is_ok());
    }

    #[test]
    fn non_finite_sentiment_is_malformed() {
        let ctx = context(vec![neighbor(1, true)]);
        assert_malformed(
            OracleReply::Converse { with: CitizenId(1), sentiment: f32::NAN, duration: 1, topic: None },
            &ctx,
        );
        assert_malformed(OracleReply::Socialize { sentiment: f32::INFINITY, duration: 1 }, &ctx);
    }

    #[test]
    fn converse_plans_interaction_and_two_memories() {
        let ctx = context(vec![neighbor(1, true)]);
        let r = engine().resolve(
            &ctx,
            Ok(OracleReply::Converse { with: CitizenId(1), sentiment: 2.0, duration: 3, topic: Some("Market".into()) }),
        );
        assert_eq!(
            r.state,
            BehaviorState::Acting {
                action:  Action::Converse { with: CitizenId(1), sentiment: 1.0, topic: Some("Market".into()) },
                started: Tick(20),
                until:   Tick(23),
            }
        );
        assert_eq!(r.error, None);

        let Effect::Interact { with, outcome } = &r.effects[0] else {
            panic!("first effect should be the interaction");
        };
        assert_eq!(*with, CitizenId(1));
        assert_eq!(outcome.sentiment, 1.0);

        let memories: Vec<_> = r
            .effects
            .iter()
            .filter_map(|e| match e {
                Effect::Remember { owner, draft } => Some((*owner, draft)),
                _ => None,
            })
            .collect();
        assert_eq!(memories.len(), 2);
        assert_eq!(memories[0].0, CitizenId(0));
        assert_eq!(memories[1].0, CitizenId(1));
        for (_, draft) in &memories {
            assert_eq!(draft.kind, MemoryKind::Conversation);
            assert_eq!(draft.tick, Tick(20));
            assert!(draft.payload.keywords.contains(&"market".to_string()));
        }
        assert!(memories[0].1.entities.contains(&EntityRef::Citizen(CitizenId(1))));
        assert!(memories[1].1.entities.contains(&EntityRef::Citizen(CitizenId(0))));
    }

    #[test]
    fn socialize_needs_company() {
        assert_malformed(
            OracleReply::Socialize { sentiment: 0.3, duration: 2 },
            &context(vec![neighbor(4, false)]),
        );

        let ctx = context(vec![neighbor(1, true), neighbor(2, true), neighbor(4, false)]);
        let r = engine().resolve(&ctx, Ok(OracleReply::Socialize { sentiment: 0.3, duration: 2 }));
        assert_eq!(
            r.state.action_kind(),
            Some(crate::ActionKind::Socialize)
        );
        let interacts = r.effects.iter().filter(|e| matches!(e, Effect::Interact { .. })).count();
        let remembers = r.effects.iter().filter(|e| matches!(e, Effect::Remember { .. })).count();
        assert_eq!(interacts, 2);
        assert_eq!(remembers, 3);
    }

    #[test]
    fn move_walks_to_target() {
        let target = Position::new(3, -2);
        let r = engine().resolve(&context(vec![]), Ok(OracleReply::Move { target, duration: 2 }));
        assert_eq!(r.effects[0], Effect::MoveTo { target, movement: Movement::Walk });
        assert_eq!(r.state.action_kind(), Some(crate::ActionKind::Move));
    }

    #[test]
    fn rest_and_idle_have_no_effects() {
        let ctx = context(vec![]);
        for reply in [OracleReply::Rest { duration: 2 }, OracleReply::Idle { duration: 1 }] {
            let r = engine().resolve(&ctx, Ok(reply));
            assert!(matches!(r.state, BehaviorState::Acting { .. }));
            assert!(r.effects.is_empty());
        }
    }

    #[test]
    fn oracle_errors_map_to_idle_reasons() {
        let ctx = context(vec![]);
        let cases = [
            (OracleError::Timeout(50), IdleReason::OracleTimeout),
            (OracleError::Failure("down".into()), IdleReason::OracleFailure),
            (OracleError::Cancelled, IdleReason::Cancelled),
        ];
        for (err, reason) in cases {
            let r = engine().resolve(&ctx, Err(err.clone()));
            assert_eq!(r.state, BehaviorState::Idle { since: ctx.tick, reason });
            assert_eq!(r.error, Some(err));
            assert!(r.effects.is_empty());
        }
    }
}

// ── Context assembly ──────────────────────────────────────────────────────────

#[cfg(test)]
mod assembly {
    use city_citizen::CitizenRegistry;
    use city_core::{Clock, MemoryConfig, SocialConfig};
    use city_memory::{MemoryDraft, MemoryError, MemoryKind, MemoryStore};
    use city_social::{InteractionOutcome, SocialGraph};

    use super::*;
    use crate::{BehaviorError, ContextSources};

    struct World {
        clock:    Clock,
        registry: CitizenRegistry,
        memory:   MemoryStore,
        graph:    SocialGraph,
    }

    impl World {
        fn new(n: u32) -> Self {
            let mut registry = CitizenRegistry::new();
            let memory = MemoryStore::new(MemoryConfig { retrieval_limit: 3, ..MemoryConfig::default() });
            let graph = SocialGraph::new(SocialConfig { neighbor_limit: 3, ..SocialConfig::default() });
            for i in 0..n {
                let id = registry.insert(worker(i));
                memory.register_owner(id);
                graph.register(id);
            }
            Self { clock: Clock::new(24, 6, 20).at(Tick(12)), registry, memory, graph }
        }

        fn sources(&self) -> ContextSources<'_> {
            ContextSources {
                clock:    &self.clock,
                registry: &self.registry,
                memory:   &self.memory,
                graph:    &self.graph,
            }
        }

        fn assemble(&self, id: u32, co_located: &[CitizenId]) -> Result<DecisionContext, BehaviorError> {
            let citizen = worker(id);
            DecisionContext::assemble(
                self.sources(),
                &citizen,
                HOME,
                &BehaviorState::default(),
                DecisionTrigger::ScheduleBoundary,
                co_located,
            )
        }
    }

    #[test]
    fn co_located_first_then_strongest_ties() {
        let w = World::new(6);
        let me = CitizenId(0);
        w.graph.record_interaction(me, CitizenId(4), InteractionOutcome::positive(), Tick(1)).unwrap();
        w.graph.record_interaction(me, CitizenId(5), InteractionOutcome::new(0.1), Tick(1)).unwrap();
        w.graph.record_interaction(me, CitizenId(1), InteractionOutcome::positive(), Tick(1)).unwrap();

        let ctx = w.assemble(0, &[CitizenId(0), CitizenId(1)]).unwrap();
        let ids: Vec<_> = ctx.neighbors.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![CitizenId(1), CitizenId(4), CitizenId(5)]);
        assert!(ctx.neighbors[0].co_located);
        assert!(ctx.neighbors[0].affinity.is_some());
        assert!(!ctx.neighbors[1].co_located);
        assert_eq!(ctx.neighbors[0].name, "citizen-1");
    }

    #[test]
    fn snapshot_is_bounded() {
        let w = World::new(6);
        let everyone: Vec<_> = (0..6).map(CitizenId).collect();
        let ctx = w.assemble(2, &everyone).unwrap();
        assert_eq!(ctx.neighbors.len(), 3);
        assert!(ctx.neighbors.iter().all(|n| n.id != CitizenId(2)));
    }

    #[test]
    fn memory_window_is_bounded_and_clock_derived() {
        let w = World::new(1);
        for t in 0..6 {
            w.memory
                .record(CitizenId(0), MemoryDraft::new(MemoryKind::Observation, Tick(t), "saw the square"))
                .unwrap();
        }
        let ctx = w.assemble(0, &[]).unwrap();
        assert_eq!(ctx.memories.len(), 3);
        assert_eq!(ctx.tick, Tick(12));
        assert_eq!(ctx.day, 0);
        assert_eq!(ctx.phase, Phase::Day);
        assert_eq!(ctx.scheduled, Some(Activity::Work));
    }

    #[test]
    fn unknown_owner_is_an_error() {
        let w = World::new(1);
        assert_eq!(
            w.assemble(9, &[]),
            Err(BehaviorError::Memory(MemoryError::InvalidOwner(CitizenId(9))))
        );
    }
}

// ── Stub oracles ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod stubs {
    use std::time::Duration;

    use super::*;
    use crate::{DecisionOracle, FixedOracle, OracleError, OracleReply, ScheduleFollowingOracle, ScriptedOracle};

    #[tokio::test]
    async fn fixed_oracle_repeats() {
        let oracle = FixedOracle::rest();
        for _ in 0..3 {
            assert_eq!(oracle.decide(context(vec![])).await, Ok(OracleReply::Rest { duration: 1 }));
        }
    }

    #[tokio::test]
    async fn scripted_queue_then_fallback() {
        let oracle = ScriptedOracle::new(OracleReply::Idle { duration: 1 })
            .reply(CitizenId(0), OracleReply::Work { duration: 2 })
            .fail(CitizenId(0), OracleError::Failure("down".into()));

        assert_eq!(oracle.decide(context(vec![])).await, Ok(OracleReply::Work { duration: 2 }));
        assert_eq!(oracle.decide(context(vec![])).await, Err(OracleError::Failure("down".into())));
        assert_eq!(oracle.decide(context(vec![])).await, Ok(OracleReply::Idle { duration: 1 }));
        assert_eq!(oracle.calls(), 3);
    }

    #[tokio::test]
    async fn scripted_delay_is_observable() {
        let oracle = ScriptedOracle::new(OracleReply::Idle { duration: 1 })
            .delay(CitizenId(0), Duration::from_secs(30));
        let res = tokio::time::timeout(Duration::from_millis(20), oracle.decide(context(vec![]))).await;
        assert!(res.is_err());
        assert_eq!(oracle.calls(), 1);
    }

    #[tokio::test]
    async fn schedule_following_choices() {
        let oracle = ScheduleFollowingOracle::default();

        let mut ctx = context(vec![]);
        ctx.scheduled = Some(Activity::Work);
        assert_eq!(oracle.decide(ctx.clone()).await, Ok(OracleReply::Work { duration: 4 }));

        ctx.scheduled = Some(Activity::Commute);
        assert_eq!(oracle.decide(ctx.clone()).await, Ok(OracleReply::Move { target: WORK, duration: 1 }));

        ctx.citizen.position = WORK;
        assert_eq!(oracle.decide(ctx.clone()).await, Ok(OracleReply::Move { target: HOME, duration: 1 }));

        ctx.scheduled = Some(Activity::Leisure);
        assert_eq!(oracle.decide(ctx.clone()).await, Ok(OracleReply::Rest { duration: 4 }));

        ctx.neighbors = vec![neighbor(1, true)];
        assert!(matches!(oracle.decide(ctx.clone()).await, Ok(OracleReply::Socialize { .. })));

        ctx.trigger = DecisionTrigger::Proximity(CitizenId(1));
        assert!(matches!(
            oracle.decide(ctx).await,
            Ok(OracleReply::Converse { with: CitizenId(1), .. })
        ));
    }
}

// ── Wire form ─────────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "serde"))]
mod raw_decision {
    use super::*;
    use crate::{OracleReply, RawDecision};

    #[test]
    fn converse_from_json() {
        let reply = RawDecision::parse_reply(r#"{"kind":"Converse","with":4,"sentiment":0.6,"duration":2}"#);
        assert_eq!(
            reply,
            OracleReply::Converse { with: CitizenId(4), sentiment: 0.6, duration: 2, topic: None }
        );
    }

    #[test]
    fn missing_duration_defaults() {
        assert_eq!(
            RawDecision::parse_reply(r#"{"kind":"rest"}"#),
            OracleReply::Rest { duration: RawDecision::DEFAULT_DURATION }
        );
    }

    #[test]
    fn unknown_kind_is_unrecognized() {
        assert!(matches!(
            RawDecision::parse_reply(r#"{"kind":"teleport"}"#),
            OracleReply::Unrecognized { .. }
        ));
    }

    #[test]
    fn move_without_target_is_unrecognized() {
        assert!(matches!(
            RawDecision::parse_reply(r#"{"kind":"move","duration":3}"#),
            OracleReply::Unrecognized { .. }
        ));
    }

    #[test]
    fn non_json_keeps_raw_text() {
        assert_eq!(
            RawDecision::parse_reply("I think I'll go fishing"),
            OracleReply::Unrecognized { raw: "I think I'll go fishing".into() }
        );
    }
}
