//! `BehaviorEngine`: transition rules, reply validation, and effect planning.
//!
//! The engine is a pure function of its inputs.  It never touches the memory
//! store, the social graph, or positions; it describes what should happen as
//! a [`Resolution`] and the population manager commits it during
//! reconciliation.
//!
//! # Per-tick flow for one citizen
//!
//! 1. [`BehaviorEngine::evaluate`] applies the transitions that need no
//!    oracle (`Acting → Scheduled`, `Idle → Scheduled`, schedule following)
//!    and either settles the tick or asks for a decision.
//! 2. When a decision is needed the caller assembles a `DecisionContext`,
//!    calls the oracle, and passes the outcome to [`BehaviorEngine::resolve`].

use city_citizen::Citizen;
use city_core::{CitizenId, OracleConfig, Position, Tick};
use city_memory::{EntityRef, MemoryDraft, MemoryKind};
use city_schedule::Activity;
use city_social::InteractionOutcome;
use tracing::{debug, warn};

use crate::action::{Action, OracleReply};
use crate::context::DecisionContext;
use crate::state::{BehaviorState, DecisionTrigger, IdleReason};
use crate::{OracleError, OracleResult};

// ── Outputs ───────────────────────────────────────────────────────────────────

/// How a `MoveTo` effect reaches its target.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Movement {
    /// Place the citizen on the resolved tile directly (schedule following).
    Teleport,
    /// The destination must be routable from the current tile.
    Walk,
}

/// One world mutation requested for a citizen.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    MoveTo { target: Position, movement: Movement },
    Remember { owner: CitizenId, draft: MemoryDraft },
    Interact { with: CitizenId, outcome: InteractionOutcome },
}

/// The engine's verdict for one citizen and tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub state:   BehaviorState,
    pub effects: Vec<Effect>,
    /// Set when the citizen fell back to `Idle` because of the oracle.
    pub error:   Option<OracleError>,
}

impl Resolution {
    pub fn settled(state: BehaviorState) -> Self {
        Self { state, effects: Vec::new(), error: None }
    }

    /// `Idle` at `tick` with no effects.
    pub fn idle(tick: Tick, error: OracleError) -> Self {
        Self {
            state:   BehaviorState::Idle { since: tick, reason: IdleReason::from(&error) },
            effects: Vec::new(),
            error:   Some(error),
        }
    }
}

/// Result of the pre-decision pass.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// Nothing to ask the oracle; commit this.
    Settled(Resolution),
    /// Enter `Deciding` for this reason.
    Decide(DecisionTrigger),
}

/// A reply that passed validation.
#[derive(Clone, Debug, PartialEq)]
pub struct Decision {
    pub action:   Action,
    pub duration: u32,
}

// ── Inputs ────────────────────────────────────────────────────────────────────

/// Everything `evaluate` looks at for one citizen.
#[derive(Copy, Clone, Debug)]
pub struct Situation<'a> {
    pub citizen:        &'a Citizen,
    pub state:          &'a BehaviorState,
    pub position:       Position,
    pub tick:           Tick,
    /// Lowest-id other active citizen on the same tile, if any.
    pub nearby:         Option<CitizenId>,
    /// Tick of this citizen's last proximity interrupt.
    pub last_interrupt: Option<Tick>,
}

// ── Engine ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct BehaviorEngine {
    config: OracleConfig,
}

impl BehaviorEngine {
    pub fn new(config: OracleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// `Deciding` state entered at `tick`.
    pub fn begin(tick: Tick, trigger: DecisionTrigger) -> BehaviorState {
        BehaviorState::Deciding { since: tick, trigger }
    }

    // ── Pre-decision transitions ──────────────────────────────────────────

    pub fn evaluate(&self, s: Situation<'_>) -> Step {
        match s.state {
            BehaviorState::Acting { until, .. } if s.tick >= *until => self.scheduled(s),
            BehaviorState::Acting { .. } => Step::Settled(Resolution::settled(s.state.clone())),
            BehaviorState::Scheduled { .. } => self.scheduled(s),
            BehaviorState::Idle { .. } if s.citizen.schedule.is_boundary(s.tick) => {
                Step::Settled(self.follow_schedule(s))
            }
            BehaviorState::Idle { .. } => Step::Settled(Resolution::settled(s.state.clone())),
            BehaviorState::Deciding { .. } => {
                debug!(citizen = s.citizen.id.0, tick = s.tick.0, "stale decision abandoned");
                Step::Settled(Resolution::idle(s.tick, OracleError::Cancelled))
            }
        }
    }

    fn scheduled(&self, s: Situation<'_>) -> Step {
        if s.citizen.schedule.is_boundary(s.tick) {
            return Step::Decide(DecisionTrigger::ScheduleBoundary);
        }
        if let Some(other) = s.nearby.filter(|_| self.may_interrupt(s)) {
            return Step::Decide(DecisionTrigger::Proximity(other));
        }
        Step::Settled(self.follow_schedule(s))
    }

    fn may_interrupt(&self, s: Situation<'_>) -> bool {
        let asleep = s.citizen.schedule.activity_at(s.tick) == Some(Activity::Sleep);
        let cooled = s
            .last_interrupt
            .is_none_or(|t| s.tick.since(t) >= self.config.interrupt_cooldown_ticks);
        !asleep && cooled
    }

    /// `Scheduled` with a teleport to the current window's destination.
    fn follow_schedule(&self, s: Situation<'_>) -> Resolution {
        let window = s.citizen.schedule.window_at(s.tick);
        let effects = window
            .and_then(|w| w.destination.resolve(s.citizen.home, s.citizen.work))
            .filter(|&target| target != s.position)
            .map(|target| Effect::MoveTo { target, movement: Movement::Teleport })
            .into_iter()
            .collect();
        Resolution {
            state: BehaviorState::Scheduled { activity: window.map(|w| w.activity) },
            effects,
            error: None,
        }
    }

    // ── Decisions ─────────────────────────────────────────────────────────

    /// Check a reply against the closed action set, the neighbor snapshot,
    /// and the duration bounds.
    pub fn validate_reply(&self, ctx: &DecisionContext, reply: OracleReply) -> OracleResult<Decision> {
        let (action, duration) = match reply {
            OracleReply::Move { target, duration } => (Action::Move { target }, duration),
            OracleReply::Converse { with, sentiment, duration, topic } => {
                if with == ctx.citizen.id {
                    return Err(OracleError::Malformed("cannot converse with oneself".into()));
                }
                if ctx.neighbor(with).is_none() {
                    return Err(OracleError::Malformed(format!("citizen {with} is not in the neighbor snapshot")));
                }
                (Action::Converse { with, sentiment: finite(sentiment)?, topic }, duration)
            }
            OracleReply::Work { duration } => (Action::Work, duration),
            OracleReply::Rest { duration } => (Action::Rest, duration),
            OracleReply::Socialize { sentiment, duration } => {
                let with: Vec<CitizenId> = ctx.co_located().map(|n| n.id).collect();
                if with.is_empty() {
                    return Err(OracleError::Malformed("nobody nearby to socialize with".into()));
                }
                (Action::Socialize { with, sentiment: finite(sentiment)? }, duration)
            }
            OracleReply::Idle { duration } => (Action::Idle, duration),
            OracleReply::Unrecognized { raw } => {
                return Err(OracleError::Malformed(format!("unrecognized action {raw:?}")));
            }
        };

        let max = self.config.max_action_ticks;
        if duration == 0 || duration > max {
            return Err(OracleError::Malformed(format!("duration {duration} outside 1..={max}")));
        }
        Ok(Decision { action, duration })
    }

    /// Turn the oracle outcome into the citizen's next state and effects.
    ///
    /// Any error, including one raised by validation, yields `Idle` with no
    /// effects.
    pub fn resolve(&self, ctx: &DecisionContext, outcome: OracleResult<OracleReply>) -> Resolution {
        let id = ctx.citizen.id.0;
        match outcome.and_then(|reply| self.validate_reply(ctx, reply)) {
            Ok(Decision { action, duration }) => {
                debug!(citizen = id, tick = ctx.tick.0, kind = action.kind().as_str(), duration, "decided");
                let effects = plan_effects(ctx, &action);
                Resolution {
                    state: BehaviorState::Acting {
                        action,
                        started: ctx.tick,
                        until:   ctx.tick + u64::from(duration),
                    },
                    effects,
                    error: None,
                }
            }
            Err(err) => {
                match &err {
                    OracleError::Malformed(_) | OracleError::Cancelled => {
                        debug!(citizen = id, tick = ctx.tick.0, error = %err, "decision dropped")
                    }
                    OracleError::Timeout(_) | OracleError::Failure(_) => {
                        warn!(citizen = id, tick = ctx.tick.0, error = %err, "oracle call failed")
                    }
                }
                Resolution::idle(ctx.tick, err)
            }
        }
    }
}

fn finite(sentiment: f32) -> OracleResult<f32> {
    if sentiment.is_finite() {
        Ok(sentiment.clamp(-1.0, 1.0))
    } else {
        Err(OracleError::Malformed(format!("sentiment {sentiment} is not a number")))
    }
}

// ── Effect planning ───────────────────────────────────────────────────────────

const MOVE_IMPORTANCE: f32 = 0.2;
const WORK_IMPORTANCE: f32 = 0.1;

/// Conversations that went strongly either way are remembered better.
fn conversation_importance(sentiment: f32) -> f32 {
    0.4 + 0.4 * sentiment.abs()
}

fn plan_effects(ctx: &DecisionContext, action: &Action) -> Vec<Effect> {
    let me = ctx.citizen.id;
    let here = EntityRef::Location(ctx.citizen.position);
    let name_of = |id: CitizenId| ctx.neighbor(id).map_or_else(|| id.to_string(), |n| n.name.clone());

    match action {
        Action::Move { target } => vec![
            Effect::MoveTo { target: *target, movement: Movement::Walk },
            remember(
                me,
                MemoryDraft::new(MemoryKind::Observation, ctx.tick, format!("Walked to {target}"))
                    .importance(MOVE_IMPORTANCE)
                    .keyword("move")
                    .entity(EntityRef::Location(*target)),
            ),
        ],
        Action::Converse { with, sentiment, topic } => {
            let mut mine = MemoryDraft::new(MemoryKind::Conversation, ctx.tick, format!("Talked with {}", name_of(*with)))
                .importance(conversation_importance(*sentiment))
                .keyword("conversation")
                .entity(EntityRef::Citizen(*with))
                .entity(here);
            let mut theirs = MemoryDraft::new(MemoryKind::Conversation, ctx.tick, format!("Talked with {}", ctx.citizen.name))
                .importance(conversation_importance(*sentiment))
                .keyword("conversation")
                .entity(EntityRef::Citizen(me))
                .entity(here);
            if let Some(topic) = topic {
                mine = mine.keyword(topic);
                theirs = theirs.keyword(topic);
            }
            vec![
                Effect::Interact { with: *with, outcome: InteractionOutcome::new(*sentiment) },
                remember(me, mine),
                remember(*with, theirs),
            ]
        }
        Action::Socialize { with, sentiment } => {
            let importance = conversation_importance(*sentiment);
            let mut effects = Vec::with_capacity(with.len() * 2 + 1);
            let mut mine = MemoryDraft::new(
                MemoryKind::Conversation,
                ctx.tick,
                format!("Spent time with {} people", with.len()),
            )
            .importance(importance)
            .keyword("socialize")
            .entity(here);
            for &other in with {
                mine = mine.entity(EntityRef::Citizen(other));
                effects.push(Effect::Interact { with: other, outcome: InteractionOutcome::new(*sentiment) });
                effects.push(remember(
                    other,
                    MemoryDraft::new(MemoryKind::Conversation, ctx.tick, format!("Spent time with {}", ctx.citizen.name))
                        .importance(importance)
                        .keyword("socialize")
                        .entity(EntityRef::Citizen(me))
                        .entity(here),
                ));
            }
            effects.push(remember(me, mine));
            effects
        }
        Action::Work => vec![remember(
            me,
            MemoryDraft::new(MemoryKind::Observation, ctx.tick, "Worked a shift")
                .importance(WORK_IMPORTANCE)
                .keyword("work")
                .entity(here),
        )],
        Action::Rest | Action::Idle => Vec::new(),
    }
}

#[inline]
fn remember(owner: CitizenId, draft: MemoryDraft) -> Effect {
    Effect::Remember { owner, draft }
}
