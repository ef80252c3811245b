//! Deterministic oracles for tests and oracle-free runs.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use city_core::CitizenId;
use city_schedule::Activity;
use rustc_hash::FxHashMap;

use crate::action::OracleReply;
use crate::context::DecisionContext;
use crate::oracle::{DecisionOracle, OracleError, OracleResult};
use crate::state::DecisionTrigger;

// ── FixedOracle ───────────────────────────────────────────────────────────────

/// Answers every request with the same reply.
#[derive(Clone, Debug)]
pub struct FixedOracle {
    reply: OracleReply,
}

impl FixedOracle {
    pub fn new(reply: OracleReply) -> Self {
        Self { reply }
    }

    /// Rest for one tick, whatever the context.
    pub fn rest() -> Self {
        Self::new(OracleReply::Rest { duration: 1 })
    }
}

impl DecisionOracle for FixedOracle {
    async fn decide(&self, _ctx: DecisionContext) -> OracleResult<OracleReply> {
        Ok(self.reply.clone())
    }
}

// ── ScriptedOracle ────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
enum Scripted {
    Reply(OracleReply),
    Fail(OracleError),
}

/// Per-citizen queues of canned outcomes, with optional artificial latency.
///
/// Each call pops the next scripted outcome for the deciding citizen; once a
/// queue is empty the fallback reply is used.
///
/// ```rust,ignore
/// let oracle = ScriptedOracle::new(OracleReply::Rest { duration: 1 })
///     .reply(CitizenId(0), OracleReply::Unrecognized { raw: "dance".into() })
///     .fail(CitizenId(1), OracleError::Failure("backend down".into()))
///     .delay(CitizenId(2), Duration::from_secs(30));
/// ```
#[derive(Debug)]
pub struct ScriptedOracle {
    scripts:  Mutex<FxHashMap<CitizenId, VecDeque<Scripted>>>,
    delays:   FxHashMap<CitizenId, Duration>,
    fallback: OracleReply,
    calls:    AtomicUsize,
}

impl ScriptedOracle {
    pub fn new(fallback: OracleReply) -> Self {
        Self {
            scripts:  Mutex::new(FxHashMap::default()),
            delays:   FxHashMap::default(),
            fallback,
            calls:    AtomicUsize::new(0),
        }
    }

    /// Queue a reply for `citizen`'s next unscripted call.
    pub fn reply(self, citizen: CitizenId, reply: OracleReply) -> Self {
        self.push(citizen, Scripted::Reply(reply))
    }

    /// Queue a failure for `citizen`'s next unscripted call.
    pub fn fail(self, citizen: CitizenId, error: OracleError) -> Self {
        self.push(citizen, Scripted::Fail(error))
    }

    /// Sleep `latency` before answering any call for `citizen`.
    pub fn delay(mut self, citizen: CitizenId, latency: Duration) -> Self {
        self.delays.insert(citizen, latency);
        self
    }

    /// Calls received so far, including abandoned ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn push(self, citizen: CitizenId, item: Scripted) -> Self {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(citizen)
            .or_default()
            .push_back(item);
        self
    }
}

impl DecisionOracle for ScriptedOracle {
    async fn decide(&self, ctx: DecisionContext) -> OracleResult<OracleReply> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let id = ctx.citizen.id;
        let next = self
            .scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&id)
            .and_then(VecDeque::pop_front);

        if let Some(&latency) = self.delays.get(&id) {
            tokio::time::sleep(latency).await;
        }
        match next {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Fail(err))    => Err(err),
            None                         => Ok(self.fallback.clone()),
        }
    }
}

// ── ScheduleFollowingOracle ───────────────────────────────────────────────────

/// Picks the action the schedule suggests.
///
/// | Situation                          | Reply                               |
/// |------------------------------------|-------------------------------------|
/// | proximity interrupt                | `Converse` with the other citizen   |
/// | `Work` / `Study` window            | `Work`                              |
/// | `Commute` window                   | `Move` home ↔ work                  |
/// | `Leisure` with company on the tile | `Socialize`                         |
/// | anything else                      | `Rest`                              |
///
/// Conversation warmth follows the citizen's agreeableness.
#[derive(Clone, Debug)]
pub struct ScheduleFollowingOracle {
    /// Duration of work, rest, and socializing actions.
    pub duration: u32,
}

impl Default for ScheduleFollowingOracle {
    fn default() -> Self {
        Self { duration: 4 }
    }
}

impl ScheduleFollowingOracle {
    fn choose(&self, ctx: &DecisionContext) -> OracleReply {
        let duration = self.duration;
        let sentiment = ctx.citizen.personality.agreeableness - 0.25;

        if let DecisionTrigger::Proximity(other) = ctx.trigger {
            if ctx.neighbor(other).is_some() {
                return OracleReply::Converse { with: other, sentiment, duration: 1, topic: None };
            }
        }
        match ctx.scheduled {
            Some(Activity::Work | Activity::Study) => OracleReply::Work { duration },
            Some(Activity::Commute) => {
                let c = &ctx.citizen;
                let target = if c.position == c.home { c.work.unwrap_or(c.home) } else { c.home };
                OracleReply::Move { target, duration: 1 }
            }
            Some(Activity::Leisure) if ctx.co_located().next().is_some() => {
                OracleReply::Socialize { sentiment, duration }
            }
            _ => OracleReply::Rest { duration },
        }
    }
}

impl DecisionOracle for ScheduleFollowingOracle {
    async fn decide(&self, ctx: DecisionContext) -> OracleResult<OracleReply> {
        Ok(self.choose(&ctx))
    }
}
