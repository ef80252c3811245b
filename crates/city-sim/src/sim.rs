//! The `Sim` struct and its tick loop.

use std::sync::Arc;
use std::time::Duration;

use city_behavior::{
    BehaviorEngine, BehaviorState, ContextSources, DecisionContext, DecisionOracle, DecisionTrigger,
    Effect, IdleReason, Movement, OracleError, OracleReply, OracleResult, Resolution, Situation, Step,
};
use city_citizen::{Citizen, CitizenRegistry, CitizenStatus};
use city_core::{CitizenId, Clock, KernelConfig, Position, Tick};
use city_memory::{MemoryDraft, MemoryKind, MemoryStore};
use city_nav::{NavResult, Navigator, OpenNavigator};
use city_social::SocialGraph;
use rustc_hash::FxHashMap;
use tokio::runtime::Runtime;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::cancel::{cancelled, CancelHandle};
use crate::snapshot::{CitizenSnapshot, KernelSnapshot};
use crate::summary::{CitizenRecord, TickSummary};
use crate::{SimError, SimObserver, SimResult};

/// Active citizens per tile, ascending id within each tile.
type ContactIndex = FxHashMap<Position, Vec<CitizenId>>;

const REFLECTION_IMPORTANCE: f32 = 0.3;

// ── Per-citizen plan produced by the evaluation phase ─────────────────────────

enum Plan {
    Settled(CitizenId, Resolution),
    Decide { id: CitizenId, trigger: DecisionTrigger, ctx: DecisionContext },
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The population manager.
///
/// Owns the clock, the citizen registry, the memory store, the social graph,
/// and the per-citizen arenas (position, behavior state, last decision and
/// last interrupt ticks), all indexed by `CitizenId`.  Each [`Sim::step`]
/// runs one tick:
///
/// 1. **Advance** the clock.
/// 2. **Snapshot** the active set, ascending id.
/// 3. **Evaluate** pre-decision transitions and assemble decision contexts
///    (parallel with the `parallel` feature; read-only).
/// 4. **Consult** the oracle for every deciding citizen on the owned Tokio
///    runtime: at most `oracle.max_in_flight` calls at once, each bounded by
///    `oracle.timeout_ms`, all abandoned on cancellation.
/// 5. **Reconcile** in ascending id: navigation is checked before anything
///    is written, and a failing effect leaves that citizen `Idle` with no
///    world mutation.
/// 6. **Decay** memories; on the first tick of a day every active citizen
///    writes a reflection.
///
/// `step` blocks on the owned runtime, so drive a `Sim` from a plain thread,
/// never from inside an async task.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<O: DecisionOracle, N: Navigator = OpenNavigator> {
    pub(crate) config:    KernelConfig,
    pub(crate) clock:     Clock,
    pub(crate) registry:  CitizenRegistry,
    pub(crate) memory:    MemoryStore,
    pub(crate) graph:     SocialGraph,
    pub(crate) engine:    BehaviorEngine,
    pub(crate) navigator: N,
    pub(crate) oracle:    Arc<O>,
    pub(crate) runtime:   Runtime,
    pub(crate) cancel:    CancelHandle,

    // Arenas, all of length `registry.capacity()`.
    pub(crate) positions:      Vec<Position>,
    pub(crate) states:         Vec<BehaviorState>,
    pub(crate) last_decision:  Vec<Option<Tick>>,
    pub(crate) last_interrupt: Vec<Option<Tick>>,
}

impl<O: DecisionOracle, N: Navigator> Sim<O, N> {
    // ── Running ───────────────────────────────────────────────────────────

    /// Step until `config.end_tick()` or until cancelled.
    pub fn run<S: SimObserver>(&mut self, observer: &mut S) -> SimResult<()> {
        let end = self.config.end_tick();
        info!(
            from = self.clock.current_tick().0,
            to = end.0,
            citizens = self.registry.active_count(),
            "simulation started"
        );
        while self.clock.current_tick() < end {
            if self.cancel.is_cancelled() {
                info!(tick = self.clock.current_tick().0, "simulation cancelled");
                break;
            }
            self.observed_step(observer)?;
        }
        observer.on_sim_end(self.clock.current_tick());
        Ok(())
    }

    /// Run up to `n` ticks from the current position, ignoring `end_tick`.
    /// Stops early when cancelled.
    pub fn run_ticks<S: SimObserver>(&mut self, n: u64, observer: &mut S) -> SimResult<()> {
        for _ in 0..n {
            if self.cancel.is_cancelled() {
                break;
            }
            self.observed_step(observer)?;
        }
        Ok(())
    }

    fn observed_step<S: SimObserver>(&mut self, observer: &mut S) -> SimResult<TickSummary> {
        observer.on_tick_start(self.clock.current_tick() + 1);
        let summary = self.step()?;
        observer.on_tick_end(&summary);
        let interval = self.config.output_interval_ticks;
        if interval > 0 && summary.tick.0 % interval == 0 {
            observer.on_snapshot(summary.tick, &self.citizen_records());
        }
        Ok(summary)
    }

    // ── Core tick processing ──────────────────────────────────────────────

    /// Advance one tick and return what happened.
    pub fn step(&mut self) -> SimResult<TickSummary> {
        let now = self.clock.advance();
        let active = self.registry.active_ids();
        let mut summary = TickSummary::new(now, self.clock.day_index(), self.clock.phase(), active.len());
        let evicted_before = self.memory.evicted_total();

        let contacts = build_contact_index(&active, &self.positions);
        let plans = self.plan(now, &active, &contacts)?;

        for plan in &plans {
            if let Plan::Decide { id, trigger, .. } = plan {
                self.states[id.index()] = BehaviorEngine::begin(now, *trigger);
                summary.decisions += 1;
            }
        }
        let mut outcomes = self.consult(&plans).into_iter();

        for plan in plans {
            let (id, resolution) = match plan {
                Plan::Settled(id, resolution) => (id, resolution),
                Plan::Decide { id, trigger, ctx } => {
                    let outcome = outcomes
                        .next()
                        .unwrap_or_else(|| Err(OracleError::Failure("oracle task aborted".into())));
                    self.last_decision[id.index()] = Some(now);
                    if matches!(trigger, DecisionTrigger::Proximity(_)) {
                        self.last_interrupt[id.index()] = Some(now);
                    }
                    (id, self.engine.resolve(&ctx, outcome))
                }
            };
            self.reconcile(id, resolution, now, &mut summary)?;
            summary.processed += 1;
        }

        self.memory.decay(now);
        if now > Tick::ZERO && self.clock.is_day_start() {
            summary.memories_written += self.reflect(now, &active)?;
            info!(day = summary.day, active = summary.active, "day started");
        }

        summary.idle = active
            .iter()
            .filter(|id| self.states[id.index()].is_idle())
            .count() as u32;
        summary.memories_evicted = (self.memory.evicted_total() - evicted_before) as u32;
        debug!(
            tick = now.0,
            active = summary.active,
            decisions = summary.decisions,
            oracle_errors = summary.oracle_errors(),
            idle = summary.idle,
            "tick complete"
        );
        Ok(summary)
    }

    /// Evaluate every active citizen and assemble contexts for those that
    /// must decide.  Read-only; runs on Rayon with the `parallel` feature.
    fn plan(&self, now: Tick, active: &[CitizenId], contacts: &ContactIndex) -> SimResult<Vec<Plan>> {
        // Explicit field borrows so the closure only captures `Sync` state.
        let registry       = &self.registry;
        let engine         = &self.engine;
        let positions      = self.positions.as_slice();
        let states         = self.states.as_slice();
        let last_interrupt = self.last_interrupt.as_slice();
        let src = ContextSources {
            clock:    &self.clock,
            registry: &self.registry,
            memory:   &self.memory,
            graph:    &self.graph,
        };

        let plan_one = |&id: &CitizenId| -> SimResult<Plan> {
            let idx = id.index();
            let citizen = registry.get(id).ok_or(SimError::CitizenNotFound(id))?;
            let position = positions[idx];
            let state = &states[idx];
            let here = contacts.get(&position).map_or(&[][..], Vec::as_slice);
            let situation = Situation {
                citizen,
                state,
                position,
                tick: now,
                nearby: here.iter().copied().find(|&other| other != id),
                last_interrupt: last_interrupt[idx],
            };
            match engine.evaluate(situation) {
                Step::Settled(resolution) => Ok(Plan::Settled(id, resolution)),
                Step::Decide(trigger) => {
                    let ctx = DecisionContext::assemble(src, citizen, position, state, trigger, here)?;
                    Ok(Plan::Decide { id, trigger, ctx })
                }
            }
        };

        #[cfg(not(feature = "parallel"))]
        {
            active.iter().map(plan_one).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            active.par_iter().map(plan_one).collect()
        }
    }

    /// Ask the oracle about every `Decide` plan, in plan order.
    fn consult(&self, plans: &[Plan]) -> Vec<OracleResult<OracleReply>> {
        let requests: Vec<DecisionContext> = plans
            .iter()
            .filter_map(|plan| match plan {
                Plan::Decide { ctx, .. } => Some(ctx.clone()),
                Plan::Settled(..) => None,
            })
            .collect();
        if requests.is_empty() {
            return Vec::new();
        }

        let count      = requests.len();
        let oracle     = Arc::clone(&self.oracle);
        let permits    = Arc::new(Semaphore::new(self.config.oracle.max_in_flight));
        let timeout_ms = self.config.oracle.timeout_ms;
        let cancel     = self.cancel.subscribe();

        self.runtime.block_on(async move {
            let mut calls = JoinSet::new();
            for (slot, ctx) in requests.into_iter().enumerate() {
                calls.spawn(ask(
                    Arc::clone(&oracle),
                    ctx,
                    Arc::clone(&permits),
                    cancel.clone(),
                    timeout_ms,
                    slot,
                ));
            }

            let mut outcomes: Vec<OracleResult<OracleReply>> = (0..count)
                .map(|_| Err(OracleError::Failure("oracle task aborted".into())))
                .collect();
            while let Some(joined) = calls.join_next().await {
                match joined {
                    Ok((slot, outcome)) => outcomes[slot] = outcome,
                    Err(err) => warn!(error = %err, "oracle task did not complete"),
                }
            }
            outcomes
        })
    }

    /// Commit one citizen's resolution, or downgrade it to `Idle` when an
    /// effect cannot be applied.
    fn reconcile(
        &mut self,
        id:         CitizenId,
        resolution: Resolution,
        now:        Tick,
        summary:    &mut TickSummary,
    ) -> SimResult<()> {
        let idx = id.index();
        let Resolution { state, effects, error } = resolution;
        if let Some(err) = &error {
            summary.count_error(err);
        }

        let position = match self.check_effects(id, &effects) {
            Ok(position) => position,
            Err(reason) => {
                match reason {
                    IdleReason::Unreachable => summary.navigation_failures += 1,
                    _ => summary.effect_rejections += 1,
                }
                self.states[idx] = BehaviorState::Idle { since: now, reason };
                return Ok(());
            }
        };

        self.positions[idx] = position;
        for effect in effects {
            match effect {
                Effect::MoveTo { .. } => {}
                Effect::Remember { owner, draft } => {
                    self.memory.record(owner, draft)?;
                    summary.memories_written += 1;
                }
                Effect::Interact { with, outcome } => {
                    self.graph.record_interaction(id, with, outcome, now)?;
                    summary.interactions += 1;
                }
            }
        }
        if let BehaviorState::Acting { action, started, .. } = &state {
            if *started == now {
                summary.actions[action.kind().index()] += 1;
            }
        }
        self.states[idx] = state;
        Ok(())
    }

    /// The citizen's position after all moves, or why the effects cannot be
    /// applied.
    fn check_effects(&self, id: CitizenId, effects: &[Effect]) -> Result<Position, IdleReason> {
        let mut position = self.positions[id.index()];
        for effect in effects {
            match effect {
                Effect::MoveTo { target, movement } => {
                    position = self.navigate(id, position, *target, *movement).map_err(|err| {
                        debug!(citizen = id.0, error = %err, "move rejected");
                        IdleReason::Unreachable
                    })?;
                }
                Effect::Interact { with, .. } => {
                    if *with == id || !self.registry.is_active(*with) || !self.graph.is_registered(*with) {
                        debug!(citizen = id.0, with = with.0, "interaction rejected");
                        return Err(IdleReason::EffectRejected);
                    }
                }
                Effect::Remember { owner, .. } => {
                    if !self.memory.is_owner(*owner) {
                        debug!(citizen = id.0, owner = owner.0, "memory rejected");
                        return Err(IdleReason::EffectRejected);
                    }
                }
            }
        }
        Ok(position)
    }

    fn navigate(&self, id: CitizenId, from: Position, target: Position, movement: Movement) -> NavResult<Position> {
        let resolved = self.navigator.resolve_position(id, target)?;
        match movement {
            Movement::Teleport => Ok(resolved),
            Movement::Walk => Ok(self.navigator.route(from, resolved)?.destination().unwrap_or(from)),
        }
    }

    /// One reflection per active citizen about the day that just ended.
    fn reflect(&self, now: Tick, active: &[CitizenId]) -> SimResult<u32> {
        let yesterday = self.clock.day_index().saturating_sub(1);
        let mut written = 0;
        for &id in active {
            let recent: Vec<_> = self
                .memory
                .entries(id)?
                .into_iter()
                .filter(|e| e.kind != MemoryKind::Reflection && self.clock.day_of(e.tick) == yesterday)
                .collect();
            let highlight = recent.iter().max_by(|a, b| a.importance().total_cmp(&b.importance()));

            let mut draft = MemoryDraft::new(
                MemoryKind::Reflection,
                now,
                match highlight {
                    Some(m) => format!("Day {yesterday}: {} moments, most of all \"{}\"", recent.len(), m.payload.summary),
                    None => format!("Day {yesterday} passed quietly"),
                },
            )
            .importance(REFLECTION_IMPORTANCE)
            .keyword("reflection");
            if let Some(m) = highlight {
                for &entity in &m.entities {
                    draft = draft.entity(entity);
                }
            }
            self.memory.record(id, draft)?;
            written += 1;
        }
        Ok(written)
    }

    // ── Population ────────────────────────────────────────────────────────

    /// Register a citizen at its home tile.
    ///
    /// A citizen carrying a valid id keeps it; otherwise the next free id is
    /// allocated.  Edges to already registered household members are seeded
    /// at the current tick.
    pub fn spawn_citizen(&mut self, citizen: Citizen) -> SimResult<CitizenId> {
        let home = citizen.home;
        let household = citizen.household();
        let id = if citizen.id.is_valid() {
            self.registry.insert_with_id(citizen, CitizenStatus::Active)?
        } else {
            self.registry.insert(citizen)
        };
        self.memory.register_owner(id);
        self.graph.register(id);
        self.grow_arenas();
        self.positions[id.index()] = home;

        let now = self.clock.current_tick();
        for other in self.registry.household_members(household) {
            if other != id {
                self.graph.seed_household(id, other, now)?;
            }
        }
        Ok(id)
    }

    /// Mark a citizen inactive.  Its memories, edges, and arena slots are
    /// retained; it is no longer stepped.
    pub fn deactivate_citizen(&mut self, id: CitizenId) -> SimResult<()> {
        self.registry.deactivate(id)?;
        Ok(())
    }

    pub(crate) fn grow_arenas(&mut self) {
        let capacity = self.registry.capacity();
        self.positions.resize(capacity, Position::default());
        self.states.resize_with(capacity, BehaviorState::default);
        self.last_decision.resize(capacity, None);
        self.last_interrupt.resize(capacity, None);
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    #[inline]
    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick()
    }

    pub fn registry(&self) -> &CitizenRegistry {
        &self.registry
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn graph(&self) -> &SocialGraph {
        &self.graph
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn position(&self, id: CitizenId) -> Option<Position> {
        self.registry.contains(id).then(|| self.positions[id.index()])
    }

    pub fn state(&self, id: CitizenId) -> Option<&BehaviorState> {
        self.registry.contains(id).then(|| &self.states[id.index()])
    }

    /// Tick of the citizen's most recent oracle consultation.
    pub fn last_decision(&self, id: CitizenId) -> Option<Tick> {
        self.last_decision.get(id.index()).copied().flatten()
    }

    /// Handle for stopping `run` from another thread.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    // ── Snapshots ─────────────────────────────────────────────────────────

    /// Everything needed to resume at the current tick boundary.
    pub fn snapshot(&self) -> KernelSnapshot {
        let citizens = self
            .registry
            .iter()
            .map(|(citizen, status)| {
                let idx = citizen.id.index();
                CitizenSnapshot {
                    citizen:        citizen.clone(),
                    status,
                    position:       self.positions[idx],
                    state:          self.states[idx].clone(),
                    last_decision:  self.last_decision[idx],
                    last_interrupt: self.last_interrupt[idx],
                }
            })
            .collect();
        KernelSnapshot {
            config:         self.config.clone(),
            tick:           self.clock.current_tick(),
            citizens,
            memories:       self.memory.all_entries(),
            next_memory_id: self.memory.next_id(),
            edges:          self.graph.edges(),
        }
    }

    /// One row per registered citizen, ascending id.
    pub fn citizen_records(&self) -> Vec<CitizenRecord> {
        let tick = self.clock.current_tick();
        self.registry
            .iter()
            .map(|(citizen, status)| {
                let state = &self.states[citizen.id.index()];
                CitizenRecord {
                    tick,
                    id:         citizen.id,
                    name:       citizen.name.clone(),
                    status,
                    position:   self.positions[citizen.id.index()],
                    state:      state.label(),
                    action:     state.action_kind(),
                    activity:   citizen.schedule.activity_at(tick),
                    household:  citizen.household(),
                    profession: citizen.demographics.profession,
                }
            })
            .collect()
    }
}

// ── Oracle calls ──────────────────────────────────────────────────────────────

/// One bounded, cancellable oracle call.  The deadline starts once a permit
/// is held.
async fn ask<O: DecisionOracle>(
    oracle:     Arc<O>,
    ctx:        DecisionContext,
    permits:    Arc<Semaphore>,
    mut cancel: watch::Receiver<bool>,
    timeout_ms: u64,
    slot:       usize,
) -> (usize, OracleResult<OracleReply>) {
    let call = async {
        let Ok(_permit) = permits.acquire().await else {
            return Err(OracleError::Cancelled);
        };
        tokio::time::timeout(Duration::from_millis(timeout_ms), oracle.decide(ctx))
            .await
            .unwrap_or(Err(OracleError::Timeout(timeout_ms)))
    };
    let outcome = tokio::select! {
        biased;
        _ = cancelled(&mut cancel) => Err(OracleError::Cancelled),
        outcome = call => outcome,
    };
    (slot, outcome)
}

// ── Contact index ─────────────────────────────────────────────────────────────

/// Group active citizens by tile.  `active` is ascending, so every bucket is.
fn build_contact_index(active: &[CitizenId], positions: &[Position]) -> ContactIndex {
    let mut index = ContactIndex::default();
    for &id in active {
        index.entry(positions[id.index()]).or_default().push(id);
    }
    index
}
