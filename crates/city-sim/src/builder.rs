//! Fluent builder for constructing a [`Sim`].

use std::sync::Arc;

use city_behavior::{BehaviorEngine, DecisionOracle};
use city_citizen::{Citizen, CitizenRegistry, Population};
use city_core::{Clock, KernelConfig};
use city_memory::MemoryStore;
use city_nav::{Navigator, OpenNavigator};
use city_social::SocialGraph;
use tracing::info;

use crate::cancel::CancelHandle;
use crate::snapshot::KernelSnapshot;
use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim<O, N>`].
///
/// # Required inputs
///
/// - [`KernelConfig`]: validated by `build`.
/// - `O: DecisionOracle`: the decision provider.
///
/// # Optional inputs
///
/// | Method             | Default                         |
/// |--------------------|---------------------------------|
/// | `.navigator(n)`    | `OpenNavigator`                 |
/// | `.citizen(c)`      | no citizens                     |
/// | `.citizens(iter)`  | no citizens                     |
/// | `.population(p)`   | no citizens                     |
///
/// # Example
///
/// ```rust,ignore
/// let population = PopulationBuilder::new(plan).seed(config.seed).build();
/// let mut sim = SimBuilder::new(config, ScheduleFollowingOracle::default())
///     .navigator(GridNavigator::new(64, 64))
///     .population(population)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<O: DecisionOracle, N: Navigator = OpenNavigator> {
    config:    KernelConfig,
    oracle:    Arc<O>,
    navigator: N,
    citizens:  Vec<Citizen>,
    resume:    Option<KernelSnapshot>,
}

impl<O: DecisionOracle> SimBuilder<O, OpenNavigator> {
    pub fn new(config: KernelConfig, oracle: O) -> Self {
        Self {
            config,
            oracle:    Arc::new(oracle),
            navigator: OpenNavigator,
            citizens:  Vec::new(),
            resume:    None,
        }
    }

    /// Resume from `snapshot`: same config, tick, citizens, arenas,
    /// memories, and edges.
    pub fn from_snapshot(snapshot: KernelSnapshot, oracle: O) -> Self {
        Self {
            config:    snapshot.config.clone(),
            oracle:    Arc::new(oracle),
            navigator: OpenNavigator,
            citizens:  Vec::new(),
            resume:    Some(snapshot),
        }
    }
}

impl<O: DecisionOracle, N: Navigator> SimBuilder<O, N> {
    pub fn navigator<M: Navigator>(self, navigator: M) -> SimBuilder<O, M> {
        SimBuilder {
            config:    self.config,
            oracle:    self.oracle,
            navigator,
            citizens:  self.citizens,
            resume:    self.resume,
        }
    }

    /// Add one citizen.  Without an explicit id it receives the next free one.
    pub fn citizen(mut self, citizen: Citizen) -> Self {
        self.citizens.push(citizen);
        self
    }

    pub fn citizens(mut self, citizens: impl IntoIterator<Item = Citizen>) -> Self {
        self.citizens.extend(citizens);
        self
    }

    /// Add a generated population.  Its ids are kept.
    pub fn population(self, population: Population) -> Self {
        self.citizens(population.citizens)
    }

    /// Validate the config, start the oracle runtime, restore the snapshot
    /// if any, then register the added citizens.
    pub fn build(self) -> SimResult<Sim<O, N>> {
        self.config.validate()?;

        let mut runtime = tokio::runtime::Builder::new_multi_thread();
        runtime.enable_time().thread_name("city-oracle");
        if let Some(n) = self.config.num_threads {
            runtime.worker_threads(n);
        }
        let runtime = runtime.build().map_err(|e| SimError::Runtime(e.to_string()))?;

        let mut sim = Sim {
            clock:          Clock::from_config(&self.config),
            registry:       CitizenRegistry::new(),
            memory:         MemoryStore::new(self.config.memory.clone()),
            graph:          SocialGraph::new(self.config.social.clone()),
            engine:         BehaviorEngine::new(self.config.oracle.clone()),
            navigator:      self.navigator,
            oracle:         self.oracle,
            runtime,
            cancel:         CancelHandle::new(),
            positions:      Vec::new(),
            states:         Vec::new(),
            last_decision:  Vec::new(),
            last_interrupt: Vec::new(),
            config:         self.config,
        };

        if let Some(snapshot) = self.resume {
            restore(&mut sim, snapshot)?;
        }
        for citizen in self.citizens {
            sim.spawn_citizen(citizen)?;
        }

        info!(
            tick = sim.clock.current_tick().0,
            citizens = sim.registry.len(),
            active = sim.registry.active_count(),
            households = sim.registry.household_count(),
            "simulation built"
        );
        Ok(sim)
    }
}

fn restore<O: DecisionOracle, N: Navigator>(sim: &mut Sim<O, N>, snapshot: KernelSnapshot) -> SimResult<()> {
    sim.clock = Clock::from_config(&sim.config).at(snapshot.tick);

    let mut slots = Vec::with_capacity(snapshot.citizens.len());
    for entry in snapshot.citizens {
        let id = sim.registry.insert_with_id(entry.citizen, entry.status)?;
        sim.memory.register_owner(id);
        sim.graph.register(id);
        slots.push((id, entry.position, entry.state, entry.last_decision, entry.last_interrupt));
    }
    sim.grow_arenas();
    for (id, position, state, last_decision, last_interrupt) in slots {
        let idx = id.index();
        sim.positions[idx] = position;
        sim.states[idx] = state;
        sim.last_decision[idx] = last_decision;
        sim.last_interrupt[idx] = last_interrupt;
    }

    sim.memory.restore(snapshot.memories, snapshot.next_memory_id)?;
    sim.graph.restore(snapshot.edges)?;
    Ok(())
}
