//! Kernel configuration.
//!
//! Typically deserialized from a TOML/JSON file by the application (with the
//! `serde` feature) and handed to the simulation builder.  Every section has a
//! `Default`, and missing fields fall back to those defaults, so a config file
//! only needs to name what it changes.

use crate::time::MINUTES_PER_DAY;
use crate::{CoreError, CoreResult, Tick};

// ── KernelConfig ──────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KernelConfig {
    /// Ticks in one simulated day.  Must divide 1440.  Default: 96 (15 min/tick).
    pub ticks_per_day: u32,

    /// First hour (inclusive) of the `Day` phase.
    pub day_start_hour: u32,

    /// First hour (inclusive) of the `Night` phase.
    pub night_start_hour: u32,

    /// Total ticks `Sim::run` simulates before returning.
    pub total_ticks: u64,

    /// Master RNG seed for population generation.
    pub seed: u64,

    /// Worker thread count for the oracle runtime and Rayon.  `None` uses all
    /// logical cores.
    pub num_threads: Option<usize>,

    /// Emit a snapshot to observers every N ticks.  0 disables snapshots.
    pub output_interval_ticks: u64,

    pub memory: MemoryConfig,
    pub social: SocialConfig,
    pub oracle: OracleConfig,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            ticks_per_day:         96,
            day_start_hour:        6,
            night_start_hour:      20,
            total_ticks:           96 * 7,
            seed:                  1337,
            num_threads:           None,
            output_interval_ticks: 96,
            memory:                MemoryConfig::default(),
            social:                SocialConfig::default(),
            oracle:                OracleConfig::default(),
        }
    }
}

impl KernelConfig {
    /// The tick at which `Sim::run` stops (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Reject configurations the kernel cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.ticks_per_day == 0 || MINUTES_PER_DAY % self.ticks_per_day != 0 {
            return Err(CoreError::Config(format!(
                "ticks_per_day must be a non-zero divisor of {MINUTES_PER_DAY}, got {}",
                self.ticks_per_day
            )));
        }
        if self.day_start_hour >= self.night_start_hour || self.night_start_hour > 24 {
            return Err(CoreError::Config(format!(
                "day phase [{}, {}) is not a valid hour range",
                self.day_start_hour, self.night_start_hour
            )));
        }
        if self.num_threads == Some(0) {
            return Err(CoreError::Config("num_threads must be at least 1".into()));
        }
        self.memory.validate()?;
        self.social.validate()?;
        self.oracle.validate()
    }
}

// ── MemoryConfig ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MemoryConfig {
    /// Maximum entries retained per citizen.
    pub capacity: usize,

    /// Entries below this importance are eligible for eviction during decay.
    pub importance_floor: f32,

    /// Age in ticks after which a memory keeps half its initial importance.
    pub half_life_ticks: u64,

    /// Per-tick multiplicative recency weight used by retrieval, in (0, 1].
    pub recency_decay: f32,

    /// Memories pulled into each decision context.
    pub retrieval_limit: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity:         64,
            importance_floor: 0.05,
            half_life_ticks:  96 * 2,
            recency_decay:    0.995,
            retrieval_limit:  8,
        }
    }
}

impl MemoryConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.capacity == 0 {
            return Err(CoreError::Config("memory.capacity must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.importance_floor) {
            return Err(CoreError::Config("memory.importance_floor must be in [0, 1]".into()));
        }
        if self.half_life_ticks == 0 {
            return Err(CoreError::Config("memory.half_life_ticks must be at least 1".into()));
        }
        if !(self.recency_decay > 0.0 && self.recency_decay <= 1.0) {
            return Err(CoreError::Config("memory.recency_decay must be in (0, 1]".into()));
        }
        Ok(())
    }
}

// ── SocialConfig ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SocialConfig {
    /// Affinity of a freshly created edge.
    pub neutral_affinity: f32,

    /// Largest affinity change a single interaction can cause.
    pub max_affinity_delta: f32,

    /// Upper bound on relationship entries included in a decision context.
    pub neighbor_limit: usize,

    /// Edges below this affinity are left out of decision contexts unless the
    /// other citizen is co-located.
    pub min_neighbor_affinity: f32,

    /// Number of lock stripes guarding the edge map.
    pub shard_count: usize,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            neutral_affinity:      0.0,
            max_affinity_delta:    0.2,
            neighbor_limit:        6,
            min_neighbor_affinity: -1.0,
            shard_count:           16,
        }
    }
}

impl SocialConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if !(-1.0..=1.0).contains(&self.neutral_affinity) {
            return Err(CoreError::Config("social.neutral_affinity must be in [-1, 1]".into()));
        }
        if !(self.max_affinity_delta > 0.0 && self.max_affinity_delta <= 2.0) {
            return Err(CoreError::Config("social.max_affinity_delta must be in (0, 2]".into()));
        }
        if self.shard_count == 0 {
            return Err(CoreError::Config("social.shard_count must be at least 1".into()));
        }
        Ok(())
    }
}

// ── OracleConfig ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OracleConfig {
    /// Per-call deadline; a citizen whose call exceeds it goes `Idle`.
    pub timeout_ms: u64,

    /// Maximum oracle calls in flight at once.
    pub max_in_flight: usize,

    /// Minimum ticks between two proximity interrupts for one citizen.
    pub interrupt_cooldown_ticks: u64,

    /// Longest action duration (ticks) the kernel accepts from the oracle.
    pub max_action_ticks: u32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            timeout_ms:               2_000,
            max_in_flight:            32,
            interrupt_cooldown_ticks: 8,
            max_action_ticks:         96,
        }
    }
}

impl OracleConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.timeout_ms == 0 {
            return Err(CoreError::Config("oracle.timeout_ms must be at least 1".into()));
        }
        if self.max_in_flight == 0 {
            return Err(CoreError::Config("oracle.max_in_flight must be at least 1".into()));
        }
        if self.max_action_ticks == 0 {
            return Err(CoreError::Config("oracle.max_action_ticks must be at least 1".into()));
        }
        Ok(())
    }
}
