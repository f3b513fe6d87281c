//! Single-sweep orchestration.
//!
//! [`SweepEngine`] owns the model, the world line, a seeded
//! `ChaCha8Rng`, the event counters, and the statistics accumulator.
//! Each [`sweep()`](SweepEngine::sweep) runs
//!
//! ```text
//! insert → swap (optional) → cluster → flip → statistics → prune
//! ```
//!
//! Pruning runs last: cluster information only describes the sequence
//! it was built from, and every fresh insertion is diagonal.
//!
//! # Ownership model
//!
//! `SweepEngine` is [`Send`] but is driven through `&mut self` by one
//! caller. Looping over sweeps and annealing schedules stay with that
//! caller.

use std::io::{self, Write};
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use worldline_core::{EventCounters, SweepId};
use worldline_model::Model;

use crate::cluster::{clustering, ClusterSummary};
use crate::config::{PrunePolicy, SweepConfig};
use crate::error::EngineError;
use crate::flip::{flip_cluster, FlipSummary};
use crate::insert::insert_vertices;
use crate::metrics::SweepMetrics;
use crate::prune::{remove_only_fixed_vertices, remove_vertices};
use crate::snapshot::snapshot_show;
use crate::stats::{ClusterStatistics, StatsWriter, SweepStatistics};
use crate::swap::swapping_graphs;
use crate::world::WorldLine;

// Compile-time assertion: SweepEngine is Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<SweepEngine>();
    }
};

// ── SweepReport ───────────────────────────────────────────────────

/// Result of a successful [`SweepEngine::sweep()`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepReport {
    /// Sweep this report belongs to.
    pub sweep: SweepId,
    /// Vertices inserted by the diagonal update.
    pub inserted: usize,
    /// Vertices whose bond the swapper changed.
    pub swapped: usize,
    /// Cluster counts.
    pub clusters: ClusterSummary,
    /// Flip counts.
    pub flips: FlipSummary,
    /// The statistics record of this sweep.
    pub statistics: SweepStatistics,
    /// Vertices removed by the pruner.
    pub removed: usize,
    /// Stage timings and buffer usage.
    pub metrics: SweepMetrics,
}

// ── SweepEngine ───────────────────────────────────────────────────

/// Drives one Monte Carlo sweep at a time over an owned world line.
///
/// # Examples
///
/// ```
/// use worldline_core::{EventKind, LegSlot, SiteId};
/// use worldline_engine::{SweepConfig, SweepEngine};
/// use worldline_model::{BondType, BoundaryPolicy, ModelBuilder};
///
/// let mut b = ModelBuilder::new(2);
/// b.beta(2.0);
/// let diag = b.add_bond_type(
///     BondType::new("diag", 1, EventKind::Neutral, 1.0).link(LegSlot::In0, LegSlot::Out0),
/// );
/// for s in 0..2 {
///     let bond = b.add_bond(&[SiteId(s)], diag);
///     b.insertion(SiteId(s), 1.0, bond);
/// }
/// let model = b.build().unwrap();
///
/// let config = SweepConfig::new(BoundaryPolicy::Periodic).with_seed(7);
/// let mut engine = SweepEngine::new(model, config).unwrap();
/// for _ in 0..10 {
///     engine.sweep().unwrap();
/// }
/// assert_eq!(engine.sweeps_done(), 10);
/// assert!(engine.world().is_continuous(engine.model()));
/// ```
pub struct SweepEngine {
    model: Model,
    world: WorldLine,
    config: SweepConfig,
    rng: ChaCha8Rng,
    counters: EventCounters,
    statistics: ClusterStatistics,
    next_sweep: SweepId,
}

impl SweepEngine {
    /// Build an engine over an empty, all-susceptible world line.
    pub fn new(model: Model, config: SweepConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let world = WorldLine::new(model.n_sites(), config.arena.clone())?;
        Self::with_world(model, world, config)
    }

    /// Build an engine over an existing world line.
    ///
    /// # Errors
    ///
    /// [`EngineError::Config`] for an invalid config and
    /// [`EngineError::SiteCountMismatch`] if `world` was built for a
    /// different number of sites.
    pub fn with_world(
        model: Model,
        world: WorldLine,
        config: SweepConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        if world.n_sites() != model.n_sites() {
            return Err(EngineError::SiteCountMismatch {
                expected: model.n_sites(),
                found: world.n_sites(),
            });
        }
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            statistics: ClusterStatistics::new(config.duration_bin_width)?,
            model,
            world,
            config,
            counters: EventCounters::new(),
            next_sweep: SweepId(0),
        })
    }

    /// Run one sweep without a statistics sink.
    pub fn sweep(&mut self) -> Result<SweepReport, EngineError> {
        self.run(None::<&mut StatsWriter<io::Sink>>)
    }

    /// Run one sweep and append its statistics row to `sink`.
    ///
    /// A failed sink write does not abort the sweep: pruning still runs
    /// and the world line stays consistent, then the I/O error is
    /// returned.
    pub fn sweep_into<W: Write>(
        &mut self,
        sink: &mut StatsWriter<W>,
    ) -> Result<SweepReport, EngineError> {
        self.run(Some(sink))
    }

    fn run<W: Write>(
        &mut self,
        sink: Option<&mut StatsWriter<W>>,
    ) -> Result<SweepReport, EngineError> {
        let sweep_start = Instant::now();
        let sweep = self.next_sweep;

        // 1. Diagonal update.
        let insert_start = Instant::now();
        let inserted = insert_vertices(&mut self.world, &self.model, &mut self.rng)?;
        let insert_us = insert_start.elapsed().as_micros() as u64;
        let peak_vertices = self.world.sequence().len();
        self.warn_on_growth(peak_vertices);

        // 2. Optional graph swap.
        let swap_start = Instant::now();
        let swapped = if self.config.swap_graphs {
            swapping_graphs(&mut self.world, &self.model, &mut self.rng)
        } else {
            0
        };
        let swap_us = swap_start.elapsed().as_micros() as u64;

        // 3. Clusters.
        let cluster_start = Instant::now();
        let clusters = clustering(&mut self.world, &self.model, self.config.boundary);
        let cluster_us = cluster_start.elapsed().as_micros() as u64;

        // 4. Flips.
        let flip_start = Instant::now();
        let flips = flip_cluster(&mut self.world, &mut self.rng)?;
        let flip_us = flip_start.elapsed().as_micros() as u64;

        // 5. Statistics; a sink failure is held until after pruning.
        let stats_start = Instant::now();
        let statistics = self.statistics.collect(&self.world, &self.model, sweep)?;
        let sink_result = match sink {
            Some(sink) => sink.write_row(&statistics),
            None => Ok(()),
        };
        let statistics_us = stats_start.elapsed().as_micros() as u64;

        // 6. Prune.
        let prune_start = Instant::now();
        let removed = match self.config.prune {
            PrunePolicy::Standard => {
                remove_vertices(&mut self.world, &self.model, &mut self.counters)?
            }
            PrunePolicy::FixedOnly => {
                remove_only_fixed_vertices(&mut self.world, &self.model, &mut self.counters)?
            }
        };
        let prune_us = prune_start.elapsed().as_micros() as u64;

        self.next_sweep = SweepId(sweep.0 + 1);
        sink_result?;

        let buffers = self.world.buffers();
        let metrics = SweepMetrics {
            total_us: sweep_start.elapsed().as_micros() as u64,
            insert_us,
            swap_us,
            cluster_us,
            flip_us,
            statistics_us,
            prune_us,
            peak_vertices,
            vertices: buffers.len(),
            capacity: buffers.capacity(),
            memory_bytes: buffers.memory_bytes(),
        };
        Ok(SweepReport {
            sweep,
            inserted,
            swapped,
            clusters,
            flips,
            statistics,
            removed,
            metrics,
        })
    }

    fn warn_on_growth(&self, len: usize) {
        let max = self.config.arena.max_vertices;
        if len > max / 4 * 3 {
            eprintln!(
                "worldline-engine: warning: sequence holds {len} vertices, \
                 above 3/4 of max_vertices ({max})"
            );
        }
    }

    /// Write a snapshot of the current world line.
    pub fn snapshot<W: Write + ?Sized>(&self, out: &mut W) -> Result<(), EngineError> {
        snapshot_show(&self.world, &self.model, out)
    }

    /// The model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The world line.
    pub fn world(&self) -> &WorldLine {
        &self.world
    }

    /// Mutable access to the world line between sweeps.
    pub fn world_mut(&mut self) -> &mut WorldLine {
        &mut self.world
    }

    /// The configuration.
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Infection and recovery totals counted by the pruners.
    pub fn counters(&self) -> &EventCounters {
        &self.counters
    }

    /// Zero the event counters.
    pub fn reset_counters(&mut self) {
        self.counters.reset();
    }

    /// The statistics accumulator.
    pub fn statistics(&self) -> &ClusterStatistics {
        &self.statistics
    }

    /// Number of sweeps completed.
    pub fn sweeps_done(&self) -> u64 {
        self.next_sweep.0
    }
}
