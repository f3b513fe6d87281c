//! Cluster and infection statistics, and the text sink they append to.
//!
//! [`ClusterStatistics`] is a read-only measurement pass over a
//! clustered world line. It returns one [`SweepStatistics`] record per
//! call and keeps running totals plus two histograms across calls.
//! [`StatsWriter`] appends records as whitespace-separated rows.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use worldline_core::{ClusterId, SweepId};
use worldline_model::Model;

use crate::config::{check_bin_width, ConfigError, SweepConfig};
use crate::error::EngineError;
use crate::world::WorldLine;

/// Measurements of one sweep.
///
/// A *free* cluster is one with weight zero. Durations are fractions of
/// β, the unit of vertex times.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SweepStatistics {
    /// Sweep the record belongs to.
    pub sweep: SweepId,
    /// Number of clusters.
    pub total_clusters: usize,
    /// Number of clusters with weight zero.
    pub free_clusters: usize,
    /// `free_clusters / total_clusters`, 0 without clusters.
    pub free_fraction: f64,
    /// Mean number of legs per free cluster, 0 without free clusters.
    pub mean_free_size: f64,
    /// Maximal infected intervals over `[0, 1)`, summed over sites.
    pub infection_intervals: u64,
    /// Mean length of those intervals, 0 without intervals.
    pub mean_infection_duration: f64,
    /// Longest interval, 0 without intervals.
    pub max_infection_duration: f64,
}

/// Running means over every [`ClusterStatistics::collect`] call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatisticsSummary {
    /// Number of records collected.
    pub sweeps: u64,
    /// Mean of `free_fraction`.
    pub mean_free_fraction: f64,
    /// Mean of `mean_free_size`.
    pub mean_free_size: f64,
    /// Mean of `total_clusters`.
    pub mean_total_clusters: f64,
    /// Mean of `infection_intervals`.
    pub mean_infection_intervals: f64,
    /// Mean length over all intervals of all records.
    pub mean_infection_duration: f64,
    /// Longest interval seen in any record.
    pub max_infection_duration: f64,
}

impl fmt::Display for StatisticsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sweeps={} free_fraction={:.4} free_size={:.2} clusters={:.1} \
             intervals={:.2} duration={:.4} max_duration={:.4}",
            self.sweeps,
            self.mean_free_fraction,
            self.mean_free_size,
            self.mean_total_clusters,
            self.mean_infection_intervals,
            self.mean_infection_duration,
            self.max_infection_duration,
        )
    }
}

/// Caller-owned statistics accumulator.
///
/// # Examples
///
/// ```
/// use worldline_arena::ArenaConfig;
/// use worldline_core::SweepId;
/// use worldline_engine::{clustering, ClusterStatistics, WorldLine};
/// use worldline_model::{BoundaryPolicy, ModelBuilder};
///
/// let model = ModelBuilder::new(3).build().unwrap();
/// let mut world = WorldLine::new(3, ArenaConfig::default()).unwrap();
/// clustering(&mut world, &model, BoundaryPolicy::Periodic);
///
/// let mut stats = ClusterStatistics::new(0.1).unwrap();
/// let rec = stats.collect(&world, &model, SweepId(0)).unwrap();
/// assert_eq!(rec.total_clusters, 3);
/// assert_eq!(rec.free_clusters, 0);
/// assert_eq!(stats.summary().sweeps, 1);
/// ```
#[derive(Clone, Debug)]
pub struct ClusterStatistics {
    duration_bin_width: f64,
    sweeps: u64,
    sum_free_fraction: f64,
    sum_free_size: f64,
    sum_clusters: u64,
    sum_intervals: u64,
    sum_duration: f64,
    max_duration: f64,
    /// Cluster count by size in legs.
    size_histogram: Vec<u64>,
    /// Infection interval count by duration bin.
    duration_histogram: Vec<u64>,
}

/// Count one sample in `bin`, growing the histogram on demand.
fn bump(histogram: &mut Vec<u64>, bin: usize) -> Result<(), EngineError> {
    if bin >= histogram.len() {
        let requested = bin + 1;
        histogram
            .try_reserve(requested - histogram.len())
            .map_err(|_| EngineError::AllocationFailed { requested })?;
        histogram.resize(requested, 0);
    }
    histogram[bin] += 1;
    Ok(())
}

impl ClusterStatistics {
    /// An empty accumulator. `duration_bin_width` is the width of one
    /// duration histogram bin as a fraction of β.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidBinWidth`] under the same rule as
    /// [`SweepConfig::validate`].
    pub fn new(duration_bin_width: f64) -> Result<Self, ConfigError> {
        check_bin_width(duration_bin_width)?;
        Ok(Self::empty(duration_bin_width))
    }

    fn empty(duration_bin_width: f64) -> Self {
        Self {
            duration_bin_width,
            sweeps: 0,
            sum_free_fraction: 0.0,
            sum_free_size: 0.0,
            sum_clusters: 0,
            sum_intervals: 0,
            sum_duration: 0.0,
            max_duration: 0.0,
            size_histogram: Vec::new(),
            duration_histogram: Vec::new(),
        }
    }

    /// Measure `world` and fold the result into the running totals.
    ///
    /// # Errors
    ///
    /// [`EngineError::ClustersMissing`] without a cluster state;
    /// [`EngineError::AllocationFailed`] if a histogram cannot grow.
    pub fn collect(
        &mut self,
        world: &WorldLine,
        model: &Model,
        sweep: SweepId,
    ) -> Result<SweepStatistics, EngineError> {
        let clusters = world.clusters().ok_or(EngineError::ClustersMissing)?;

        let sizes = clusters.sizes();
        let mut free_clusters = 0;
        let mut free_legs = 0;
        for (c, &size) in sizes.iter().enumerate() {
            if clusters.is_fixed(ClusterId(c as u32)) {
                free_clusters += 1;
                free_legs += size;
            }
            bump(&mut self.size_histogram, size)?;
        }
        let total_clusters = sizes.len();

        let durations = infection_intervals(world, model);
        let mut max_duration: f64 = 0.0;
        for &d in &durations {
            max_duration = max_duration.max(d);
            let bin = self.duration_bin(d)?;
            bump(&mut self.duration_histogram, bin)?;
        }
        let sum: f64 = durations.iter().sum();

        let record = SweepStatistics {
            sweep,
            total_clusters,
            free_clusters,
            free_fraction: ratio(free_clusters as f64, total_clusters as f64),
            mean_free_size: ratio(free_legs as f64, free_clusters as f64),
            infection_intervals: durations.len() as u64,
            mean_infection_duration: ratio(sum, durations.len() as f64),
            max_infection_duration: max_duration,
        };

        self.sweeps += 1;
        self.sum_free_fraction += record.free_fraction;
        self.sum_free_size += record.mean_free_size;
        self.sum_clusters += total_clusters as u64;
        self.sum_intervals += record.infection_intervals;
        self.sum_duration += sum;
        self.max_duration = self.max_duration.max(max_duration);
        Ok(record)
    }

    /// Running means across all records so far.
    pub fn summary(&self) -> StatisticsSummary {
        let n = self.sweeps as f64;
        StatisticsSummary {
            sweeps: self.sweeps,
            mean_free_fraction: ratio(self.sum_free_fraction, n),
            mean_free_size: ratio(self.sum_free_size, n),
            mean_total_clusters: ratio(self.sum_clusters as f64, n),
            mean_infection_intervals: ratio(self.sum_intervals as f64, n),
            mean_infection_duration: ratio(self.sum_duration, self.sum_intervals as f64),
            max_infection_duration: self.max_duration,
        }
    }

    /// Cluster counts by size in legs; index = size.
    pub fn size_histogram(&self) -> &[u64] {
        &self.size_histogram
    }

    /// Infection interval counts by duration bin.
    pub fn duration_histogram(&self) -> &[u64] {
        &self.duration_histogram
    }

    /// Width of one duration bin.
    pub fn duration_bin_width(&self) -> f64 {
        self.duration_bin_width
    }

    /// Drop all running totals and histograms.
    pub fn reset(&mut self) {
        *self = Self::empty(self.duration_bin_width);
    }

    /// Histogram bin of an interval of length `d`.
    fn duration_bin(&self, d: f64) -> Result<usize, EngineError> {
        let max = SweepConfig::MAX_DURATION_BINS;
        let bin = (d / self.duration_bin_width).floor();
        if !(0.0..max as f64).contains(&bin) {
            return Err(EngineError::AllocationFailed { requested: max });
        }
        Ok(bin as usize)
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Lengths of all maximal infected intervals, site by site.
fn infection_intervals(world: &WorldLine, model: &Model) -> Vec<f64> {
    let mut start: Vec<Option<f64>> = world
        .istate()
        .iter()
        .map(|s| s.is_infected().then_some(0.0))
        .collect();
    let mut out = Vec::new();
    for v in world.sequence() {
        let bond = model.bond(v.bond);
        for k in 0..bond.arity() {
            let s = bond.site(k).index();
            match (start[s], v.outgoing(k).is_infected()) {
                (None, true) => start[s] = Some(v.time),
                (Some(t0), false) => {
                    out.push(v.time - t0);
                    start[s] = None;
                }
                _ => {}
            }
        }
    }
    out.extend(start.into_iter().flatten().map(|t0| 1.0 - t0));
    out
}

// ── StatsWriter ────────────────────────────────────────────────────

/// Appends [`SweepStatistics`] rows to a byte stream.
///
/// Row layout:
///
/// ```text
/// sweep free_fraction mean_free_size total_clusters infection_intervals mean_infection_duration max_infection_duration
/// ```
///
/// Every row is flushed as soon as it is written.
pub struct StatsWriter<W: Write> {
    writer: W,
    rows_written: u64,
}

impl StatsWriter<BufWriter<File>> {
    /// Open `path` for appending, creating it if needed.
    pub fn append_to(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> StatsWriter<W> {
    /// Wrap any writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            rows_written: 0,
        }
    }

    /// Append one row.
    pub fn write_row(&mut self, record: &SweepStatistics) -> Result<(), EngineError> {
        writeln!(
            self.writer,
            "{} {} {} {} {} {} {}",
            record.sweep,
            record.free_fraction,
            record.mean_free_size,
            record.total_clusters,
            record.infection_intervals,
            record.mean_infection_duration,
            record.max_infection_duration,
        )?;
        self.writer.flush()?;
        self.rows_written += 1;
        Ok(())
    }

    /// Rows written so far.
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Unwrap the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
