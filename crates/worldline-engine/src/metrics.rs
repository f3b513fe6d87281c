//! Per-sweep performance metrics.
//!
//! [`SweepMetrics`] captures stage timings and buffer usage for a
//! single sweep so drivers can profile runs or watch sequence growth.

/// Timing and memory metrics collected during a single sweep.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepMetrics {
    /// Wall-clock time for the entire sweep.
    pub total_us: u64,
    /// Diagonal update.
    pub insert_us: u64,
    /// Graph swapping (0 when disabled).
    pub swap_us: u64,
    /// Cluster building.
    pub cluster_us: u64,
    /// Cluster flips.
    pub flip_us: u64,
    /// Statistics collection and the optional sink write.
    pub statistics_us: u64,
    /// Pruning.
    pub prune_us: u64,
    /// Vertices in the sequence after insertion (the sweep's peak).
    pub peak_vertices: usize,
    /// Vertices left after pruning.
    pub vertices: usize,
    /// Combined capacity of both sequence buffers, in vertices.
    pub capacity: usize,
    /// Heap bytes held by both sequence buffers.
    pub memory_bytes: usize,
}
