//! Monte Carlo sweep stages for the worldline engine.
//!
//! Every stage is a free function over a [`WorldLine`] and a read-only
//! [`Model`](worldline_model::Model), with randomness passed in
//! explicitly as a [`RandomSource`]:
//!
//! | Stage | Function |
//! |-------|----------|
//! | Diagonal update | [`insert_vertices`] |
//! | Standard pruning | [`remove_vertices`] |
//! | Fixed-only pruning | [`remove_only_fixed_vertices`] |
//! | Graph swapping | [`swapping_graphs`] |
//! | Cluster building | [`clustering`] |
//! | Cluster flip | [`flip_cluster`] |
//! | Statistics | [`ClusterStatistics::collect`] |
//! | Snapshot export | [`snapshot_show`] |
//!
//! [`SweepEngine`] runs them in order for one sweep.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cluster;
pub mod config;
pub mod error;
pub mod flip;
pub mod insert;
pub mod metrics;
pub mod prune;
pub mod rng;
pub mod snapshot;
pub mod stats;
pub mod swap;
pub mod sweep;
pub mod world;

pub use cluster::{clustering, ClusterSummary};
pub use config::{ConfigError, PrunePolicy, SweepConfig};
pub use error::EngineError;
pub use flip::{flip_cluster, flip_probability, FlipSummary};
pub use insert::insert_vertices;
pub use metrics::SweepMetrics;
pub use prune::{remove_only_fixed_vertices, remove_vertices};
pub use rng::RandomSource;
pub use snapshot::{read_snapshot, snapshot_show, SnapshotDump};
pub use stats::{ClusterStatistics, StatisticsSummary, StatsWriter, SweepStatistics};
pub use swap::swapping_graphs;
pub use sweep::{SweepEngine, SweepReport};
pub use world::{ClusterState, LegLayout, WorldLine};
