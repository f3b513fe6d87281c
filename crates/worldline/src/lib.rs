//! Worldline: world-line cluster Monte Carlo for stochastic epidemic processes.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! worldline sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use worldline::prelude::*;
//!
//! // Two sites, each with a linked "pass" bond used for insertion, and a
//! // contact bond between them.
//! let mut b = ModelBuilder::new(2);
//! b.beta(2.0);
//! let pass = b.add_bond_type(
//!     BondType::new("pass", 1, EventKind::Neutral, 1.0).link(LegSlot::In0, LegSlot::Out0),
//! );
//! let contact = b.add_bond_type(
//!     BondType::new("contact", 2, EventKind::Infection, 0.5)
//!         .link(LegSlot::In0, LegSlot::Out0)
//!         .link(LegSlot::In1, LegSlot::Out1),
//! );
//! for s in 0..2 {
//!     let bond = b.add_bond(&[SiteId(s)], pass);
//!     b.insertion(SiteId(s), 1.0, bond);
//! }
//! b.add_bond(&[SiteId(0), SiteId(1)], contact);
//! let model = b.build().unwrap();
//!
//! let config = SweepConfig::new(BoundaryPolicy::Periodic).with_seed(7);
//! let mut engine = SweepEngine::new(model, config).unwrap();
//! for _ in 0..10 {
//!     let report = engine.sweep().unwrap();
//!     assert!(report.clusters.clusters >= 1);
//! }
//! assert!(engine.world().is_continuous(engine.model()));
//! assert_eq!(engine.statistics().summary().sweeps, 10);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `worldline-core` | IDs, site states, vertices, event counters |
//! | [`model`] | `worldline-model` | Bond types, bonds, swap classes, boundary policy |
//! | [`arena`] | `worldline-arena` | Double-buffered vertex sequence storage |
//! | [`engine`] | `worldline-engine` | Sweep stages, statistics, snapshots, the sweep driver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and IDs (`worldline-core`).
///
/// Contains [`types::SiteState`], [`types::Vertex`] and its
/// [`types::LegSlot`]s, and [`types::EventCounters`].
pub use worldline_core as types;

/// Model description (`worldline-model`).
///
/// Build a [`model::Model`] with [`model::ModelBuilder`] from
/// [`model::BondType`]s, bonds and [`model::SwapClass`]es.
pub use worldline_model as model;

/// Vertex sequence storage (`worldline-arena`).
///
/// [`arena::SequenceBuffers`] holds the active sequence and a staging
/// buffer; rebuilds go through [`arena::RebuildGuard`].
pub use worldline_arena as arena;

/// Sweep stages and the sweep driver (`worldline-engine`).
///
/// [`engine::SweepEngine`] runs one full sweep per call; the stage
/// functions ([`engine::insert_vertices`], [`engine::clustering`],
/// [`engine::flip_cluster`] and the rest) can also be called directly.
pub use worldline_engine as engine;

/// Common imports for typical worldline usage.
///
/// ```rust
/// use worldline::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use worldline_core::{
        BondId, EventCounters, EventKind, LegSlot, SiteId, SiteState, SweepId, Vertex,
    };

    // Model
    pub use worldline_model::{BondType, BoundaryPolicy, Model, ModelBuilder, SwapClass};

    // Arena
    pub use worldline_arena::ArenaConfig;

    // Errors
    pub use worldline_arena::ArenaError;
    pub use worldline_engine::{ConfigError, EngineError};
    pub use worldline_model::ModelError;

    // Engine
    pub use worldline_engine::{
        ClusterStatistics, PrunePolicy, StatisticsSummary, StatsWriter, SweepConfig, SweepEngine,
        SweepMetrics, SweepReport, WorldLine,
    };
}
