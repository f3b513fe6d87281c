//! Core types for the worldline cluster Monte Carlo engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other crate in the workspace:
//! strongly-typed ids, site states, the [`Vertex`] event record, and
//! the [`EventCounters`] accumulator filled in by the pruners.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod event;
pub mod id;
pub mod state;
pub mod vertex;

pub use event::{EventCounters, EventKind};
pub use id::{BondId, BondTypeId, ClusterId, LegId, SiteId, SweepId};
pub use state::SiteState;
pub use vertex::{LegSlot, Vertex, LEG_SLOTS};
