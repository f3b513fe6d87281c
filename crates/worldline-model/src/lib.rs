//! Model descriptor for the worldline cluster Monte Carlo engine.
//!
//! A [`Model`] is the static, read-only description of the system being
//! simulated: how many sites there are, which typed bonds connect them,
//! how the legs of a vertex on each bond type are linked into clusters,
//! what weight each bond type contributes to a cluster, how densely
//! diagonal events are inserted on each site, and which bonds are
//! interchangeable for graph swapping.
//!
//! Models are assembled with [`ModelBuilder`] and validated once in
//! [`ModelBuilder::build`]; the engine trusts a built model.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bond;
pub mod boundary;
pub mod error;
pub mod model;
pub mod swap;

pub use bond::{Bond, BondType, Link};
pub use boundary::BoundaryPolicy;
pub use error::ModelError;
pub use model::{Model, ModelBuilder};
pub use swap::SwapClass;
