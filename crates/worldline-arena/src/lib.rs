//! Double-buffered event sequence storage for the worldline engine.
//!
//! The active world-line sequence is never edited in place when its
//! length changes. Rebuilding passes (insertion, pruning) read the
//! active buffer and write the other one, then publish it:
//!
//! ```text
//! SequenceBuffers
//! ├── buffers[0]: Vec<Vertex>  ←── active (even generations) / staging (odd)
//! ├── buffers[1]: Vec<Vertex>  ←── staging (even generations) / active (odd)
//! └── active: usize            ←── flipped by publish()
//! ```
//!
//! Per-vertex edits that keep the length (leg flips, bond swaps) go
//! through [`SequenceBuffers::active_mut`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod buffers;
pub mod config;
pub mod error;

pub use buffers::{RebuildGuard, SequenceBuffers};
pub use config::ArenaConfig;
pub use error::ArenaError;
