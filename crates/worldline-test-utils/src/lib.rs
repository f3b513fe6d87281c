//! Test fixtures for worldline development.
//!
//! Provides ready-made models ([`two_site_model`], [`chain_model`]),
//! seed sequences, and a seeded RNG so tests and benches across the
//! workspace build the same scenarios the same way.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{
    chain_model, contact_seed, seeded_rng, two_site_model, ChainFixture, TwoSiteFixture,
};
