//! Benchmark profiles for the worldline engine.
//!
//! - [`reference_profile`]: 64-site chain at β = 8
//! - [`stress_profile`]: 1024-site chain at β = 16
//! - [`warmed_engine`]: an engine run past its initial transient

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use worldline_engine::{EngineError, SweepConfig, SweepEngine};
use worldline_model::{BoundaryPolicy, Model};
use worldline_test_utils::chain_model;

/// 64-site chain at β = 8, insertion weight 1, contact weight 0.5.
pub fn reference_profile(seed: u64) -> (Model, SweepConfig) {
    let f = chain_model(64, 8.0, 1.0, 0.5);
    (f.model, SweepConfig::new(BoundaryPolicy::Periodic).with_seed(seed))
}

/// 1024-site chain at β = 16; same weights as [`reference_profile`].
pub fn stress_profile(seed: u64) -> (Model, SweepConfig) {
    let f = chain_model(1024, 16.0, 1.0, 0.5);
    (f.model, SweepConfig::new(BoundaryPolicy::Periodic).with_seed(seed))
}

/// Build an engine from a profile and run `warmup` sweeps.
pub fn warmed_engine(
    (model, config): (Model, SweepConfig),
    warmup: usize,
) -> Result<SweepEngine, EngineError> {
    let mut engine = SweepEngine::new(model, config)?;
    for _ in 0..warmup {
        engine.sweep()?;
    }
    Ok(engine)
}
