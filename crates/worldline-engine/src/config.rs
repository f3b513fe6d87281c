//! Sweep configuration, validation, and error types.

use std::error::Error;
use std::fmt;

use worldline_arena::{ArenaConfig, ArenaError};
use worldline_model::BoundaryPolicy;

// ── PrunePolicy ────────────────────────────────────────────────────

/// Which pruner closes a sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PrunePolicy {
    /// Drop every diagonal vertex ([`remove_vertices`](crate::remove_vertices)).
    #[default]
    Standard,
    /// Drop only diagonal vertices whose legs all sit in fixed clusters
    /// ([`remove_only_fixed_vertices`](crate::remove_only_fixed_vertices)).
    FixedOnly,
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SweepConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Arena configuration is invalid.
    Arena(ArenaError),
    /// `duration_bin_width` is NaN, infinite, zero, negative, or so
    /// narrow that `[0, 1]` would need [`SweepConfig::MAX_DURATION_BINS`]
    /// bins or more.
    InvalidBinWidth {
        /// The invalid value.
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arena(e) => write!(f, "arena: {e}"),
            Self::InvalidBinWidth { value } => {
                write!(f, "duration_bin_width must be finite and positive, got {value}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(e) => Some(e),
            Self::InvalidBinWidth { .. } => None,
        }
    }
}

impl From<ArenaError> for ConfigError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}

// ── SweepConfig ────────────────────────────────────────────────────

/// Everything [`SweepEngine`](crate::SweepEngine) needs besides the model.
///
/// The boundary policy has no default and must be passed to
/// [`new()`](SweepConfig::new); the remaining fields start at their
/// defaults and may be overwritten before the engine is built.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepConfig {
    /// How world lines close between τ = 1 and τ = 0.
    pub boundary: BoundaryPolicy,
    /// Pruner run at the end of each sweep. Default: `Standard`.
    pub prune: PrunePolicy,
    /// Whether to run the graph swapper. Default: `true`.
    pub swap_graphs: bool,
    /// Seed for the engine's `ChaCha8Rng`. Default: 0.
    pub seed: u64,
    /// Width of one infection-duration histogram bin, as a fraction
    /// of β. Default: 0.01.
    pub duration_bin_width: f64,
    /// Sequence buffer limits.
    pub arena: ArenaConfig,
}

impl SweepConfig {
    /// Default histogram bin width.
    pub const DEFAULT_DURATION_BIN_WIDTH: f64 = 0.01;

    /// Upper bound on the number of duration histogram bins.
    pub const MAX_DURATION_BINS: usize = 1 << 20;

    /// A config with the given boundary policy and defaults elsewhere.
    pub fn new(boundary: BoundaryPolicy) -> Self {
        Self {
            boundary,
            prune: PrunePolicy::default(),
            swap_graphs: true,
            seed: 0,
            duration_bin_width: Self::DEFAULT_DURATION_BIN_WIDTH,
            arena: ArenaConfig::default(),
        }
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the pruning policy.
    pub fn with_prune(mut self, prune: PrunePolicy) -> Self {
        self.prune = prune;
        self
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_bin_width(self.duration_bin_width)?;
        if self.arena.max_vertices == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "max_vertices must be > 0".into(),
            }
            .into());
        }
        if self.arena.initial_capacity > self.arena.max_vertices {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "initial_capacity {} exceeds max_vertices {}",
                    self.arena.initial_capacity, self.arena.max_vertices
                ),
            }
            .into());
        }
        Ok(())
    }
}

/// Accept a duration bin width only if it is finite, positive, and
/// leaves every duration in `[0, 1]` a bin below
/// [`SweepConfig::MAX_DURATION_BINS`].
pub(crate) fn check_bin_width(width: f64) -> Result<(), ConfigError> {
    let max_bins = SweepConfig::MAX_DURATION_BINS as f64;
    if !width.is_finite() || width <= 0.0 || 1.0 / width >= max_bins {
        return Err(ConfigError::InvalidBinWidth { value: width });
    }
    Ok(())
}
