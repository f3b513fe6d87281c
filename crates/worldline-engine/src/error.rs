//! Engine error type.

use std::error::Error;
use std::fmt;
use std::io;

use worldline_arena::ArenaError;
use worldline_core::{BondId, SiteId};

use crate::config::ConfigError;

/// Errors returned by the sweep stages and the [`SweepEngine`](crate::SweepEngine).
///
/// `Arena` and `AllocationFailed` are fatal: the run must be aborted.
/// `Io` and `MalformedSnapshot` leave the simulation state untouched.
#[derive(Debug)]
pub enum EngineError {
    /// Sequence storage failed to grow or publish.
    Arena(ArenaError),
    /// The sweep configuration is invalid.
    Config(ConfigError),
    /// A stage that needs cluster information ran before
    /// [`clustering`](crate::clustering) on the current sequence.
    ClustersMissing,
    /// Writing statistics or a snapshot failed.
    Io(io::Error),
    /// A snapshot stream could not be parsed.
    MalformedSnapshot {
        /// 1-based line number; 0 when the counts disagree with the header.
        line: usize,
        /// What was wrong.
        detail: String,
    },
    /// A statistics buffer could not be grown.
    AllocationFailed {
        /// Number of entries requested.
        requested: usize,
    },
    /// Per-site state arrays do not match the model's site count.
    SiteCountMismatch {
        /// Sites in the model.
        expected: usize,
        /// Sites supplied.
        found: usize,
    },
    /// A vertex refers to a bond the model does not have.
    UnknownBond {
        /// The offending bond.
        bond: BondId,
    },
    /// `site_weight * beta` overflowed for a site.
    InvalidRate {
        /// The site.
        site: SiteId,
        /// The non-finite rate.
        rate: f64,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arena(e) => write!(f, "arena: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::ClustersMissing => {
                write!(f, "no cluster state for the current sequence; run clustering first")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::MalformedSnapshot { line, detail } => {
                write!(f, "malformed snapshot at line {line}: {detail}")
            }
            Self::AllocationFailed { requested } => {
                write!(f, "allocation of {requested} statistics entries failed")
            }
            Self::SiteCountMismatch { expected, found } => {
                write!(f, "expected state for {expected} sites, got {found}")
            }
            Self::UnknownBond { bond } => write!(f, "vertex refers to unknown bond {bond}"),
            Self::InvalidRate { site, rate } => {
                write!(f, "insertion rate on site {site} is not finite ({rate})")
            }
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArenaError> for EngineError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<io::Error> for EngineError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
