//! Sequence buffer error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur while growing or swapping sequence buffers.
///
/// Both capacity variants are fatal for a sweep: a truncated sequence
/// breaks world-line continuity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The sequence would grow past `ArenaConfig::max_vertices`.
    CapacityExceeded {
        /// Number of vertices requested.
        requested: usize,
        /// The configured cap.
        capacity: usize,
    },
    /// The allocator refused to reserve the requested capacity.
    AllocationFailed {
        /// Number of vertices requested.
        requested: usize,
    },
    /// `publish()` called without a preceding `begin_rebuild()`.
    NoRebuildInProgress,
    /// The configuration is inconsistent.
    InvalidConfig {
        /// What went wrong.
        reason: String,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "sequence capacity exceeded: requested {requested} vertices, cap {capacity}"
                )
            }
            Self::AllocationFailed { requested } => {
                write!(f, "allocation of {requested} vertices failed")
            }
            Self::NoRebuildInProgress => write!(f, "publish() called without begin_rebuild()"),
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
        }
    }
}

impl Error for ArenaError {}
