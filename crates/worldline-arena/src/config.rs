//! Sequence buffer configuration.

/// Capacity limits for [`SequenceBuffers`](crate::SequenceBuffers).
///
/// Validated at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Hard cap on the number of vertices a sequence may hold.
    ///
    /// Default: 67_108_864 (2^26). Growth past the cap is
    /// [`ArenaError::CapacityExceeded`](crate::ArenaError::CapacityExceeded),
    /// which the engine treats as fatal.
    pub max_vertices: usize,

    /// Capacity reserved in each buffer at construction.
    ///
    /// Default: 1024. Must not exceed `max_vertices`.
    pub initial_capacity: usize,
}

impl ArenaConfig {
    /// Default vertex cap.
    pub const DEFAULT_MAX_VERTICES: usize = 1 << 26;

    /// Default initial capacity per buffer.
    pub const DEFAULT_INITIAL_CAPACITY: usize = 1024;

    /// Config with the given cap and the default initial capacity
    /// (clamped to the cap).
    pub fn with_max_vertices(max_vertices: usize) -> Self {
        Self {
            max_vertices,
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY.min(max_vertices),
        }
    }

    /// Bytes needed for one full buffer at the cap.
    pub fn max_buffer_bytes(&self) -> usize {
        self.max_vertices
            .saturating_mul(std::mem::size_of::<worldline_core::Vertex>())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            max_vertices: Self::DEFAULT_MAX_VERTICES,
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
        }
    }
}
