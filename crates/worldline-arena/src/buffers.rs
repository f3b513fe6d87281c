//! Double-buffered sequence orchestrator.
//!
//! [`SequenceBuffers`] keeps two vertex buffers that alternate between
//! "active" (what every pass reads) and "staging" (what a rebuild
//! writes). The lifecycle of a rebuild is:
//! 1. `begin_rebuild()`: clear the staging buffer and reserve capacity
//! 2. the pass reads [`RebuildGuard::source`] and pushes into the guard
//! 3. `publish()`: staging becomes active, generation advances

use worldline_core::Vertex;

use crate::config::ArenaConfig;
use crate::error::ArenaError;

/// Write access to the staging buffer during a rebuild.
///
/// Created by [`SequenceBuffers::begin_rebuild()`] and dropped before
/// [`SequenceBuffers::publish()`]. Holds a shared borrow of the active
/// buffer and a mutable borrow of the staging buffer, so nothing else
/// can touch the sequence while the rebuild runs.
#[must_use]
pub struct RebuildGuard<'a> {
    source: &'a [Vertex],
    target: &'a mut Vec<Vertex>,
    max_vertices: usize,
}

impl<'a> RebuildGuard<'a> {
    /// The active sequence the rebuild reads from.
    pub fn source(&self) -> &'a [Vertex] {
        self.source
    }

    /// Append a vertex to the staging buffer.
    ///
    /// Grows the buffer if the reservation made by `begin_rebuild()`
    /// was too small.
    pub fn push(&mut self, vertex: Vertex) -> Result<(), ArenaError> {
        let len = self.target.len();
        if len >= self.max_vertices {
            return Err(ArenaError::CapacityExceeded {
                requested: len + 1,
                capacity: self.max_vertices,
            });
        }
        if len == self.target.capacity() {
            let extra = len.max(1).min(self.max_vertices - len);
            self.target
                .try_reserve_exact(extra)
                .map_err(|_| ArenaError::AllocationFailed {
                    requested: len + extra,
                })?;
        }
        self.target.push(vertex);
        Ok(())
    }

    /// Vertices written so far.
    pub fn len(&self) -> usize {
        self.target.len()
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }
}

/// Two vertex buffers with an explicit active index.
///
/// # Buffer layout
///
/// ```text
/// buffers[active]      ←─── read by every pass, edited in place by flips/swaps
/// buffers[1 - active]  ←─── scratch for the next rebuild
/// ```
#[derive(Clone, Debug)]
pub struct SequenceBuffers {
    buffers: [Vec<Vertex>; 2],
    /// Which buffer is active (0 or 1).
    active: usize,
    /// Incremented on every publish.
    generation: u64,
    /// Whether `begin_rebuild()` was called and `publish()` not yet.
    rebuild_in_progress: bool,
    config: ArenaConfig,
}

impl SequenceBuffers {
    /// Create two empty buffers, each reserving `config.initial_capacity`.
    ///
    /// Returns `Err(ArenaError::InvalidConfig)` if the cap is zero or the
    /// initial capacity exceeds it, and `Err(ArenaError::AllocationFailed)`
    /// if the reservation fails.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        if config.max_vertices == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "max_vertices must be > 0".into(),
            });
        }
        if config.initial_capacity > config.max_vertices {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "initial_capacity {} exceeds max_vertices {}",
                    config.initial_capacity, config.max_vertices
                ),
            });
        }
        let mut buffers = [Vec::new(), Vec::new()];
        for buf in &mut buffers {
            buf.try_reserve_exact(config.initial_capacity)
                .map_err(|_| ArenaError::AllocationFailed {
                    requested: config.initial_capacity,
                })?;
        }
        Ok(Self {
            buffers,
            active: 0,
            generation: 0,
            rebuild_in_progress: false,
            config,
        })
    }

    /// The active sequence.
    pub fn active(&self) -> &[Vertex] {
        &self.buffers[self.active]
    }

    /// In-place access to the active sequence. The length is fixed;
    /// use a rebuild to add or remove vertices.
    pub fn active_mut(&mut self) -> &mut [Vertex] {
        &mut self.buffers[self.active]
    }

    /// Index (0 or 1) of the active buffer.
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Number of vertices in the active sequence.
    pub fn len(&self) -> usize {
        self.buffers[self.active].len()
    }

    /// Whether the active sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.buffers[self.active].is_empty()
    }

    /// Begin a rebuild, clearing the staging buffer and reserving room
    /// for `capacity_hint` vertices.
    ///
    /// Calling this again before `publish()` restarts the rebuild.
    pub fn begin_rebuild(&mut self, capacity_hint: usize) -> Result<RebuildGuard<'_>, ArenaError> {
        if capacity_hint > self.config.max_vertices {
            return Err(ArenaError::CapacityExceeded {
                requested: capacity_hint,
                capacity: self.config.max_vertices,
            });
        }
        let max_vertices = self.config.max_vertices;
        let (source, target) = Self::split(&mut self.buffers, self.active);
        target.clear();
        target
            .try_reserve_exact(capacity_hint)
            .map_err(|_| ArenaError::AllocationFailed {
                requested: capacity_hint,
            })?;
        self.rebuild_in_progress = true;
        Ok(RebuildGuard {
            source,
            target,
            max_vertices,
        })
    }

    /// Split borrow: (active, staging).
    fn split(buffers: &mut [Vec<Vertex>; 2], active: usize) -> (&[Vertex], &mut Vec<Vertex>) {
        let (a, b) = buffers.split_at_mut(1);
        if active == 0 {
            (&a[0], &mut b[0])
        } else {
            (&b[0], &mut a[0])
        }
    }

    /// Publish the staging buffer, making it the active sequence.
    ///
    /// Returns `Err(ArenaError::NoRebuildInProgress)` if `begin_rebuild()`
    /// was not called first or the rebuild was already published.
    pub fn publish(&mut self) -> Result<(), ArenaError> {
        if !self.rebuild_in_progress {
            return Err(ArenaError::NoRebuildInProgress);
        }
        self.rebuild_in_progress = false;
        self.active = 1 - self.active;
        self.generation += 1;
        Ok(())
    }

    /// Replace the active sequence with `vertices` through a full
    /// rebuild-and-publish cycle.
    pub fn load(&mut self, vertices: &[Vertex]) -> Result<(), ArenaError> {
        let mut guard = self.begin_rebuild(vertices.len())?;
        for &v in vertices {
            guard.push(v)?;
        }
        self.publish()
    }

    /// Number of publishes so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Combined capacity of both buffers, in vertices.
    pub fn capacity(&self) -> usize {
        self.buffers[0].capacity() + self.buffers[1].capacity()
    }

    /// Heap bytes held by both buffers.
    pub fn memory_bytes(&self) -> usize {
        self.capacity() * std::mem::size_of::<Vertex>()
    }

    /// The configuration the buffers were created with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }
}
