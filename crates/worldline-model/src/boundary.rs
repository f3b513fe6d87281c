//! Imaginary-time boundary handling for clustering.

/// How each site's world line is closed between τ = 1 and τ = 0.
///
/// Clustering always joins a site's bottom boundary leg to its first
/// vertex and its last vertex to the top boundary leg. The policy only
/// decides whether the top leg is also joined back to the bottom leg.
/// There is no `Default`; the caller must pick one.
///
/// # Examples
///
/// ```
/// use worldline_model::BoundaryPolicy;
///
/// assert!(BoundaryPolicy::Periodic.closes_world_lines());
/// assert!(!BoundaryPolicy::Open.closes_world_lines());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundaryPolicy {
    /// First and last legs of a site stay unlinked; the initial and
    /// final states can differ.
    Open,
    /// The top leg is linked to the bottom leg (trace boundary); the
    /// initial and final states always flip together.
    Periodic,
}

impl BoundaryPolicy {
    /// Whether top and bottom boundary legs share a cluster.
    pub fn closes_world_lines(self) -> bool {
        matches!(self, Self::Periodic)
    }
}
