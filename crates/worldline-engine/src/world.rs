//! Simulation state: the event sequence, boundary states, and clusters.

use worldline_arena::{ArenaConfig, SequenceBuffers};
use worldline_core::{ClusterId, LegId, LegSlot, SiteId, SiteState, Vertex};
use worldline_model::Model;

use crate::error::EngineError;

// ── LegLayout ──────────────────────────────────────────────────────

/// Flat numbering of every leg in a sequence.
///
/// ```text
/// [ v0 legs | v1 legs | ... | bottom(site 0..n) | top(site 0..n) ]
/// ```
///
/// A vertex on an arity-1 bond owns two legs (`In0`, `Out0`); an
/// arity-2 vertex owns four, in [`LegSlot`] order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegLayout {
    /// `offsets[i]` is the first leg of vertex `i`; one extra entry
    /// holds the total vertex leg count.
    offsets: Vec<u32>,
    n_sites: usize,
}

impl LegLayout {
    /// Lay out the legs of `sequence` for a model with `n_sites` sites.
    pub fn new(sequence: &[Vertex], model: &Model) -> Self {
        let mut offsets = Vec::with_capacity(sequence.len() + 1);
        let mut next = 0u32;
        for v in sequence {
            offsets.push(next);
            next += 2 * model.arity(v.bond) as u32;
        }
        offsets.push(next);
        Self {
            offsets,
            n_sites: model.n_sites(),
        }
    }

    /// Number of vertices covered.
    pub fn n_vertices(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Number of legs owned by vertices.
    pub fn n_vertex_legs(&self) -> usize {
        self.offsets[self.offsets.len() - 1] as usize
    }

    /// Total number of legs, boundary legs included.
    pub fn n_legs(&self) -> usize {
        self.n_vertex_legs() + 2 * self.n_sites
    }

    /// Number of legs vertex `v` owns (2 or 4).
    #[inline]
    pub fn legs_of(&self, v: usize) -> usize {
        (self.offsets[v + 1] - self.offsets[v]) as usize
    }

    /// The leg in `slot` of vertex `v`, or `None` if the slot is unused
    /// at that vertex's arity.
    #[inline]
    pub fn vertex_leg(&self, v: usize, slot: LegSlot) -> Option<LegId> {
        let arity = self.legs_of(v) / 2;
        slot.arena_offset(arity)
            .map(|off| LegId(self.offsets[v] + off as u32))
    }

    /// The bottom (τ = 0) boundary leg of `site`.
    #[inline]
    pub fn bottom(&self, site: SiteId) -> LegId {
        LegId((self.n_vertex_legs() + site.index()) as u32)
    }

    /// The top (τ = 1) boundary leg of `site`.
    #[inline]
    pub fn top(&self, site: SiteId) -> LegId {
        LegId((self.n_vertex_legs() + self.n_sites + site.index()) as u32)
    }
}

// ── ClusterState ───────────────────────────────────────────────────

/// Cluster partition of the leg arena, built by
/// [`clustering`](crate::clustering).
#[derive(Clone, Debug)]
pub struct ClusterState {
    pub(crate) layout: LegLayout,
    /// Cluster of every leg, indexed by [`LegId`].
    pub(crate) leg_cluster: Vec<ClusterId>,
    /// Natural log of every cluster's weight, indexed by [`ClusterId`].
    /// `-inf` marks a cluster with a zero-weight member.
    pub(crate) ln_weights: Vec<f64>,
    /// Whether at least one vertex sits on each site.
    pub(crate) touched: Vec<bool>,
}

impl ClusterState {
    /// Leg numbering the partition refers to.
    pub fn layout(&self) -> &LegLayout {
        &self.layout
    }

    /// Number of clusters.
    pub fn n_clusters(&self) -> usize {
        self.ln_weights.len()
    }

    /// Cluster containing `leg`.
    #[inline]
    pub fn cluster_of(&self, leg: LegId) -> ClusterId {
        self.leg_cluster[leg.index()]
    }

    /// Cluster of every leg, indexed by leg id.
    pub fn leg_clusters(&self) -> &[ClusterId] {
        &self.leg_cluster
    }

    /// Weight of `cluster`.
    ///
    /// Saturates to `0.0` or `inf` for very long clusters; use
    /// [`ln_weight`](ClusterState::ln_weight) and
    /// [`is_fixed`](ClusterState::is_fixed) for decisions.
    #[inline]
    pub fn weight(&self, cluster: ClusterId) -> f64 {
        self.ln_weights[cluster.index()].exp()
    }

    /// Natural log of the weight of `cluster`; `-inf` if fixed.
    #[inline]
    pub fn ln_weight(&self, cluster: ClusterId) -> f64 {
        self.ln_weights[cluster.index()]
    }

    /// Log weights of all clusters, indexed by cluster id.
    pub fn ln_weights(&self) -> &[f64] {
        &self.ln_weights
    }

    /// Whether a member vertex of `cluster` has weight zero, so the
    /// cluster can never flip.
    #[inline]
    pub fn is_fixed(&self, cluster: ClusterId) -> bool {
        self.ln_weights[cluster.index()] == f64::NEG_INFINITY
    }

    /// Whether at least one vertex of the sequence sits on `site`.
    #[inline]
    pub fn is_touched(&self, site: SiteId) -> bool {
        self.touched[site.index()]
    }

    /// Number of legs in each cluster.
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.ln_weights.len()];
        for c in &self.leg_cluster {
            sizes[c.index()] += 1;
        }
        sizes
    }
}

// ── WorldLine ──────────────────────────────────────────────────────

/// The mutable state one sweep works on.
///
/// Holds the double-buffered vertex sequence, the per-site states at
/// τ = 0 (`istate`) and τ = 1 (`pstate`), and the cluster partition of
/// the current sequence if one has been built. Any change to the
/// sequence through insertion, pruning, swapping, or
/// [`sequence_mut`](WorldLine::sequence_mut) drops the partition.
#[derive(Clone, Debug)]
pub struct WorldLine {
    pub(crate) buffers: SequenceBuffers,
    pub(crate) istate: Vec<SiteState>,
    pub(crate) pstate: Vec<SiteState>,
    pub(crate) clusters: Option<ClusterState>,
}

impl WorldLine {
    /// An empty world line with every site susceptible.
    pub fn new(n_sites: usize, config: ArenaConfig) -> Result<Self, EngineError> {
        Ok(Self {
            buffers: SequenceBuffers::new(config)?,
            istate: vec![SiteState::Susceptible; n_sites],
            pstate: vec![SiteState::Susceptible; n_sites],
            clusters: None,
        })
    }

    /// A world line with every site in `state` at both boundaries.
    pub fn uniform(
        n_sites: usize,
        state: SiteState,
        config: ArenaConfig,
    ) -> Result<Self, EngineError> {
        let mut world = Self::new(n_sites, config)?;
        world.istate.fill(state);
        world.pstate.fill(state);
        Ok(world)
    }

    /// A world line from explicit parts.
    ///
    /// Checks the state arrays against `model` and every vertex bond
    /// against the bond table. Continuity is not checked; see
    /// [`is_continuous`](WorldLine::is_continuous).
    pub fn from_parts(
        model: &Model,
        vertices: &[Vertex],
        istate: Vec<SiteState>,
        pstate: Vec<SiteState>,
        config: ArenaConfig,
    ) -> Result<Self, EngineError> {
        for found in [istate.len(), pstate.len()] {
            if found != model.n_sites() {
                return Err(EngineError::SiteCountMismatch {
                    expected: model.n_sites(),
                    found,
                });
            }
        }
        if let Some(v) = vertices.iter().find(|v| v.bond.index() >= model.bonds().len()) {
            return Err(EngineError::UnknownBond { bond: v.bond });
        }
        let mut buffers = SequenceBuffers::new(config)?;
        buffers.load(vertices)?;
        Ok(Self {
            buffers,
            istate,
            pstate,
            clusters: None,
        })
    }

    /// Number of sites.
    pub fn n_sites(&self) -> usize {
        self.istate.len()
    }

    /// The active vertex sequence.
    pub fn sequence(&self) -> &[Vertex] {
        self.buffers.active()
    }

    /// In-place access to the active sequence. Drops the cluster state.
    pub fn sequence_mut(&mut self) -> &mut [Vertex] {
        self.clusters = None;
        self.buffers.active_mut()
    }

    /// The underlying double buffer.
    pub fn buffers(&self) -> &SequenceBuffers {
        &self.buffers
    }

    /// Which buffer (0 or 1) is active.
    pub fn active_index(&self) -> usize {
        self.buffers.active_index()
    }

    /// Site states at τ = 0.
    pub fn istate(&self) -> &[SiteState] {
        &self.istate
    }

    /// Site states at τ = 1.
    pub fn pstate(&self) -> &[SiteState] {
        &self.pstate
    }

    /// Set both boundary states of `site`. Drops the cluster state.
    pub fn set_site_state(&mut self, site: SiteId, state: SiteState) {
        self.clusters = None;
        self.istate[site.index()] = state;
        self.pstate[site.index()] = state;
    }

    /// Cluster partition of the current sequence, if built.
    pub fn clusters(&self) -> Option<&ClusterState> {
        self.clusters.as_ref()
    }

    /// Drop the cluster partition.
    pub fn invalidate_clusters(&mut self) {
        self.clusters = None;
    }

    /// Whether every site's states chain without a jump from `istate`
    /// through its vertices to `pstate`, and the sequence is strictly
    /// ordered by time.
    pub fn is_continuous(&self, model: &Model) -> bool {
        let seq = self.sequence();
        if seq.windows(2).any(|w| w[0].time >= w[1].time) {
            return false;
        }
        let mut current = self.istate.clone();
        for v in seq {
            let bond = model.bond(v.bond);
            for k in 0..bond.arity() {
                let s = bond.site(k).index();
                if v.incoming(k) != current[s] {
                    return false;
                }
                current[s] = v.outgoing(k);
            }
        }
        current == self.pstate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use worldline_core::{BondId, EventKind};
    use worldline_model::{BondType, ModelBuilder};

    fn two_site_model() -> Model {
        let mut b = ModelBuilder::new(2);
        let single = b.add_bond_type(BondType::new("pass", 1, EventKind::Neutral, 1.0));
        let pair = b.add_bond_type(BondType::new("contact", 2, EventKind::Infection, 1.0));
        b.add_bond(&[SiteId(0)], single);
        b.add_bond(&[SiteId(0), SiteId(1)], pair);
        b.build().unwrap()
    }

    #[test]
    fn layout_numbers_vertex_then_boundary_legs() {
        let model = two_site_model();
        let seq = [
            Vertex::diagonal(0.1, BondId(0), SiteState::Susceptible),
            Vertex::with_legs(0.2, BondId(1), [SiteState::Susceptible; 4]),
        ];
        let layout = LegLayout::new(&seq, &model);
        assert_eq!(layout.n_vertex_legs(), 6);
        assert_eq!(layout.n_legs(), 10);
        assert_eq!(layout.vertex_leg(0, LegSlot::Out0), Some(LegId(1)));
        assert_eq!(layout.vertex_leg(0, LegSlot::In1), None);
        assert_eq!(layout.vertex_leg(1, LegSlot::In0), Some(LegId(2)));
        assert_eq!(layout.vertex_leg(1, LegSlot::Out1), Some(LegId(5)));
        assert_eq!(layout.bottom(SiteId(1)), LegId(7));
        assert_eq!(layout.top(SiteId(0)), LegId(8));
    }

    #[test]
    fn from_parts_checks_site_count_and_bonds() {
        let model = two_site_model();
        let err = WorldLine::from_parts(
            &model,
            &[],
            vec![SiteState::Susceptible; 3],
            vec![SiteState::Susceptible; 2],
            ArenaConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::SiteCountMismatch { expected: 2, found: 3 }));

        let stray = [Vertex::diagonal(0.5, BondId(9), SiteState::Susceptible)];
        let err = WorldLine::from_parts(
            &model,
            &stray,
            vec![SiteState::Susceptible; 2],
            vec![SiteState::Susceptible; 2],
            ArenaConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::UnknownBond { bond: BondId(9) }));
    }

    #[test]
    fn continuity_follows_state_changes() {
        let model = two_site_model();
        let s = SiteState::Susceptible;
        let i = SiteState::Infected;
        // Site 1 infected by the contact at 0.2.
        let seq = [
            Vertex::diagonal(0.1, BondId(0), s),
            Vertex::with_legs(0.2, BondId(1), [s, s, s, i]),
        ];
        let world =
            WorldLine::from_parts(&model, &seq, vec![s, s], vec![s, i], ArenaConfig::default())
                .unwrap();
        assert!(world.is_continuous(&model));

        let broken =
            WorldLine::from_parts(&model, &seq, vec![s, s], vec![s, s], ArenaConfig::default())
                .unwrap();
        assert!(!broken.is_continuous(&model));
    }

    #[test]
    fn unordered_sequence_is_not_continuous() {
        let model = two_site_model();
        let s = SiteState::Susceptible;
        let seq = [
            Vertex::diagonal(0.5, BondId(0), s),
            Vertex::diagonal(0.5, BondId(0), s),
        ];
        let world =
            WorldLine::from_parts(&model, &seq, vec![s, s], vec![s, s], ArenaConfig::default())
                .unwrap();
        assert!(!world.is_continuous(&model));
    }

    #[test]
    fn sequence_mut_drops_clusters() {
        let model = two_site_model();
        let mut world = WorldLine::new(2, ArenaConfig::default()).unwrap();
        world.clusters = Some(ClusterState {
            layout: LegLayout::new(&[], &model),
            leg_cluster: vec![],
            ln_weights: vec![],
            touched: vec![false; 2],
        });
        let _ = world.sequence_mut();
        assert!(world.clusters().is_none());
    }
}
