//! Cluster builder: union-find over the leg arena.
//!
//! Legs are joined when they are connected by
//! - world-line continuity (an incoming leg and the previous leg on the
//!   same site, starting from the site's bottom boundary leg),
//! - a link rule of the vertex's bond type,
//! - the last leg on a site and the site's top boundary leg,
//! - and, for [`BoundaryPolicy::Periodic`], a site's top and bottom legs.

use smallvec::SmallVec;
use worldline_core::{ClusterId, LegId, LegSlot, SiteId};
use worldline_model::{BoundaryPolicy, Link, Model};

use crate::world::{ClusterState, LegLayout, WorldLine};

/// Counts produced by [`clustering`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClusterSummary {
    /// Number of clusters, boundary-only clusters included.
    pub clusters: usize,
    /// Number of clusters with weight zero.
    pub fixed: usize,
    /// Number of legs partitioned.
    pub legs: usize,
}

/// Disjoint-set forest with path halving and union by rank.
#[derive(Clone, Debug)]
pub(crate) struct UnionFind {
    parent: Vec<u32>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
            rank: vec![0; n],
        }
    }

    pub(crate) fn find(&mut self, mut i: u32) -> u32 {
        while self.parent[i as usize] != i {
            let grandparent = self.parent[self.parent[i as usize] as usize];
            self.parent[i as usize] = grandparent;
            i = grandparent;
        }
        i
    }

    /// Join the sets of `a` and `b`; `false` if they were already joined.
    pub(crate) fn union(&mut self, a: u32, b: u32) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        let (hi, lo) = if self.rank[ra as usize] >= self.rank[rb as usize] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[lo as usize] = hi;
        if self.rank[hi as usize] == self.rank[lo as usize] {
            self.rank[hi as usize] += 1;
        }
        true
    }
}

/// Partition every leg of the active sequence into clusters, store the
/// result in `world`, and return a summary.
///
/// Cluster ids are dense and numbered in order of first appearance in
/// the leg arena. A cluster's weight is the product of the bond-type
/// weights of every vertex with at least one leg in it (1 for a
/// cluster made of boundary legs only). It is kept as a sum of logs so
/// long clusters neither overflow nor underflow.
pub fn clustering(
    world: &mut WorldLine,
    model: &Model,
    boundary: BoundaryPolicy,
) -> ClusterSummary {
    let seq = world.buffers.active();
    let layout = LegLayout::new(seq, model);
    let n_sites = model.n_sites();
    let mut uf = UnionFind::new(layout.n_legs());

    let mut last_touched: Vec<LegId> =
        (0..n_sites).map(|s| layout.bottom(SiteId(s as u32))).collect();
    let mut touched = vec![false; n_sites];

    for (i, v) in seq.iter().enumerate() {
        let bond = model.bond(v.bond);
        for k in 0..bond.arity() {
            let site = bond.site(k).index();
            if let Some(leg) = layout.vertex_leg(i, LegSlot::incoming(k)) {
                uf.union(leg.0, last_touched[site].0);
            }
        }
        for &Link(a, b) in model.links(v.bond) {
            if let (Some(la), Some(lb)) = (layout.vertex_leg(i, a), layout.vertex_leg(i, b)) {
                uf.union(la.0, lb.0);
            }
        }
        for k in 0..bond.arity() {
            let site = bond.site(k).index();
            if let Some(leg) = layout.vertex_leg(i, LegSlot::outgoing(k)) {
                last_touched[site] = leg;
            }
            touched[site] = true;
        }
    }
    for s in 0..n_sites {
        let site = SiteId(s as u32);
        uf.union(layout.top(site).0, last_touched[s].0);
        if boundary.closes_world_lines() {
            uf.union(layout.top(site).0, layout.bottom(site).0);
        }
    }

    // Dense renumbering in first-seen order.
    let n_legs = layout.n_legs();
    let mut root_id = vec![u32::MAX; n_legs];
    let mut leg_cluster = Vec::with_capacity(n_legs);
    let mut n_clusters = 0u32;
    for leg in 0..n_legs as u32 {
        let root = uf.find(leg) as usize;
        if root_id[root] == u32::MAX {
            root_id[root] = n_clusters;
            n_clusters += 1;
        }
        leg_cluster.push(ClusterId(root_id[root]));
    }

    let mut ln_weights = vec![0.0; n_clusters as usize];
    for (i, v) in seq.iter().enumerate() {
        let mut seen: SmallVec<[ClusterId; 4]> = SmallVec::new();
        for slot in LegSlot::ALL {
            if let Some(leg) = layout.vertex_leg(i, slot) {
                let c = leg_cluster[leg.index()];
                if !seen.contains(&c) {
                    seen.push(c);
                }
            }
        }
        // ln 0 = -inf, and -inf absorbs every finite term.
        let ln_w = model.weight(v.bond).ln();
        for c in seen {
            ln_weights[c.index()] += ln_w;
        }
    }

    let summary = ClusterSummary {
        clusters: ln_weights.len(),
        fixed: ln_weights.iter().filter(|&&w| w == f64::NEG_INFINITY).count(),
        legs: n_legs,
    };
    world.clusters = Some(ClusterState {
        layout,
        leg_cluster,
        ln_weights,
        touched,
    });
    summary
}
