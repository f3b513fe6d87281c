//! Vertex pruners.
//!
//! Both pruners copy the retained vertices, in order, into the staging
//! buffer, count each retained vertex by its bond type's event kind,
//! and publish. They differ only in which diagonal vertices survive.

use worldline_core::{EventCounters, LegSlot, Vertex};
use worldline_model::Model;

use crate::error::EngineError;
use crate::world::{ClusterState, WorldLine};

fn rebuild_retaining<F>(
    world: &mut WorldLine,
    model: &Model,
    counters: &mut EventCounters,
    mut keep: F,
) -> Result<usize, EngineError>
where
    F: FnMut(usize, &Vertex) -> bool,
{
    let before = world.buffers.len();
    let mut guard = world.buffers.begin_rebuild(before)?;
    let source = guard.source();
    for (i, v) in source.iter().enumerate() {
        if keep(i, v) {
            counters.record(model.event_kind(v.bond));
            guard.push(*v)?;
        }
    }
    let kept = guard.len();
    world.buffers.publish()?;
    world.clusters = None;
    Ok(before - kept)
}

/// Remove every diagonal vertex and return how many were removed.
///
/// Retained vertices are counted into `counters`. The cluster state is
/// dropped.
pub fn remove_vertices(
    world: &mut WorldLine,
    model: &Model,
    counters: &mut EventCounters,
) -> Result<usize, EngineError> {
    rebuild_retaining(world, model, counters, |_, v| !v.is_diagonal(model.arity(v.bond)))
}

/// Whether any leg of vertex `i` sits in a cluster that can still flip.
fn touches_live_cluster(clusters: &ClusterState, i: usize) -> bool {
    LegSlot::ALL.iter().any(|&slot| {
        clusters
            .layout()
            .vertex_leg(i, slot)
            .is_some_and(|leg| !clusters.is_fixed(clusters.cluster_of(leg)))
    })
}

/// Remove diagonal vertices whose legs all sit in fixed (zero-weight)
/// clusters and return how many were removed.
///
/// Vertices that change state, or that touch a cluster of non-zero
/// weight, are kept and counted into `counters`.
///
/// # Errors
///
/// [`EngineError::ClustersMissing`] if [`clustering`](crate::clustering)
/// has not run on the current sequence. The sequence is left untouched.
pub fn remove_only_fixed_vertices(
    world: &mut WorldLine,
    model: &Model,
    counters: &mut EventCounters,
) -> Result<usize, EngineError> {
    let clusters = world.clusters.take().ok_or(EngineError::ClustersMissing)?;
    debug_assert_eq!(clusters.layout().n_vertices(), world.buffers.len());
    rebuild_retaining(world, model, counters, |i, v| {
        !v.is_diagonal(model.arity(v.bond)) || touches_live_cluster(&clusters, i)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use worldline_arena::ArenaConfig;
    use worldline_core::{BondId, EventKind, SiteId, SiteState};
    use worldline_model::{BondType, BoundaryPolicy, ModelBuilder};

    const S: SiteState = SiteState::Susceptible;
    const I: SiteState = SiteState::Infected;

    /// Bond 0: frozen diagonal (weight 0). Bond 1: live diagonal.
    /// Bond 2: recovery. Bond 3: infection.
    fn model() -> Model {
        let mut b = ModelBuilder::new(1);
        let frozen = b.add_bond_type(
            BondType::new("frozen", 1, EventKind::Neutral, 0.0).link(LegSlot::In0, LegSlot::Out0),
        );
        let live = b.add_bond_type(
            BondType::new("live", 1, EventKind::Neutral, 1.0).link(LegSlot::In0, LegSlot::Out0),
        );
        let recover = b.add_bond_type(BondType::new("recover", 1, EventKind::Recovery, 1.0));
        let infect = b.add_bond_type(BondType::new("infect", 1, EventKind::Infection, 1.0));
        b.add_bond(&[SiteId(0)], frozen);
        b.add_bond(&[SiteId(0)], live);
        b.add_bond(&[SiteId(0)], recover);
        b.add_bond(&[SiteId(0)], infect);
        b.build().unwrap()
    }

    fn world(m: &Model, seq: &[Vertex], i: SiteState, p: SiteState) -> WorldLine {
        WorldLine::from_parts(m, seq, vec![i], vec![p], ArenaConfig::default()).unwrap()
    }

    #[test]
    fn standard_prune_keeps_only_state_changes() {
        let m = model();
        let seq = [
            Vertex::diagonal(0.1, BondId(1), I),
            Vertex::with_legs(0.2, BondId(2), [I, S, S, S]),
            Vertex::diagonal(0.3, BondId(0), S),
            Vertex::with_legs(0.4, BondId(3), [S, S, I, S]),
        ];
        let mut w = world(&m, &seq, I, I);
        let mut counters = EventCounters::new();
        let removed = remove_vertices(&mut w, &m, &mut counters).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(w.sequence(), &[seq[1], seq[3]]);
        assert_eq!(counters.recoveries, 1);
        assert_eq!(counters.infections, 1);
        assert!(w.is_continuous(&m));
    }

    #[test]
    fn counters_accumulate_across_calls() {
        let m = model();
        let seq = [Vertex::with_legs(0.5, BondId(2), [I, S, S, S])];
        let mut counters = EventCounters::new();
        for _ in 0..3 {
            let mut w = world(&m, &seq, I, S);
            remove_vertices(&mut w, &m, &mut counters).unwrap();
        }
        assert_eq!(counters.recoveries, 3);
    }

    #[test]
    fn fixed_only_requires_clusters() {
        let m = model();
        let seq = [Vertex::diagonal(0.5, BondId(0), S)];
        let mut w = world(&m, &seq, S, S);
        let mut counters = EventCounters::new();
        let err = remove_only_fixed_vertices(&mut w, &m, &mut counters).unwrap_err();
        assert!(matches!(err, EngineError::ClustersMissing));
        assert_eq!(w.sequence(), &seq);
    }

    #[test]
    fn fixed_only_drops_frozen_diagonals_and_keeps_live_ones() {
        let m = model();
        let seq = [
            Vertex::diagonal(0.2, BondId(0), S),
            Vertex::diagonal(0.6, BondId(1), S),
        ];
        let mut w = world(&m, &seq, S, S);
        crate::clustering(&mut w, &m, BoundaryPolicy::Periodic);
        let mut counters = EventCounters::new();
        // The whole line is one cluster containing the frozen vertex.
        let removed = remove_only_fixed_vertices(&mut w, &m, &mut counters).unwrap();
        assert_eq!(removed, 2);

        let bond1_only = [Vertex::diagonal(0.6, BondId(1), S)];
        let mut w = world(&m, &bond1_only, S, S);
        crate::clustering(&mut w, &m, BoundaryPolicy::Periodic);
        let removed = remove_only_fixed_vertices(&mut w, &m, &mut counters).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(w.sequence(), &bond1_only);
        assert!(w.clusters().is_none());
    }

    #[test]
    fn fixed_only_keeps_at_least_what_standard_keeps() {
        let m = model();
        let seq = [
            Vertex::diagonal(0.1, BondId(0), I),
            Vertex::with_legs(0.2, BondId(2), [I, S, S, S]),
            Vertex::diagonal(0.3, BondId(1), S),
        ];
        let mut a = world(&m, &seq, I, S);
        let mut b = a.clone();
        let mut counters = EventCounters::new();
        remove_vertices(&mut a, &m, &mut counters).unwrap();
        crate::clustering(&mut b, &m, BoundaryPolicy::Open);
        remove_only_fixed_vertices(&mut b, &m, &mut counters).unwrap();
        assert!(b.sequence().len() >= a.sequence().len());
        assert!(b.sequence().contains(&seq[1]));
        assert!(b.sequence().contains(&seq[2]));
    }
}
