//! Cluster flip: one heat-bath decision per cluster.

use worldline_core::{LegSlot, SiteId, SiteState};

use crate::error::EngineError;
use crate::rng::RandomSource;
use crate::world::WorldLine;

/// Counts produced by [`flip_cluster`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlipSummary {
    /// Clusters whose legs were inverted.
    pub flipped: usize,
    /// Sites without vertices that drew a fresh state.
    pub redrawn: usize,
}

/// Probability of flipping a cluster of weight `w = exp(ln_w)`:
/// `w / (1 + w)`, evaluated as a logistic function of `ln_w` so it stays
/// in `[0, 1]` for any log weight.
///
/// `ln_w = -inf` (a fixed cluster) gives 0, and `ln_w = 0` gives ½.
#[inline]
pub fn flip_probability(ln_w: f64) -> f64 {
    if ln_w >= 0.0 {
        1.0 / (1.0 + (-ln_w).exp())
    } else {
        let w = ln_w.exp();
        w / (1.0 + w)
    }
}

/// Flip every cluster with probability [`flip_probability`] of its log
/// weight and propagate the result to the boundary states.
///
/// Decisions are drawn in ascending cluster id order, then untouched
/// sites are redrawn in site order: each becomes infected with
/// probability ½, with `istate = pstate`. A touched site takes its new
/// `istate` from the decision of its bottom leg's cluster and its new
/// `pstate` from its top leg's. The cluster state is kept.
///
/// # Errors
///
/// [`EngineError::ClustersMissing`] if [`clustering`](crate::clustering)
/// has not run on the current sequence.
pub fn flip_cluster<R: RandomSource + ?Sized>(
    world: &mut WorldLine,
    rng: &mut R,
) -> Result<FlipSummary, EngineError> {
    let clusters = world.clusters.as_ref().ok_or(EngineError::ClustersMissing)?;
    let layout = clusters.layout();

    let decisions: Vec<bool> = clusters
        .ln_weights()
        .iter()
        .map(|&ln_w| rng.bernoulli(flip_probability(ln_w)))
        .collect();
    let flipped = decisions.iter().filter(|&&d| d).count();

    let seq = world.buffers.active_mut();
    debug_assert_eq!(layout.n_vertices(), seq.len());
    for (i, v) in seq.iter_mut().enumerate() {
        for slot in LegSlot::ALL {
            if let Some(leg) = layout.vertex_leg(i, slot) {
                if decisions[clusters.cluster_of(leg).index()] {
                    v.legs[slot.index()] = v.legs[slot.index()].flipped();
                }
            }
        }
    }

    let mut redrawn = 0;
    for s in 0..world.istate.len() {
        let site = SiteId(s as u32);
        if clusters.is_touched(site) {
            if decisions[clusters.cluster_of(layout.bottom(site)).index()] {
                world.istate[s] = world.istate[s].flipped();
            }
            if decisions[clusters.cluster_of(layout.top(site)).index()] {
                world.pstate[s] = world.pstate[s].flipped();
            }
        } else {
            let state = if rng.bernoulli(0.5) {
                SiteState::Infected
            } else {
                SiteState::Susceptible
            };
            world.istate[s] = state;
            world.pstate[s] = state;
            redrawn += 1;
        }
    }

    Ok(FlipSummary { flipped, redrawn })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use worldline_arena::ArenaConfig;
    use worldline_core::{BondId, EventKind, Vertex};
    use worldline_model::{BondType, BoundaryPolicy, Model, ModelBuilder};

    use crate::clustering;
    use crate::rng::scripted::Scripted;

    const S: SiteState = SiteState::Susceptible;
    const I: SiteState = SiteState::Infected;

    /// Bond 0: cut on site 0 (weight 1). Bond 1: frozen pass on site 0.
    fn model() -> Model {
        let mut b = ModelBuilder::new(2);
        let cut = b.add_bond_type(BondType::new("cut", 1, EventKind::Neutral, 1.0));
        let frozen = b.add_bond_type(
            BondType::new("frozen", 1, EventKind::Neutral, 0.0).link(LegSlot::In0, LegSlot::Out0),
        );
        b.add_bond(&[SiteId(0)], cut);
        b.add_bond(&[SiteId(0)], frozen);
        b.build().unwrap()
    }

    #[test]
    fn heat_bath_rule() {
        assert_eq!(flip_probability(f64::NEG_INFINITY), 0.0);
        assert_eq!(flip_probability(0.0), 0.5);
        assert!((flip_probability(3f64.ln()) - 0.75).abs() < 1e-12);
        assert!((flip_probability(-(3f64.ln())) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn extreme_log_weights_stay_in_range() {
        assert_eq!(flip_probability(1100.0 * 2f64.ln()), 1.0);
        assert_eq!(flip_probability(f64::INFINITY), 1.0);
        let tiny = flip_probability(-1100.0 * 2f64.ln());
        assert!((0.0..1e-300).contains(&tiny));
        assert!(!flip_probability(1e6).is_nan());
    }

    #[test]
    fn flip_requires_clusters() {
        let mut w = WorldLine::new(1, ArenaConfig::default()).unwrap();
        let mut rng = Scripted::new(&[0.0]);
        assert!(matches!(flip_cluster(&mut w, &mut rng), Err(EngineError::ClustersMissing)));
    }

    #[test]
    fn flips_follow_decisions_and_update_boundaries() {
        let m = model();
        let seq = [Vertex::diagonal(0.5, BondId(0), S)];
        let mut w = WorldLine::from_parts(&m, &seq, vec![S, S], vec![S, S], ArenaConfig::default())
            .unwrap();
        clustering(&mut w, &m, BoundaryPolicy::Open);
        // Clusters: 0 = {In0, bottom0}, 1 = {Out0, top0}, 2 = site 1.
        // Draws: flip 0, keep 1, keep 2, then site 1 redraws infected.
        let mut rng = Scripted::new(&[0.1, 0.9, 0.9, 0.2]);
        let summary = flip_cluster(&mut w, &mut rng).unwrap();
        assert_eq!(summary, FlipSummary { flipped: 1, redrawn: 1 });
        assert_eq!(w.sequence()[0].legs, [I, S, S, S]);
        assert_eq!(w.istate(), &[I, I]);
        assert_eq!(w.pstate(), &[S, I]);
        assert!(w.is_continuous(&m));
        assert!(w.clusters().is_some());
    }

    #[test]
    fn fixed_cluster_never_flips() {
        let m = model();
        let seq = [Vertex::diagonal(0.5, BondId(1), I)];
        let mut w = WorldLine::from_parts(&m, &seq, vec![I, S], vec![I, S], ArenaConfig::default())
            .unwrap();
        clustering(&mut w, &m, BoundaryPolicy::Periodic);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..200 {
            flip_cluster(&mut w, &mut rng).unwrap();
            assert_eq!(w.sequence()[0].legs[0], I);
            assert_eq!(w.istate()[0], I);
        }
    }

    #[test]
    fn flips_preserve_continuity() {
        let m = model();
        let seq = [
            Vertex::diagonal(0.2, BondId(0), S),
            Vertex::diagonal(0.4, BondId(0), S),
            Vertex::diagonal(0.8, BondId(0), S),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        for boundary in [BoundaryPolicy::Open, BoundaryPolicy::Periodic] {
            let mut w =
                WorldLine::from_parts(&m, &seq, vec![S, S], vec![S, S], ArenaConfig::default())
                    .unwrap();
            for _ in 0..50 {
                clustering(&mut w, &m, boundary);
                flip_cluster(&mut w, &mut rng).unwrap();
                assert!(w.is_continuous(&m));
                if boundary == BoundaryPolicy::Periodic {
                    assert_eq!(w.istate(), w.pstate());
                }
            }
        }
    }
}
