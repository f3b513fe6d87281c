//! Diagonal update: stochastic insertion of diagonal vertices.

use worldline_arena::ArenaError;
use worldline_core::{BondId, SiteId, SiteState, Vertex};
use worldline_model::Model;

use crate::error::EngineError;
use crate::rng::RandomSource;
use crate::world::WorldLine;

/// An accepted insertion, not yet merged.
#[derive(Clone, Copy, Debug)]
struct Accepted {
    time: f64,
    bond: BondId,
    state: SiteState,
}

/// `(time, state after)` for every vertex leg pair on each site, in
/// sequence order.
fn site_timelines(sequence: &[Vertex], model: &Model) -> Vec<Vec<(f64, SiteState)>> {
    let mut lines = vec![Vec::new(); model.n_sites()];
    for v in sequence {
        let bond = model.bond(v.bond);
        for k in 0..bond.arity() {
            lines[bond.site(k).index()].push((v.time, v.outgoing(k)));
        }
    }
    lines
}

/// State of a site at `time`; a vertex at exactly `time` counts as
/// already passed.
fn state_at(line: &[(f64, SiteState)], initial: SiteState, time: f64) -> SiteState {
    match line.partition_point(|&(t, _)| t <= time) {
        0 => initial,
        n => line[n - 1].1,
    }
}

/// Insert diagonal vertices on every site with a non-zero insertion
/// rate and return how many were inserted.
///
/// Candidates on site `s` form a Poisson process of rate
/// `site_weight(s) * beta` over `[0, 1)`, drawn site by site. Each is
/// accepted with `model.insertion_acceptance(s, state)`, where `state`
/// is the site's world-line state at the candidate time, and becomes a
/// diagonal vertex on `model.insertion_bond(s)`. Accepted vertices are
/// merged into the sequence by time through a rebuild; the cluster
/// state is dropped.
///
/// # Errors
///
/// - [`EngineError::InvalidRate`] if `site_weight * beta` overflows.
/// - [`EngineError::Arena`] as soon as the accepted vertices would take
///   the sequence past `max_vertices`, or if the staging buffer cannot
///   be reserved. Both are fatal.
///
/// On error the sequence is left as it was.
pub fn insert_vertices<R: RandomSource + ?Sized>(
    world: &mut WorldLine,
    model: &Model,
    rng: &mut R,
) -> Result<usize, EngineError> {
    let max = world.buffers.config().max_vertices;
    let existing = world.buffers.len();
    let timelines = site_timelines(world.buffers.active(), model);

    let mut accepted: Vec<Accepted> = Vec::new();
    for (s, line) in timelines.iter().enumerate() {
        let site = SiteId(s as u32);
        let Some(bond) = model.insertion_bond(site) else {
            continue;
        };
        let rate = model.site_weight(site) * model.beta();
        if !rate.is_finite() {
            return Err(EngineError::InvalidRate { site, rate });
        }
        if rate <= 0.0 {
            continue;
        }
        let mut t = 0.0;
        loop {
            t += -(1.0 - rng.uniform()).ln() / rate;
            if t >= 1.0 {
                break;
            }
            let state = state_at(line, world.istate[s], t);
            if !rng.bernoulli(model.insertion_acceptance(site, state)) {
                continue;
            }
            if existing + accepted.len() >= max {
                return Err(ArenaError::CapacityExceeded {
                    requested: existing + accepted.len() + 1,
                    capacity: max,
                }
                .into());
            }
            accepted.push(Accepted { time: t, bond, state });
        }
    }
    accepted.sort_by(|a, b| a.time.total_cmp(&b.time));

    let mut guard = world.buffers.begin_rebuild(existing + accepted.len())?;
    let source = guard.source();
    let mut next = 0;
    for a in &accepted {
        while next < source.len() && source[next].time <= a.time {
            guard.push(source[next])?;
            next += 1;
        }
        guard.push(Vertex::diagonal(a.time, a.bond, a.state))?;
    }
    for &v in &source[next..] {
        guard.push(v)?;
    }

    world.buffers.publish()?;
    world.clusters = None;
    Ok(accepted.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use worldline_arena::ArenaConfig;
    use worldline_core::{BondId, EventKind, LegSlot, SiteState};
    use worldline_model::{BondType, ModelBuilder};

    use crate::rng::scripted::Scripted;

    fn model(weight: f64, beta: f64, acceptance: (f64, f64)) -> Model {
        let mut b = ModelBuilder::new(2);
        b.beta(beta);
        let diag = b.add_bond_type(
            BondType::new("diag", 1, EventKind::Neutral, 1.0)
                .link(LegSlot::In0, LegSlot::Out0)
                .acceptance(acceptance.0, acceptance.1),
        );
        let flip = b.add_bond_type(BondType::new("recover", 1, EventKind::Recovery, 0.0));
        let d0 = b.add_bond(&[SiteId(0)], diag);
        let d1 = b.add_bond(&[SiteId(1)], diag);
        b.add_bond(&[SiteId(0)], flip);
        b.insertion(SiteId(0), weight, d0);
        b.insertion(SiteId(1), weight, d1);
        b.build().unwrap()
    }

    #[test]
    fn zero_rate_leaves_sequence_unchanged() {
        let m = model(0.0, 1.0, (1.0, 1.0));
        let seed = [Vertex::diagonal(0.3, BondId(0), SiteState::Susceptible)];
        let s = vec![SiteState::Susceptible; 2];
        let mut world =
            WorldLine::from_parts(&m, &seed, s.clone(), s, ArenaConfig::default()).unwrap();
        let mut rng = Scripted::new(&[0.5]);
        assert_eq!(insert_vertices(&mut world, &m, &mut rng).unwrap(), 0);
        assert_eq!(world.sequence(), &seed);
        assert_eq!(rng.consumed(), 0);
    }

    #[test]
    fn scripted_gaps_place_vertices() {
        // Rate 1 on each site, gap -ln(1-u), each candidate followed by
        // its acceptance draw: site 0 lands at ln 2 and site 1 at
        // -ln 0.8; 0.9 ends each site's process.
        let m = model(1.0, 1.0, (1.0, 1.0));
        let mut world = WorldLine::new(2, ArenaConfig::default()).unwrap();
        let mut rng = Scripted::new(&[0.5, 0.0, 0.9, 0.2, 0.0, 0.9]);
        let n = insert_vertices(&mut world, &m, &mut rng).unwrap();
        assert_eq!(n, 2);
        assert_eq!(rng.consumed(), 6);
        let seq = world.sequence();
        assert_eq!(seq[0].bond, BondId(1));
        assert!((seq[0].time - -(0.8f64).ln()).abs() < 1e-12);
        assert_eq!(seq[1].bond, BondId(0));
        assert!((seq[1].time - std::f64::consts::LN_2).abs() < 1e-12);
        assert!(world.is_continuous(&m));
    }

    #[test]
    fn acceptance_uses_state_at_candidate_time() {
        // Only infected instants accept.
        let m = model(5.0, 1.0, (0.0, 1.0));
        let i = SiteState::Infected;
        let s = SiteState::Susceptible;
        // Site 0 recovers at 0.5.
        let seed = [Vertex::with_legs(0.5, BondId(2), [i, s, s, s])];
        let mut world =
            WorldLine::from_parts(&m, &seed, vec![i, s], vec![s, s], ArenaConfig::default())
                .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        insert_vertices(&mut world, &m, &mut rng).unwrap();
        for v in world.sequence() {
            if v.bond == BondId(0) {
                assert!(v.time < 0.5);
                assert_eq!(v.leg(LegSlot::In0), i);
            }
            assert_ne!(v.bond, BondId(1));
        }
        assert!(world.is_continuous(&m));
    }

    #[test]
    fn insertion_count_tracks_rate() {
        let m = model(2.0, 3.0, (1.0, 1.0));
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let trials = 400;
        let mut total = 0;
        for _ in 0..trials {
            let mut world = WorldLine::new(2, ArenaConfig::default()).unwrap();
            total += insert_vertices(&mut world, &m, &mut rng).unwrap();
        }
        // Expected 2 sites * rate 6 per sweep.
        let mean = total as f64 / trials as f64;
        assert!((mean - 12.0).abs() < 1.0, "mean insertions {mean}");
    }

    #[test]
    fn insertion_past_cap_is_fatal() {
        let m = model(50.0, 1.0, (1.0, 1.0));
        let mut world = WorldLine::new(2, ArenaConfig::with_max_vertices(4)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let err = insert_vertices(&mut world, &m, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Arena(ArenaError::CapacityExceeded { requested: 5, capacity: 4 })
        ));
        assert!(world.sequence().is_empty());
    }

    #[test]
    fn rejected_candidates_do_not_count_against_cap() {
        // Rate 100 per site, but susceptible sites never accept.
        let m = model(100.0, 1.0, (0.0, 1.0));
        let mut world = WorldLine::new(2, ArenaConfig::with_max_vertices(4)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(insert_vertices(&mut world, &m, &mut rng).unwrap(), 0);
    }

    #[test]
    fn overflowing_rate_is_rejected() {
        let m = model(1e200, 1e200, (1.0, 1.0));
        let mut world = WorldLine::new(2, ArenaConfig::default()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let err = insert_vertices(&mut world, &m, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidRate { site: SiteId(0), rate } if rate.is_infinite()
        ));
        assert!(world.sequence().is_empty());
    }

    #[test]
    fn insertion_publishes_and_drops_clusters() {
        let m = model(1.0, 1.0, (1.0, 1.0));
        let mut world = WorldLine::new(2, ArenaConfig::default()).unwrap();
        crate::clustering(&mut world, &m, worldline_model::BoundaryPolicy::Open);
        let before = world.active_index();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        insert_vertices(&mut world, &m, &mut rng).unwrap();
        assert_ne!(world.active_index(), before);
        assert!(world.clusters().is_none());
    }
}
