//! Open and periodic boundaries differ only in the top/bottom join.

use worldline_arena::ArenaConfig;
use worldline_core::{BondId, SiteState, Vertex};
use worldline_engine::{clustering, flip_cluster, WorldLine};
use worldline_model::BoundaryPolicy;
use worldline_test_utils::{chain_model, seeded_rng};

fn cut_world(cut: BondId) -> (WorldLine, worldline_model::Model) {
    let f = chain_model(1, 1.0, 0.0, 1.0);
    let s = SiteState::Susceptible;
    let seq = [Vertex::diagonal(0.5, cut, s)];
    let world = WorldLine::from_parts(&f.model, &seq, vec![s], vec![s], ArenaConfig::default())
        .unwrap();
    (world, f.model)
}

#[test]
fn open_boundary_lets_the_ends_differ() {
    let cut = chain_model(1, 1.0, 0.0, 1.0).cut[0];
    let (mut world, model) = cut_world(cut);
    let summary = clustering(&mut world, &model, BoundaryPolicy::Open);
    assert_eq!(summary.clusters, 2);

    let mut rng = seeded_rng(2);
    let mut differed = false;
    for _ in 0..200 {
        clustering(&mut world, &model, BoundaryPolicy::Open);
        flip_cluster(&mut world, &mut rng).unwrap();
        assert!(world.is_continuous(&model));
        differed |= world.istate() != world.pstate();
    }
    assert!(differed);
}

#[test]
fn periodic_boundary_keeps_the_ends_equal() {
    let cut = chain_model(1, 1.0, 0.0, 1.0).cut[0];
    let (mut world, model) = cut_world(cut);
    let summary = clustering(&mut world, &model, BoundaryPolicy::Periodic);
    assert_eq!(summary.clusters, 1);

    let mut rng = seeded_rng(2);
    for _ in 0..200 {
        clustering(&mut world, &model, BoundaryPolicy::Periodic);
        flip_cluster(&mut world, &mut rng).unwrap();
        assert!(world.is_continuous(&model));
        assert_eq!(world.istate(), world.pstate());
    }
}

#[test]
fn untouched_sites_redraw_independently() {
    let f = chain_model(2, 1.0, 0.0, 1.0);
    let mut world = WorldLine::new(2, ArenaConfig::default()).unwrap();
    let mut rng = seeded_rng(9);
    let mut infected = 0;
    let trials = 4000;
    for _ in 0..trials {
        clustering(&mut world, &f.model, BoundaryPolicy::Open);
        let summary = flip_cluster(&mut world, &mut rng).unwrap();
        assert_eq!(summary.redrawn, 2);
        assert_eq!(world.istate(), world.pstate());
        infected += world.istate().iter().filter(|s| s.is_infected()).count();
    }
    let fraction = infected as f64 / (2 * trials) as f64;
    assert!((fraction - 0.5).abs() < 0.03, "infected fraction {fraction}");
}
