//! Reusable model and sequence fixtures.
//!
//! - [`two_site_model`]: two sites joined by one fully linked contact bond.
//! - [`chain_model`]: an open chain with swappable pass/cut bonds per
//!   site and a contact bond between neighbours.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use worldline_core::{BondId, EventKind, LegSlot, SiteId, SiteState, Vertex};
use worldline_model::{BondType, Model, ModelBuilder, SwapClass};

/// A deterministic RNG for tests.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

fn contact_type(weight: f64) -> BondType {
    BondType::new("contact", 2, EventKind::Infection, weight)
        .link(LegSlot::In0, LegSlot::Out0)
        .link(LegSlot::In1, LegSlot::Out1)
        .link(LegSlot::In0, LegSlot::In1)
}

fn pass_type() -> BondType {
    BondType::new("pass", 1, EventKind::Neutral, 1.0).link(LegSlot::In0, LegSlot::Out0)
}

/// A two-site model and its bonds.
pub struct TwoSiteFixture {
    pub model: Model,
    /// The contact bond between site 0 and site 1.
    pub contact: BondId,
    /// Per-site insertion bonds.
    pub pass: [BondId; 2],
}

/// Two sites at β = 1 with one contact bond of weight 1 linking all
/// four legs, and pass bonds inserted with `insertion_weight`.
pub fn two_site_model(insertion_weight: f64) -> TwoSiteFixture {
    let mut b = ModelBuilder::new(2);
    b.beta(1.0);
    let contact_t = b.add_bond_type(contact_type(1.0));
    let pass_t = b.add_bond_type(pass_type());
    let contact = b.add_bond(&[SiteId(0), SiteId(1)], contact_t);
    let pass = [
        b.add_bond(&[SiteId(0)], pass_t),
        b.add_bond(&[SiteId(1)], pass_t),
    ];
    for (s, &bond) in pass.iter().enumerate() {
        b.insertion(SiteId(s as u32), insertion_weight, bond);
    }
    TwoSiteFixture {
        model: b.build().expect("two-site fixture is valid"),
        contact,
        pass,
    }
}

/// One diagonal vertex on `contact` at τ = ½ with every leg in `state`.
pub fn contact_seed(contact: BondId, state: SiteState) -> Vec<Vertex> {
    vec![Vertex::with_legs(0.5, contact, [state; 4])]
}

/// An open chain and its bonds.
pub struct ChainFixture {
    pub model: Model,
    /// Per-site pass bond (the insertion bond).
    pub pass: Vec<BondId>,
    /// Per-site cut bond, swap partner of `pass`.
    pub cut: Vec<BondId>,
    /// Contact bond between site `i` and `i + 1`.
    pub contact: Vec<BondId>,
}

/// An `n`-site chain at the given β.
///
/// Each site has a pass bond (weight 1, linked through) used for
/// insertion with weight `insertion_weight`, and a cut bond of the same
/// weight with no links; the two form a swap pair. Neighbouring sites
/// share a contact bond of weight `contact_weight`.
pub fn chain_model(
    n: usize,
    beta: f64,
    insertion_weight: f64,
    contact_weight: f64,
) -> ChainFixture {
    let mut b = ModelBuilder::new(n);
    b.beta(beta);
    let pass_t = b.add_bond_type(pass_type());
    let cut_t = b.add_bond_type(BondType::new("cut", 1, EventKind::Recovery, 1.0));
    let contact_t = b.add_bond_type(contact_type(contact_weight));

    let mut pass = Vec::with_capacity(n);
    let mut cut = Vec::with_capacity(n);
    for s in 0..n {
        let site = SiteId(s as u32);
        let p = b.add_bond(&[site], pass_t);
        let c = b.add_bond(&[site], cut_t);
        b.insertion(site, insertion_weight, p);
        b.add_swap_class(SwapClass::Pair(p, c));
        pass.push(p);
        cut.push(c);
    }
    let contact = (1..n)
        .map(|s| b.add_bond(&[SiteId(s as u32 - 1), SiteId(s as u32)], contact_t))
        .collect();
    ChainFixture {
        model: b.build().expect("chain fixture is valid"),
        pass,
        cut,
        contact,
    }
}
