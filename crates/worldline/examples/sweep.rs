//! Run a chain of sites through a few hundred sweeps and print the
//! cluster statistics.
//!
//! ```text
//! cargo run -p worldline --example sweep -- [sites] [sweeps] [stats-file]
//! ```

use std::error::Error;

use worldline::prelude::*;

fn chain(n: usize, beta: f64) -> Result<Model, ModelError> {
    let mut b = ModelBuilder::new(n);
    b.beta(beta);
    let pass = b.add_bond_type(
        BondType::new("pass", 1, EventKind::Neutral, 1.0).link(LegSlot::In0, LegSlot::Out0),
    );
    let cut = b.add_bond_type(BondType::new("recovery", 1, EventKind::Recovery, 1.0));
    let contact = b.add_bond_type(
        BondType::new("contact", 2, EventKind::Infection, 0.5)
            .link(LegSlot::In0, LegSlot::Out0)
            .link(LegSlot::In1, LegSlot::Out1)
            .link(LegSlot::In0, LegSlot::In1),
    );
    for s in 0..n {
        let site = SiteId(s as u32);
        let p = b.add_bond(&[site], pass);
        let c = b.add_bond(&[site], cut);
        b.insertion(site, 1.0, p);
        b.add_swap_class(SwapClass::Pair(p, c));
    }
    for s in 1..n {
        b.add_bond(&[SiteId(s as u32 - 1), SiteId(s as u32)], contact);
    }
    b.build()
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let sites: usize = args.next().map(|a| a.parse()).transpose()?.unwrap_or(32);
    let sweeps: usize = args.next().map(|a| a.parse()).transpose()?.unwrap_or(500);
    let stats_path = args.next();

    let model = chain(sites, 4.0)?;
    let config = SweepConfig::new(BoundaryPolicy::Periodic).with_seed(2024);
    let mut engine = SweepEngine::new(model, config)?;

    let mut writer = match &stats_path {
        Some(path) => Some(StatsWriter::append_to(path)?),
        None => None,
    };
    let mut last = None;
    for _ in 0..sweeps {
        let report = match writer.as_mut() {
            Some(w) => engine.sweep_into(w)?,
            None => engine.sweep()?,
        };
        last = Some(report);
    }

    if let Some(report) = last {
        let m = &report.metrics;
        println!(
            "last sweep: {} vertices, {} clusters, {} flipped, {}us",
            m.vertices, report.clusters.clusters, report.flips.flipped, m.total_us
        );
    }
    println!("{}", engine.statistics().summary());
    let c = engine.counters();
    println!("{c:?}");
    Ok(())
}
