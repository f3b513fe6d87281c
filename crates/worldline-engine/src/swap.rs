//! Graph swapper: re-labels vertices among weight-equivalent bonds.

use worldline_model::{Model, SwapClass};

use crate::rng::RandomSource;
use crate::world::WorldLine;

/// Replace the bond of every vertex that belongs to a swap class with a
/// member of the same class, and return how many bonds changed.
///
/// [`SwapClass::Group`] members are drawn uniformly (the current bond
/// included); a [`SwapClass::Pair`] toggles with probability ½. Leg
/// states are never touched. The cluster state is dropped because the
/// new bonds may link legs differently.
pub fn swapping_graphs<R: RandomSource + ?Sized>(
    world: &mut WorldLine,
    model: &Model,
    rng: &mut R,
) -> usize {
    world.clusters = None;
    let mut changed = 0;
    for v in world.buffers.active_mut() {
        let Some(class) = model.swap_class(v.bond) else {
            continue;
        };
        let next = match class {
            SwapClass::Group(members) => members[rng.uniform_index(members.len())],
            SwapClass::Pair(..) => {
                if rng.bernoulli(0.5) {
                    class.partner(v.bond).unwrap_or(v.bond)
                } else {
                    v.bond
                }
            }
        };
        if next != v.bond {
            debug_assert_eq!(model.weight(next), model.weight(v.bond));
            v.bond = next;
            changed += 1;
        }
    }
    changed
}
