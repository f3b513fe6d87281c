//! The [`Vertex`] event record.
//!
//! A vertex sits at a point of imaginary time on one bond and records the
//! state of every site of that bond just before (`In*`) and just after
//! (`Out*`) the event. The leg layout has a fixed arity of four:
//!
//! ```text
//!   Out0   Out1      τ + 0
//!    │      │
//!  ══╪══════╪══  bond
//!    │      │
//!   In0    In1       τ - 0
//! ```
//!
//! Single-site bonds use only `In0`/`Out0`; the site-1 slots stay
//! [`SiteState::Susceptible`] and never take part in clustering.

use crate::id::BondId;
use crate::state::SiteState;

/// Number of leg slots carried by every vertex.
pub const LEG_SLOTS: usize = 4;

/// One of the four leg slots of a vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LegSlot {
    /// Incoming state on the bond's first site.
    In0 = 0,
    /// Incoming state on the bond's second site.
    In1 = 1,
    /// Outgoing state on the bond's first site.
    Out0 = 2,
    /// Outgoing state on the bond's second site.
    Out1 = 3,
}

impl LegSlot {
    /// All slots in storage order.
    pub const ALL: [LegSlot; LEG_SLOTS] = [Self::In0, Self::In1, Self::Out0, Self::Out1];

    /// Slot position inside [`Vertex::legs`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Decode a slot position; `None` outside `0..4`.
    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    /// Which site of the bond (0 or 1) this slot belongs to.
    #[inline]
    pub fn site_slot(self) -> usize {
        self.index() % 2
    }

    /// Whether this is an incoming (`In*`) slot.
    #[inline]
    pub fn is_incoming(self) -> bool {
        self.index() < 2
    }

    /// Incoming slot for bond site `k`.
    #[inline]
    pub fn incoming(k: usize) -> Self {
        if k == 0 {
            Self::In0
        } else {
            Self::In1
        }
    }

    /// Outgoing slot for bond site `k`.
    #[inline]
    pub fn outgoing(k: usize) -> Self {
        if k == 0 {
            Self::Out0
        } else {
            Self::Out1
        }
    }

    /// Position of this slot among the legs a vertex of `arity` owns
    /// in the leg arena, or `None` if the slot is unused at that arity.
    ///
    /// Arity 1 owns `[In0, Out0]`; arity 2 owns all four slots in order.
    #[inline]
    pub fn arena_offset(self, arity: usize) -> Option<usize> {
        if self.site_slot() >= arity {
            return None;
        }
        if arity == 1 {
            Some(self.index() / 2)
        } else {
            Some(self.index())
        }
    }
}

/// An event in the world line.
///
/// `time` is the position in imaginary time as a fraction of β, in
/// `[0, 1)`. Only the leg states change after placement, and only
/// through a cluster flip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    /// Position in imaginary time, `0.0 <= time < 1.0`.
    pub time: f64,
    /// The bond this event happens on.
    pub bond: BondId,
    /// Leg states indexed by [`LegSlot::index`].
    pub legs: [SiteState; LEG_SLOTS],
}

impl Vertex {
    /// A diagonal single-site vertex: the state passes through unchanged.
    pub fn diagonal(time: f64, bond: BondId, state: SiteState) -> Self {
        let mut legs = [SiteState::Susceptible; LEG_SLOTS];
        legs[LegSlot::In0.index()] = state;
        legs[LegSlot::Out0.index()] = state;
        Self { time, bond, legs }
    }

    /// A vertex with explicit leg states.
    pub fn with_legs(time: f64, bond: BondId, legs: [SiteState; LEG_SLOTS]) -> Self {
        Self { time, bond, legs }
    }

    /// State stored in `slot`.
    #[inline]
    pub fn leg(&self, slot: LegSlot) -> SiteState {
        self.legs[slot.index()]
    }

    /// Incoming state on bond site `k`.
    #[inline]
    pub fn incoming(&self, k: usize) -> SiteState {
        self.leg(LegSlot::incoming(k))
    }

    /// Outgoing state on bond site `k`.
    #[inline]
    pub fn outgoing(&self, k: usize) -> SiteState {
        self.leg(LegSlot::outgoing(k))
    }

    /// Whether the first `arity` sites pass through unchanged.
    pub fn is_diagonal(&self, arity: usize) -> bool {
        (0..arity).all(|k| self.incoming(k) == self.outgoing(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_vertex_copies_state_into_both_legs() {
        let v = Vertex::diagonal(0.25, BondId(3), SiteState::Infected);
        assert_eq!(v.leg(LegSlot::In0), SiteState::Infected);
        assert_eq!(v.leg(LegSlot::Out0), SiteState::Infected);
        assert_eq!(v.leg(LegSlot::In1), SiteState::Susceptible);
        assert!(v.is_diagonal(1));
    }

    #[test]
    fn state_change_on_second_site_is_not_diagonal() {
        use SiteState::*;
        let v = Vertex::with_legs(0.5, BondId(0), [Infected, Susceptible, Infected, Infected]);
        assert!(v.is_diagonal(1));
        assert!(!v.is_diagonal(2));
    }

    #[test]
    fn arena_offsets_cover_used_slots_densely() {
        assert_eq!(LegSlot::In0.arena_offset(1), Some(0));
        assert_eq!(LegSlot::Out0.arena_offset(1), Some(1));
        assert_eq!(LegSlot::In1.arena_offset(1), None);
        assert_eq!(LegSlot::Out1.arena_offset(1), None);
        let two: Vec<_> = LegSlot::ALL.iter().map(|s| s.arena_offset(2)).collect();
        assert_eq!(two, vec![Some(0), Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn slot_geometry() {
        assert!(LegSlot::In1.is_incoming());
        assert!(!LegSlot::Out1.is_incoming());
        assert_eq!(LegSlot::Out1.site_slot(), 1);
        assert_eq!(LegSlot::from_index(2), Some(LegSlot::Out0));
        assert_eq!(LegSlot::from_index(4), None);
    }
}
