//! Equivalence classes of interchangeable bonds.

use worldline_core::BondId;

/// A set of bonds that describe the same event with different link
/// graphs and identical weight.
///
/// The graph swapper replaces a vertex's bond with a member of its class
/// chosen uniformly at random (the current bond included).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SwapClass {
    /// Any number of alternatives, drawn by uniform index.
    Group(Vec<BondId>),
    /// Exactly two alternatives, toggled with probability ½.
    Pair(BondId, BondId),
}

impl SwapClass {
    /// Members in declaration order.
    pub fn members(&self) -> Vec<BondId> {
        match self {
            Self::Group(bonds) => bonds.clone(),
            Self::Pair(a, b) => vec![*a, *b],
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        match self {
            Self::Group(bonds) => bonds.len(),
            Self::Pair(..) => 2,
        }
    }

    /// Whether the class has no members.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `bond` is a member.
    pub fn contains(&self, bond: BondId) -> bool {
        match self {
            Self::Group(bonds) => bonds.contains(&bond),
            Self::Pair(a, b) => *a == bond || *b == bond,
        }
    }

    /// The other member of a pair, or `None` for groups and non-members.
    pub fn partner(&self, bond: BondId) -> Option<BondId> {
        match self {
            Self::Pair(a, b) if *a == bond => Some(*b),
            Self::Pair(a, b) if *b == bond => Some(*a),
            _ => None,
        }
    }
}
