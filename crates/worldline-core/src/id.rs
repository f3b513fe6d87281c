//! Strongly-typed identifiers.
//!
//! Every index space in the engine gets its own newtype so that a site
//! index can never be handed to an API expecting a bond, and a leg in
//! the cluster arena can never be confused with a cluster id.

use std::fmt;

/// Identifies a site (node) of the model.
///
/// `SiteId(n)` is the n-th site; sites are numbered densely from zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SiteId(pub u32);

impl SiteId {
    /// The id as a `usize` for slice indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SiteId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a bond in the model's bond table.
///
/// A bond is a concrete placement of a bond type on one or two sites.
/// Vertices refer to bonds, never to bond types directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BondId(pub u32);

impl BondId {
    /// The id as a `usize` for slice indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BondId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for BondId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a bond type (arity, event kind, weight, link rules).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BondTypeId(pub u32);

impl BondTypeId {
    /// The id as a `usize` for slice indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BondTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for BondTypeId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Index of a leg in the flat leg arena built by clustering.
///
/// Vertex legs come first in sequence order, followed by one bottom
/// (τ = 0) and one top (τ = 1) boundary leg per site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LegId(pub u32);

impl LegId {
    /// The id as a `usize` for slice indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LegId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dense cluster id in `0..n_clusters`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(pub u32);

impl ClusterId {
    /// The id as a `usize` for slice indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonically increasing sweep counter.
///
/// Incremented each time a full sweep completes. Used as the row key
/// of the statistics sink.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SweepId(pub u64);

impl fmt::Display for SweepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SweepId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prints_raw_value() {
        assert_eq!(SiteId(7).to_string(), "7");
        assert_eq!(BondId(12).to_string(), "12");
        assert_eq!(SweepId(3).to_string(), "3");
    }

    #[test]
    fn index_round_trips() {
        assert_eq!(LegId(41).index(), 41);
        assert_eq!(ClusterId(2).index(), 2);
        assert_eq!(BondTypeId::from(5u32).index(), 5);
    }
}
