//! Bond types, bonds, and leg link rules.

use smallvec::SmallVec;
use worldline_core::{BondTypeId, EventKind, LegSlot, SiteId, SiteState};

/// A same-cluster link between two legs of one vertex.
///
/// Clustering unions the two legs. Links between incoming legs and the
/// previous leg on the same site are implicit (world-line continuity)
/// and are not listed here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Link(pub LegSlot, pub LegSlot);

/// Static description of one kind of event.
///
/// # Examples
///
/// ```
/// use worldline_core::{EventKind, LegSlot};
/// use worldline_model::BondType;
///
/// // A single-site event that ties the site's world line straight through.
/// let pass = BondType::new("pass", 1, EventKind::Neutral, 1.0)
///     .link(LegSlot::In0, LegSlot::Out0);
/// assert_eq!(pass.links.len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BondType {
    /// Human-readable name (diagnostics only).
    pub name: String,
    /// Number of sites a bond of this type touches: 1 or 2.
    pub arity: usize,
    /// What a retained vertex of this type counts as.
    pub event: EventKind,
    /// Weight contribution to every cluster the vertex has a leg in.
    /// Zero freezes those clusters.
    pub weight: f64,
    /// Intra-vertex same-cluster links.
    pub links: SmallVec<[Link; 4]>,
    /// Insertion acceptance probability, indexed by the state of the
    /// site at the candidate instant. Only read for insertion bonds.
    pub acceptance: [f64; 2],
}

impl BondType {
    /// A bond type with no links and acceptance 1 in both states.
    pub fn new(name: impl Into<String>, arity: usize, event: EventKind, weight: f64) -> Self {
        Self {
            name: name.into(),
            arity,
            event,
            weight,
            links: SmallVec::new(),
            acceptance: [1.0, 1.0],
        }
    }

    /// Add a same-cluster link between two leg slots.
    pub fn link(mut self, a: LegSlot, b: LegSlot) -> Self {
        self.links.push(Link(a, b));
        self
    }

    /// Set insertion acceptance for a susceptible and an infected site.
    pub fn acceptance(mut self, susceptible: f64, infected: f64) -> Self {
        self.acceptance = [susceptible, infected];
        self
    }

    /// Insertion acceptance for a site in `state`.
    #[inline]
    pub fn acceptance_for(&self, state: SiteState) -> f64 {
        self.acceptance[state.bit() as usize]
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.arity != 1 && self.arity != 2 {
            return Err(format!("arity must be 1 or 2 (got {})", self.arity));
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(format!("weight must be finite and >= 0 (got {})", self.weight));
        }
        for p in self.acceptance {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("acceptance must lie in [0, 1] (got {p})"));
            }
        }
        for Link(a, b) in &self.links {
            for slot in [a, b] {
                if slot.arena_offset(self.arity).is_none() {
                    return Err(format!("link slot {slot:?} unused at arity {}", self.arity));
                }
            }
        }
        Ok(())
    }
}

/// A bond: one bond type placed on concrete sites.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bond {
    /// Sites in leg order: `sites[k]` carries slots `In{k}`/`Out{k}`.
    pub sites: SmallVec<[SiteId; 2]>,
    /// The bond's type.
    pub bond_type: BondTypeId,
}

impl Bond {
    /// Site behind bond site slot `k`.
    #[inline]
    pub fn site(&self, k: usize) -> SiteId {
        self.sites[k]
    }

    /// Number of sites.
    #[inline]
    pub fn arity(&self) -> usize {
        self.sites.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_well_formed_two_site_type() {
        let t = BondType::new("infect", 2, EventKind::Infection, 0.5)
            .link(LegSlot::In1, LegSlot::Out1)
            .link(LegSlot::In1, LegSlot::Out0);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn validate_rejects_second_site_slot_on_single_site_type() {
        let t = BondType::new("bad", 1, EventKind::Recovery, 1.0).link(LegSlot::In0, LegSlot::Out1);
        assert!(t.validate().unwrap_err().contains("unused at arity 1"));
    }

    #[test]
    fn validate_rejects_negative_weight_and_bad_acceptance() {
        assert!(BondType::new("w", 1, EventKind::Neutral, -1.0).validate().is_err());
        assert!(BondType::new("nan", 1, EventKind::Neutral, f64::NAN).validate().is_err());
        let t = BondType::new("a", 1, EventKind::Neutral, 1.0).acceptance(0.5, 1.5);
        assert!(t.validate().is_err());
    }

    #[test]
    fn acceptance_indexed_by_state() {
        let t = BondType::new("a", 1, EventKind::Neutral, 1.0).acceptance(0.25, 0.75);
        assert_eq!(t.acceptance_for(SiteState::Susceptible), 0.25);
        assert_eq!(t.acceptance_for(SiteState::Infected), 0.75);
    }
}
