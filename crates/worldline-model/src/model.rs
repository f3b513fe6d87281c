//! The validated [`Model`] and its [`ModelBuilder`].

use smallvec::SmallVec;
use worldline_core::{BondId, BondTypeId, EventKind, SiteId, SiteState};

use crate::bond::{Bond, BondType, Link};
use crate::error::ModelError;
use crate::swap::SwapClass;

/// Static, read-only description of a simulated system.
///
/// Constructed through [`ModelBuilder`]. Every id handed out by the
/// builder is valid for the built model, and every accessor indexed by
/// such an id is infallible.
///
/// # Examples
///
/// ```
/// use worldline_core::{EventKind, LegSlot, SiteId};
/// use worldline_model::{BondType, ModelBuilder};
///
/// let mut b = ModelBuilder::new(2);
/// b.beta(1.0);
/// let t = b.add_bond_type(
///     BondType::new("contact", 2, EventKind::Neutral, 1.0)
///         .link(LegSlot::In0, LegSlot::In1),
/// );
/// let bond = b.add_bond(&[SiteId(0), SiteId(1)], t);
/// let model = b.build().unwrap();
/// assert_eq!(model.n_sites(), 2);
/// assert_eq!(model.weight(bond), 1.0);
/// ```
#[derive(Clone, Debug)]
pub struct Model {
    n_sites: usize,
    beta: f64,
    bond_types: Vec<BondType>,
    bonds: Vec<Bond>,
    site_weight: Vec<f64>,
    insertion_bond: Vec<Option<BondId>>,
    swap_classes: Vec<SwapClass>,
    /// `swap_index[bond]` = position in `swap_classes`.
    swap_index: Vec<Option<u32>>,
}

impl Model {
    /// Start building a model with `n_sites` sites.
    pub fn builder(n_sites: usize) -> ModelBuilder {
        ModelBuilder::new(n_sites)
    }

    /// Number of sites.
    pub fn n_sites(&self) -> usize {
        self.n_sites
    }

    /// Inverse-temperature-like scale of the insertion density.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// All bonds in id order.
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// The bond behind `id`.
    #[inline]
    pub fn bond(&self, id: BondId) -> &Bond {
        &self.bonds[id.index()]
    }

    /// All bond types in id order.
    pub fn bond_types(&self) -> &[BondType] {
        &self.bond_types
    }

    /// The bond type behind `id`.
    #[inline]
    pub fn bond_type(&self, id: BondTypeId) -> &BondType {
        &self.bond_types[id.index()]
    }

    /// The bond type of bond `id`.
    #[inline]
    pub fn bond_type_of(&self, id: BondId) -> &BondType {
        self.bond_type(self.bond(id).bond_type)
    }

    /// Number of sites bond `id` touches.
    #[inline]
    pub fn arity(&self, id: BondId) -> usize {
        self.bond(id).arity()
    }

    /// Intra-vertex link rules of bond `id`.
    #[inline]
    pub fn links(&self, id: BondId) -> &[Link] {
        &self.bond_type_of(id).links
    }

    /// Cluster weight contribution of a vertex on bond `id`.
    #[inline]
    pub fn weight(&self, id: BondId) -> f64 {
        self.bond_type_of(id).weight
    }

    /// Event kind counted for a retained vertex on bond `id`.
    #[inline]
    pub fn event_kind(&self, id: BondId) -> EventKind {
        self.bond_type_of(id).event
    }

    /// Per-site insertion weight.
    #[inline]
    pub fn site_weight(&self, site: SiteId) -> f64 {
        self.site_weight[site.index()]
    }

    /// Single-site bond used for vertices inserted on `site`.
    #[inline]
    pub fn insertion_bond(&self, site: SiteId) -> Option<BondId> {
        self.insertion_bond[site.index()]
    }

    /// Probability of accepting an insertion candidate on `site` while
    /// the site is in `state`. Zero for sites without an insertion bond.
    pub fn insertion_acceptance(&self, site: SiteId, state: SiteState) -> f64 {
        self.insertion_bond(site)
            .map_or(0.0, |b| self.bond_type_of(b).acceptance_for(state))
    }

    /// The swap class `id` belongs to, if any.
    #[inline]
    pub fn swap_class(&self, id: BondId) -> Option<&SwapClass> {
        self.swap_index[id.index()].map(|c| &self.swap_classes[c as usize])
    }

    /// All swap classes in registration order.
    pub fn swap_classes(&self) -> &[SwapClass] {
        &self.swap_classes
    }
}

/// Incremental, validating builder for [`Model`].
///
/// `add_*` methods hand out ids immediately; nothing is checked until
/// [`build`](ModelBuilder::build).
#[derive(Clone, Debug)]
pub struct ModelBuilder {
    n_sites: usize,
    beta: f64,
    bond_types: Vec<BondType>,
    bonds: Vec<Bond>,
    insertions: Vec<(SiteId, f64, BondId)>,
    swap_classes: Vec<SwapClass>,
}

impl ModelBuilder {
    /// A builder for `n_sites` sites with β = 1 and nothing registered.
    pub fn new(n_sites: usize) -> Self {
        Self {
            n_sites,
            beta: 1.0,
            bond_types: Vec::new(),
            bonds: Vec::new(),
            insertions: Vec::new(),
            swap_classes: Vec::new(),
        }
    }

    /// Set β (default 1).
    pub fn beta(&mut self, beta: f64) -> &mut Self {
        self.beta = beta;
        self
    }

    /// Register a bond type.
    pub fn add_bond_type(&mut self, bond_type: BondType) -> BondTypeId {
        self.bond_types.push(bond_type);
        BondTypeId(self.bond_types.len() as u32 - 1)
    }

    /// Place a bond of `bond_type` on `sites` (in leg order).
    pub fn add_bond(&mut self, sites: &[SiteId], bond_type: BondTypeId) -> BondId {
        self.bonds.push(Bond {
            sites: SmallVec::from_slice(sites),
            bond_type,
        });
        BondId(self.bonds.len() as u32 - 1)
    }

    /// Give `site` an insertion weight and the single-site bond its
    /// inserted vertices carry. Later calls for the same site win.
    pub fn insertion(&mut self, site: SiteId, weight: f64, bond: BondId) -> &mut Self {
        self.insertions.push((site, weight, bond));
        self
    }

    /// Register an equivalence class for graph swapping.
    pub fn add_swap_class(&mut self, class: SwapClass) -> &mut Self {
        self.swap_classes.push(class);
        self
    }

    /// Validate everything and produce the model.
    ///
    /// # Errors
    ///
    /// Returns the first [`ModelError`] found, checking in order: site
    /// count, β, bond types, bonds, insertions, swap classes.
    pub fn build(&self) -> Result<Model, ModelError> {
        if self.n_sites == 0 {
            return Err(ModelError::EmptyModel);
        }
        if !self.beta.is_finite() || self.beta < 0.0 {
            return Err(ModelError::InvalidBeta { value: self.beta });
        }
        for (i, t) in self.bond_types.iter().enumerate() {
            t.validate().map_err(|reason| ModelError::InvalidBondType {
                bond_type: BondTypeId(i as u32),
                reason,
            })?;
        }
        for (i, bond) in self.bonds.iter().enumerate() {
            self.check_bond(BondId(i as u32), bond)?;
        }

        let mut site_weight = vec![0.0; self.n_sites];
        let mut insertion_bond = vec![None; self.n_sites];
        for &(site, weight, bond) in &self.insertions {
            self.check_site(site)?;
            if !weight.is_finite() || weight < 0.0 {
                return Err(ModelError::InvalidInsertion {
                    site,
                    reason: format!("weight must be finite and >= 0 (got {weight})"),
                });
            }
            let b = self.bonds.get(bond.index()).ok_or(ModelError::UnknownBond { bond })?;
            if b.sites.as_slice() != [site] {
                return Err(ModelError::InvalidInsertion {
                    site,
                    reason: format!("insertion bond {bond} must be single-site on this site"),
                });
            }
            site_weight[site.index()] = weight;
            insertion_bond[site.index()] = Some(bond);
        }

        let mut swap_index = vec![None; self.bonds.len()];
        for (ci, class) in self.swap_classes.iter().enumerate() {
            self.check_swap_class(ci, class, &swap_index)?;
            for bond in class.members() {
                swap_index[bond.index()] = Some(ci as u32);
            }
        }

        Ok(Model {
            n_sites: self.n_sites,
            beta: self.beta,
            bond_types: self.bond_types.clone(),
            bonds: self.bonds.clone(),
            site_weight,
            insertion_bond,
            swap_classes: self.swap_classes.clone(),
            swap_index,
        })
    }

    fn check_site(&self, site: SiteId) -> Result<(), ModelError> {
        if site.index() >= self.n_sites {
            return Err(ModelError::UnknownSite { site });
        }
        Ok(())
    }

    fn check_bond(&self, id: BondId, bond: &Bond) -> Result<(), ModelError> {
        let t = self
            .bond_types
            .get(bond.bond_type.index())
            .ok_or(ModelError::UnknownBondType {
                bond_type: bond.bond_type,
            })?;
        if bond.arity() != t.arity {
            return Err(ModelError::InvalidBond {
                bond: id,
                reason: format!(
                    "{} sites given for bond type '{}' of arity {}",
                    bond.arity(),
                    t.name,
                    t.arity
                ),
            });
        }
        for &site in &bond.sites {
            self.check_site(site)?;
        }
        if bond.arity() == 2 && bond.site(0) == bond.site(1) {
            return Err(ModelError::InvalidBond {
                bond: id,
                reason: format!("both legs on site {}", bond.site(0)),
            });
        }
        Ok(())
    }

    fn check_swap_class(
        &self,
        ci: usize,
        class: &SwapClass,
        taken: &[Option<u32>],
    ) -> Result<(), ModelError> {
        let fail = |reason: String| ModelError::InvalidSwapClass { class: ci, reason };
        let members = class.members();
        if members.len() < 2 {
            return Err(fail(format!("needs at least 2 members (got {})", members.len())));
        }
        for &m in &members {
            if m.index() >= self.bonds.len() {
                return Err(ModelError::UnknownBond { bond: m });
            }
            if let Some(other) = taken[m.index()] {
                return Err(fail(format!("bond {m} already belongs to class #{other}")));
            }
        }
        let first = &self.bonds[members[0].index()];
        let first_weight = self.bond_types[first.bond_type.index()].weight;
        for &m in &members[1..] {
            let b = &self.bonds[m.index()];
            if b.sites != first.sites {
                return Err(fail(format!("bond {m} sits on different sites than {}", members[0])));
            }
            let w = self.bond_types[b.bond_type.index()].weight;
            if w != first_weight {
                return Err(fail(format!("bond {m} has weight {w}, expected {first_weight}")));
            }
        }
        let mut sorted = members.clone();
        sorted.sort();
        sorted.dedup();
        if sorted.len() != members.len() {
            return Err(fail("duplicate member".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use worldline_core::LegSlot;

    fn single(b: &mut ModelBuilder, weight: f64) -> BondTypeId {
        b.add_bond_type(
            BondType::new("pass", 1, EventKind::Neutral, weight).link(LegSlot::In0, LegSlot::Out0),
        )
    }

    #[test]
    fn build_records_insertion_setup() {
        let mut b = ModelBuilder::new(3);
        b.beta(2.5);
        let t = single(&mut b, 1.0);
        let bond = b.add_bond(&[SiteId(1)], t);
        b.insertion(SiteId(1), 0.75, bond);
        let m = b.build().unwrap();
        assert_eq!(m.beta(), 2.5);
        assert_eq!(m.site_weight(SiteId(0)), 0.0);
        assert_eq!(m.site_weight(SiteId(1)), 0.75);
        assert_eq!(m.insertion_bond(SiteId(1)), Some(bond));
        assert_eq!(m.insertion_bond(SiteId(2)), None);
        assert_eq!(m.insertion_acceptance(SiteId(2), SiteState::Infected), 0.0);
        assert_eq!(m.insertion_acceptance(SiteId(1), SiteState::Infected), 1.0);
    }

    #[test]
    fn empty_model_rejected() {
        assert_eq!(ModelBuilder::new(0).build().unwrap_err(), ModelError::EmptyModel);
    }

    #[test]
    fn negative_beta_rejected() {
        let mut b = ModelBuilder::new(1);
        b.beta(-1.0);
        assert!(matches!(b.build(), Err(ModelError::InvalidBeta { .. })));
    }

    #[test]
    fn bond_arity_must_match_type() {
        let mut b = ModelBuilder::new(2);
        let t = single(&mut b, 1.0);
        b.add_bond(&[SiteId(0), SiteId(1)], t);
        assert!(matches!(b.build(), Err(ModelError::InvalidBond { .. })));
    }

    #[test]
    fn bond_on_unknown_site_rejected() {
        let mut b = ModelBuilder::new(2);
        let t = single(&mut b, 1.0);
        b.add_bond(&[SiteId(5)], t);
        assert_eq!(b.build().unwrap_err(), ModelError::UnknownSite { site: SiteId(5) });
    }

    #[test]
    fn unknown_bond_type_rejected() {
        let mut b = ModelBuilder::new(1);
        b.add_bond(&[SiteId(0)], BondTypeId(9));
        assert_eq!(
            b.build().unwrap_err(),
            ModelError::UnknownBondType { bond_type: BondTypeId(9) }
        );
    }

    #[test]
    fn insertion_bond_must_sit_on_its_site() {
        let mut b = ModelBuilder::new(2);
        let t = single(&mut b, 1.0);
        let on_zero = b.add_bond(&[SiteId(0)], t);
        b.insertion(SiteId(1), 1.0, on_zero);
        assert!(matches!(b.build(), Err(ModelError::InvalidInsertion { .. })));
    }

    #[test]
    fn swap_class_members_must_share_sites_and_weight() {
        let mut b = ModelBuilder::new(2);
        let t1 = single(&mut b, 1.0);
        let t2 = single(&mut b, 0.5);
        let a = b.add_bond(&[SiteId(0)], t1);
        let other_site = b.add_bond(&[SiteId(1)], t1);
        let other_weight = b.add_bond(&[SiteId(0)], t2);

        let mut sites = b.clone();
        sites.add_swap_class(SwapClass::Pair(a, other_site));
        assert!(matches!(sites.build(), Err(ModelError::InvalidSwapClass { .. })));

        let mut weights = b.clone();
        weights.add_swap_class(SwapClass::Pair(a, other_weight));
        assert!(matches!(weights.build(), Err(ModelError::InvalidSwapClass { .. })));
    }

    #[test]
    fn bond_may_belong_to_one_swap_class_only() {
        let mut b = ModelBuilder::new(1);
        let t = single(&mut b, 1.0);
        let x = b.add_bond(&[SiteId(0)], t);
        let y = b.add_bond(&[SiteId(0)], t);
        let z = b.add_bond(&[SiteId(0)], t);
        b.add_swap_class(SwapClass::Pair(x, y));
        b.add_swap_class(SwapClass::Group(vec![y, z]));
        let err = b.build().unwrap_err();
        assert!(matches!(err, ModelError::InvalidSwapClass { class: 1, .. }));
    }

    #[test]
    fn swap_class_lookup() {
        let mut b = ModelBuilder::new(1);
        let t = single(&mut b, 1.0);
        let x = b.add_bond(&[SiteId(0)], t);
        let y = b.add_bond(&[SiteId(0)], t);
        let lone = b.add_bond(&[SiteId(0)], t);
        b.add_swap_class(SwapClass::Pair(x, y));
        let m = b.build().unwrap();
        assert_eq!(m.swap_class(y), Some(&SwapClass::Pair(x, y)));
        assert_eq!(m.swap_class(lone), None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn ids_are_dense_and_resolve(n_sites in 1usize..16, n_bonds in 0usize..32) {
                let mut b = ModelBuilder::new(n_sites);
                let t = b.add_bond_type(BondType::new("t", 1, EventKind::Recovery, 1.0));
                let ids: Vec<_> = (0..n_bonds)
                    .map(|i| b.add_bond(&[SiteId((i % n_sites) as u32)], t))
                    .collect();
                let m = b.build().unwrap();
                prop_assert_eq!(m.bonds().len(), n_bonds);
                for (i, id) in ids.iter().enumerate() {
                    prop_assert_eq!(id.index(), i);
                    prop_assert_eq!(m.bond(*id).site(0), SiteId((i % n_sites) as u32));
                    prop_assert_eq!(m.event_kind(*id), EventKind::Recovery);
                }
            }
        }
    }
}
