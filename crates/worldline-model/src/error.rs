//! Error types for model construction.

use std::fmt;

use worldline_core::{BondId, BondTypeId, SiteId};

/// Errors detected by [`ModelBuilder::build`](crate::ModelBuilder::build).
#[derive(Clone, Debug, PartialEq)]
pub enum ModelError {
    /// The model has zero sites.
    EmptyModel,
    /// β is NaN, infinite, or negative.
    InvalidBeta {
        /// The rejected value.
        value: f64,
    },
    /// A bond type failed validation.
    InvalidBondType {
        /// The offending bond type.
        bond_type: BondTypeId,
        /// What went wrong.
        reason: String,
    },
    /// A bond refers to a bond type that was never registered.
    UnknownBondType {
        /// The unregistered bond type.
        bond_type: BondTypeId,
    },
    /// A bond failed validation.
    InvalidBond {
        /// The offending bond.
        bond: BondId,
        /// What went wrong.
        reason: String,
    },
    /// A site id is not below the site count.
    UnknownSite {
        /// The out-of-range site.
        site: SiteId,
    },
    /// A bond id is not in the bond table.
    UnknownBond {
        /// The out-of-range bond.
        bond: BondId,
    },
    /// A site's insertion setup is inconsistent.
    InvalidInsertion {
        /// The offending site.
        site: SiteId,
        /// What went wrong.
        reason: String,
    },
    /// A swap class is inconsistent.
    InvalidSwapClass {
        /// Position of the class in registration order.
        class: usize,
        /// What went wrong.
        reason: String,
    },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyModel => write!(f, "model must have at least one site"),
            Self::InvalidBeta { value } => {
                write!(f, "beta must be finite and >= 0 (got {value})")
            }
            Self::InvalidBondType { bond_type, reason } => {
                write!(f, "invalid bond type {bond_type}: {reason}")
            }
            Self::UnknownBondType { bond_type } => write!(f, "unknown bond type {bond_type}"),
            Self::InvalidBond { bond, reason } => write!(f, "invalid bond {bond}: {reason}"),
            Self::UnknownSite { site } => write!(f, "unknown site {site}"),
            Self::UnknownBond { bond } => write!(f, "unknown bond {bond}"),
            Self::InvalidInsertion { site, reason } => {
                write!(f, "invalid insertion on site {site}: {reason}")
            }
            Self::InvalidSwapClass { class, reason } => {
                write!(f, "invalid swap class #{class}: {reason}")
            }
        }
    }
}

impl std::error::Error for ModelError {}
