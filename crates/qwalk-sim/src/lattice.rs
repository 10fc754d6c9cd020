//! Lattice geometry and site defects.
//!
//! A walk lives on `N` sites in a line with open ends. Defects are real
//! site-local parameters: an on-site energy for continuous-time walks or a
//! coin phase (radians) for discrete-time walks.
//!
//! ```rust
//! use qwalk_sim::lattice::{DefectSet, LatticeSpec};
//!
//! let lattice = LatticeSpec::new(201).unwrap();
//! let defects = DefectSet::new().with_defect(150, -2.0);
//! assert!(defects.validate(&lattice).is_ok());
//! assert_eq!(defects.strength(150), -2.0);
//! assert_eq!(defects.strength(3), 0.0);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// A one-dimensional lattice of `num_sites ≥ 2` sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct LatticeSpec {
    num_sites: usize,
}

impl LatticeSpec {
    /// Create a lattice with `num_sites` sites.
    ///
    /// Fails with [`SimError::InvalidLatticeSize`] when `num_sites < 2`.
    pub fn new(num_sites: usize) -> SimResult<Self> {
        if num_sites < 2 {
            return Err(SimError::InvalidLatticeSize(num_sites));
        }
        Ok(Self { num_sites })
    }

    /// Number of sites.
    pub fn num_sites(&self) -> usize {
        self.num_sites
    }

    /// True if `site` is a valid index on this lattice.
    pub fn contains(&self, site: usize) -> bool {
        site < self.num_sites
    }

    /// Index of the middle site (rounded down).
    pub fn middle(&self) -> usize {
        self.num_sites / 2
    }
}

impl TryFrom<usize> for LatticeSpec {
    type Error = SimError;

    fn try_from(num_sites: usize) -> SimResult<Self> {
        Self::new(num_sites)
    }
}

impl From<LatticeSpec> for usize {
    fn from(lattice: LatticeSpec) -> usize {
        lattice.num_sites
    }
}

/// Site → strength map of point defects.
///
/// Sites not present have zero strength. Iteration is in ascending site
/// order, which keeps operator construction deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefectSet {
    defects: BTreeMap<usize, f64>,
}

impl DefectSet {
    /// An empty defect set (pristine lattice).
    pub fn new() -> Self {
        Self::default()
    }

    /// The same strength applied at every listed site.
    pub fn uniform(sites: impl IntoIterator<Item = usize>, strength: f64) -> Self {
        sites.into_iter().map(|site| (site, strength)).collect()
    }

    /// Add (or replace) the defect at `site`.
    #[must_use]
    pub fn with_defect(mut self, site: usize, strength: f64) -> Self {
        self.defects.insert(site, strength);
        self
    }

    /// Strength at `site`, zero when unset.
    pub fn strength(&self, site: usize) -> f64 {
        self.defects.get(&site).copied().unwrap_or(0.0)
    }

    /// `(site, strength)` pairs in ascending site order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.defects.iter().map(|(&site, &strength)| (site, strength))
    }

    /// Number of defected sites.
    pub fn len(&self) -> usize {
        self.defects.len()
    }

    /// True if no site carries a defect.
    pub fn is_empty(&self) -> bool {
        self.defects.is_empty()
    }

    /// Combine two defect sets. Strengths at a shared site add.
    #[must_use]
    pub fn merged(&self, other: &DefectSet) -> DefectSet {
        let mut defects = self.defects.clone();
        for (site, strength) in other.iter() {
            *defects.entry(site).or_insert(0.0) += strength;
        }
        DefectSet { defects }
    }

    /// Check every site lies on `lattice` and every strength is finite.
    pub fn validate(&self, lattice: &LatticeSpec) -> SimResult<()> {
        for (site, strength) in self.iter() {
            if !lattice.contains(site) {
                return Err(SimError::InvalidDefectSite {
                    site,
                    num_sites: lattice.num_sites(),
                });
            }
            if !strength.is_finite() {
                return Err(SimError::InvalidDefectStrength {
                    site,
                    value: strength,
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<(usize, f64)> for DefectSet {
    fn from_iter<T: IntoIterator<Item = (usize, f64)>>(iter: T) -> Self {
        Self {
            defects: iter.into_iter().collect(),
        }
    }
}
