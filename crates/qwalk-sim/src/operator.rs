//! Walk generators: the CTQW Hamiltonian and the DTQW step unitary.
//!
//! # Continuous time
//!
//!   H = 2·I − shift(+1) − shift(−1) + diag(defects)
//!
//! the discrete Laplacian with unit hopping. Defects are real on-site
//! energies, so `H` stays Hermitian.
//!
//! # Discrete time
//!
//! The basis index is `2·position + coin`. One step is `U = S · C` where
//!
//! - `C` is block diagonal with a Hadamard coin `H/√2` per site, replaced by
//!   `e^{iφ}·H/√2` where the site carries a phase defect `φ`;
//! - `S` moves coin branch 0 one site right and branch 1 one site left.
//!
//! Boundaries are open: amplitude that `S` would move outside `[0, N)` is
//! dropped, not reflected or wrapped. `U` is therefore unitary only on
//! states with no weight on the outward branch of the end sites; columns of
//! the end sites have norm `1/√2`. Long runs lose probability once the walk
//! reaches the edges, and that loss is part of the model.

use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SimResult;
use crate::lattice::{DefectSet, LatticeSpec};
use crate::sparse::CsrMatrix;

/// Phases smaller than this are treated as no defect.
const PHASE_EPSILON: f64 = 1e-15;

/// Which flavour of quantum walk an operator or state belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkKind {
    /// Continuous-time walk driven by a Hamiltonian.
    Continuous,
    /// Discrete-time coined walk driven by a step unitary.
    Discrete,
}

impl WalkKind {
    /// Hilbert-space dimension for a lattice of `num_sites` sites.
    pub fn basis_dim(self, num_sites: usize) -> usize {
        match self {
            WalkKind::Continuous => num_sites,
            WalkKind::Discrete => 2 * num_sites,
        }
    }

    /// Short label used in logs and errors.
    pub fn label(self) -> &'static str {
        match self {
            WalkKind::Continuous => "CTQW",
            WalkKind::Discrete => "DTQW",
        }
    }
}

impl fmt::Display for WalkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An immutable walk generator.
///
/// Applying defects never mutates an operator: [`Operator::with_defects`]
/// returns a new one and the template stays pristine, so a free run and a
/// defected run can share a template without aliasing.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    kind: WalkKind,
    lattice: LatticeSpec,
    defects: DefectSet,
    matrix: CsrMatrix,
}

impl Operator {
    /// Walk kind.
    pub fn kind(&self) -> WalkKind {
        self.kind
    }

    /// Lattice the operator acts on.
    pub fn lattice(&self) -> &LatticeSpec {
        &self.lattice
    }

    /// Defects baked into this operator.
    pub fn defects(&self) -> &DefectSet {
        &self.defects
    }

    /// The sparse generator matrix (`H` or `U`).
    pub fn matrix(&self) -> &CsrMatrix {
        &self.matrix
    }

    /// Row count of the generator.
    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    /// A detached copy with `extra` defects applied on top of this one's.
    ///
    /// For CTQW the extra strengths are added to the copied diagonal. For
    /// DTQW the coin phases are merged and the unitary is rebuilt.
    pub fn with_defects(&self, extra: &DefectSet) -> SimResult<Operator> {
        extra.validate(&self.lattice)?;
        let defects = self.defects.merged(extra);
        let matrix = match self.kind {
            WalkKind::Continuous => self
                .matrix
                .with_diagonal_added(extra.iter().map(|(site, e)| (site, Complex64::new(e, 0.0)))),
            WalkKind::Discrete => step_unitary(&self.lattice, &defects),
        };
        debug!(
            kind = %self.kind,
            added = extra.len(),
            total = defects.len(),
            "derived defected operator from template"
        );
        Ok(Operator {
            kind: self.kind,
            lattice: self.lattice,
            defects,
            matrix,
        })
    }
}

/// Builder for walk operators.
#[derive(Debug, Clone)]
pub struct OperatorBuilder {
    lattice: LatticeSpec,
    kind: WalkKind,
    defects: DefectSet,
}

impl OperatorBuilder {
    /// A builder for a defect-free operator of the given kind.
    pub fn new(lattice: LatticeSpec, kind: WalkKind) -> Self {
        Self {
            lattice,
            kind,
            defects: DefectSet::new(),
        }
    }

    /// Replace the defect set.
    #[must_use]
    pub fn with_defects(mut self, defects: DefectSet) -> Self {
        self.defects = defects;
        self
    }

    /// Construct the operator.
    pub fn build(&self) -> SimResult<Operator> {
        self.defects.validate(&self.lattice)?;
        let matrix = match self.kind {
            WalkKind::Continuous => hamiltonian(&self.lattice, &self.defects),
            WalkKind::Discrete => step_unitary(&self.lattice, &self.defects),
        };
        debug!(
            kind = %self.kind,
            num_sites = self.lattice.num_sites(),
            defects = self.defects.len(),
            nnz = matrix.nnz(),
            "built walk operator"
        );
        Ok(Operator {
            kind: self.kind,
            lattice: self.lattice,
            defects: self.defects.clone(),
            matrix,
        })
    }
}

/// Build the generator for `kind` on `lattice` with `defects`.
pub fn build(lattice: &LatticeSpec, defects: &DefectSet, kind: WalkKind) -> SimResult<Operator> {
    OperatorBuilder::new(*lattice, kind)
        .with_defects(defects.clone())
        .build()
}

/// The normalised Hadamard coin `H/√2`, optionally phase-rotated.
pub fn hadamard_coin(phase: f64) -> [[Complex64; 2]; 2] {
    let scale = if phase.abs() < PHASE_EPSILON {
        Complex64::new(FRAC_1_SQRT_2, 0.0)
    } else {
        Complex64::from_polar(FRAC_1_SQRT_2, phase)
    };
    [[scale, scale], [scale, -scale]]
}

fn hamiltonian(lattice: &LatticeSpec, defects: &DefectSet) -> CsrMatrix {
    let n = lattice.num_sites();
    let mut main = vec![Complex64::new(2.0, 0.0); n];
    for (site, energy) in defects.iter() {
        main[site] += energy;
    }
    let hop = vec![Complex64::new(-1.0, 0.0); n - 1];
    CsrMatrix::from_diagonals(n, &[(0, main), (1, hop.clone()), (-1, hop)])
}

fn step_unitary(lattice: &LatticeSpec, defects: &DefectSet) -> CsrMatrix {
    let n = lattice.num_sites();
    let blocks: Vec<_> = (0..n).map(|site| hadamard_coin(defects.strength(site))).collect();
    let coin = CsrMatrix::block_diagonal_2x2(&blocks);
    shift_operator(n).matmul(&coin)
}

/// Conditional shift with open boundaries.
fn shift_operator(n: usize) -> CsrMatrix {
    let one = Complex64::new(1.0, 0.0);
    let right = (0..n - 1).map(|p| (2 * (p + 1), 2 * p, one));
    let left = (1..n).map(|p| (2 * (p - 1) + 1, 2 * p + 1, one));
    CsrMatrix::from_triplets(2 * n, 2 * n, right.chain(left))
}
