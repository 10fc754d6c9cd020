//! Error types for the walk engine.

use thiserror::Error;

use crate::operator::WalkKind;

/// Errors produced while configuring or running a quantum walk.
///
/// Every variant is a precondition violation raised synchronously by the
/// call that received the bad input. None of them are retryable.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum SimError {
    /// A lattice needs at least two sites to have neighbours.
    #[error("Lattice needs at least 2 sites, got {0}")]
    InvalidLatticeSize(usize),

    /// A defect references a site outside the lattice.
    #[error("Defect site {site} is outside the lattice [0, {num_sites})")]
    InvalidDefectSite {
        /// The offending site index.
        site: usize,
        /// Number of lattice sites.
        num_sites: usize,
    },

    /// A defect strength is NaN or infinite.
    #[error("Defect strength at site {site} must be finite, got {value}")]
    InvalidDefectStrength {
        /// Site carrying the defect.
        site: usize,
        /// The rejected strength.
        value: f64,
    },

    /// The initial-state center lies outside the lattice.
    #[error("Initial center {center} is outside the lattice [0, {num_sites})")]
    InvalidCenter {
        /// The requested center.
        center: usize,
        /// Number of lattice sites.
        num_sites: usize,
    },

    /// Gaussian spread must be finite and strictly positive.
    #[error("Gaussian spread must be finite and > 0, got {0}")]
    InvalidSpread(f64),

    /// Wave-packet momentum must lie strictly inside (-π, π).
    #[error("Momentum must satisfy |k| < π, got {0}")]
    InvalidMomentum(f64),

    /// Coin vector cannot be normalised.
    #[error("Coin state must have a finite, non-zero norm")]
    InvalidCoin,

    /// The requested initial profile does not exist for this walk kind.
    #[error("Gaussian wave packets are only available for continuous-time walks, not {kind}")]
    UnsupportedProfile {
        /// Walk kind the profile was requested for.
        kind: WalkKind,
    },

    /// Time samples are empty, non-finite, or not valid step counts.
    #[error("Invalid time samples: {0}")]
    InvalidTimeSamples(String),

    /// Operator and state dimensions are incompatible.
    #[error("Operator has {operator_rows} rows but the {kind} state requires {expected}")]
    DimensionMismatch {
        /// Row count of the operator.
        operator_rows: usize,
        /// Row count implied by the state.
        expected: usize,
        /// Kind of the state being propagated.
        kind: WalkKind,
    },
}

/// Result type for walk engine operations.
pub type SimResult<T> = Result<T, SimError>;
