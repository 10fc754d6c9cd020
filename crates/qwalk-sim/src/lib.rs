//! `qwalk-sim`: quantum walks on a one-dimensional lattice.
//!
//! Simulates two families of walk on `N` sites with optional point defects:
//!
//! - **CTQW** (continuous time): `|ψ(t)⟩ = exp(−iHt)|ψ(0)⟩` with the lattice
//!   Laplacian `H = 2I − shift(+1) − shift(−1)` plus on-site defect energies.
//! - **DTQW** (discrete time): `|ψ(t+1)⟩ = U|ψ(t)⟩` with a Hadamard coin per
//!   site, phase-rotated at defects, followed by a coin-conditioned shift.
//!
//! The pipeline is: build an [`Operator`] and an initial [`State`], bind them
//! in an [`Evolver`], run it over [`TimeSamples`] to get a [`Trajectory`],
//! then reduce that with [`observables`].
//!
//! # Quick start
//!
//! ```rust
//! use qwalk_sim::observables::{self, RegionBounds};
//! use qwalk_sim::{DefectSet, Evolver, InitialState, LatticeSpec, TimeSamples, WalkKind};
//!
//! let lattice = LatticeSpec::new(101).unwrap();
//! let template = qwalk_sim::operator::build(&lattice, &DefectSet::new(), WalkKind::Continuous).unwrap();
//! // Copy-on-write: the template stays defect free.
//! let defected = template.with_defects(&DefectSet::new().with_defect(60, 1.0)).unwrap();
//!
//! let psi0 = qwalk_sim::state::init(&lattice, WalkKind::Continuous, &InitialState::delta(50)).unwrap();
//! let trajectory = Evolver::new(defected, psi0)
//!     .unwrap()
//!     .run(&TimeSamples::range(10))
//!     .unwrap();
//!
//! let dist = observables::probabilities(&trajectory);
//! let regions = observables::region_mass(&dist, RegionBounds::Single(60), 0);
//! let total = regions.total();
//! assert!((total[10] - 1.0).abs() < 1e-9);
//! ```

pub mod error;
pub mod expm;
pub mod lattice;
pub mod observables;
pub mod operator;
pub mod propagator;
pub mod sparse;
pub mod state;

pub use error::{SimError, SimResult};
pub use lattice::{DefectSet, LatticeSpec};
pub use observables::{ProbabilityDistribution, RegionAggregate, RegionBounds};
pub use operator::{Operator, OperatorBuilder, WalkKind};
pub use propagator::{Evolver, Propagator, TimeSamples, Trajectory};
pub use sparse::CsrMatrix;
pub use state::{CoinState, InitialState, Profile, State};
