//! Time evolution of walk states.
//!
//! [`Evolver`] pairs an [`Operator`] with an initial [`State`], checks that
//! their dimensions agree, and produces a [`Trajectory`] for a list of
//! sample times. The actual stepping is delegated to a [`Propagator`]:
//!
//! - [`ExpActionPropagator`] for CTQW evaluates `exp(−iHt)·ψ₀` at each
//!   sample, advancing from the previous sample rather than from `t = 0`.
//! - [`UnitaryStepPropagator`] for DTQW applies `U` once per step up to the
//!   largest requested step count and snapshots the requested steps.
//!
//! # Example
//!
//! ```rust
//! use qwalk_sim::{DefectSet, Evolver, InitialState, LatticeSpec, TimeSamples, WalkKind};
//! use qwalk_sim::{observables, operator, state};
//!
//! let lattice = LatticeSpec::new(5).unwrap();
//! let h = operator::build(&lattice, &DefectSet::new(), WalkKind::Continuous).unwrap();
//! let psi = state::init(&lattice, WalkKind::Continuous, &InitialState::delta(2)).unwrap();
//!
//! let trajectory = Evolver::new(h, psi).unwrap().run(&TimeSamples::new(vec![0.0]).unwrap()).unwrap();
//! let dist = observables::probabilities(&trajectory);
//! assert_eq!(dist.at(0).to_vec(), vec![0.0, 0.0, 1.0, 0.0, 0.0]);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use ndarray::Array1;
use num_complex::Complex64;
use tracing::{debug, instrument};

use crate::error::{SimError, SimResult};
use crate::expm::ExpAction;
use crate::operator::{Operator, WalkKind};
use crate::sparse::CsrMatrix;
use crate::state::State;

/// A non-empty list of finite sample times, kept in caller order.
///
/// Continuous walks accept any real times. Discrete walks interpret each
/// sample as a step count and require non-negative integers.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSamples {
    values: Vec<f64>,
}

impl TimeSamples {
    /// Explicit sample times.
    pub fn new(values: impl Into<Vec<f64>>) -> SimResult<Self> {
        let values = values.into();
        if values.is_empty() {
            return Err(SimError::InvalidTimeSamples(
                "at least one sample time is required".into(),
            ));
        }
        if let Some(bad) = values.iter().find(|t| !t.is_finite()) {
            return Err(SimError::InvalidTimeSamples(format!(
                "sample time {bad} is not finite"
            )));
        }
        Ok(Self { values })
    }

    /// Integer step counts, e.g. for DTQW.
    pub fn steps(steps: impl IntoIterator<Item = u64>) -> SimResult<Self> {
        Self::new(steps.into_iter().map(|s| s as f64).collect::<Vec<_>>())
    }

    /// Every step `0, 1, …, t_max`.
    pub fn range(t_max: u64) -> Self {
        Self {
            values: (0..=t_max).map(|s| s as f64).collect(),
        }
    }

    /// `num` evenly spaced samples from `start` to `stop` inclusive.
    pub fn linspace(start: f64, stop: f64, num: usize) -> SimResult<Self> {
        match num {
            0 => Self::new(Vec::new()),
            1 => Self::new(vec![start]),
            _ => {
                let step = (stop - start) / (num - 1) as f64;
                Self::new((0..num).map(|i| start + step * i as f64).collect::<Vec<_>>())
            }
        }
    }

    /// Sample times in caller order.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Samples as step counts, failing on negative or fractional values.
    pub fn as_steps(&self) -> SimResult<Vec<u64>> {
        self.values
            .iter()
            .map(|&t| {
                if t < 0.0 || t.fract() != 0.0 || t > u64::MAX as f64 {
                    Err(SimError::InvalidTimeSamples(format!(
                        "discrete walks need non-negative integer steps, got {t}"
                    )))
                } else {
                    Ok(t as u64)
                }
            })
            .collect()
    }
}

/// States at each requested time, in the order the times were given.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    kind: WalkKind,
    times: Vec<f64>,
    states: Vec<State>,
}

impl Trajectory {
    /// Walk kind of every state in the trajectory.
    pub fn kind(&self) -> WalkKind {
        self.kind
    }

    /// Sample times.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// States, parallel to [`Trajectory::times`].
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// True if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// `(time, state)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &State)> + '_ {
        self.times.iter().copied().zip(self.states.iter())
    }

    /// State at the last requested sample.
    pub fn last(&self) -> Option<&State> {
        self.states.last()
    }
}

/// A strategy for advancing raw amplitudes under a generator.
pub trait Propagator: Send + Sync {
    /// Amplitudes at each of `times`, in order.
    fn propagate(
        &self,
        generator: &CsrMatrix,
        initial: &Array1<Complex64>,
        times: &TimeSamples,
    ) -> SimResult<Vec<Array1<Complex64>>>;
}

/// CTQW strategy: `ψ(t) = exp(−iHt)·ψ(0)` via the exponential action.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpActionPropagator;

impl Propagator for ExpActionPropagator {
    fn propagate(
        &self,
        generator: &CsrMatrix,
        initial: &Array1<Complex64>,
        times: &TimeSamples,
    ) -> SimResult<Vec<Array1<Complex64>>> {
        let kernel = ExpAction::new(generator);
        let mut current_time = 0.0;
        let mut current = initial.clone();
        let mut out = Vec::with_capacity(times.len());
        for &t in times.as_slice() {
            current = kernel.apply(&current, t - current_time);
            current_time = t;
            out.push(current.clone());
        }
        Ok(out)
    }
}

/// DTQW strategy: `ψ(t+1) = U·ψ(t)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitaryStepPropagator;

impl Propagator for UnitaryStepPropagator {
    fn propagate(
        &self,
        generator: &CsrMatrix,
        initial: &Array1<Complex64>,
        times: &TimeSamples,
    ) -> SimResult<Vec<Array1<Complex64>>> {
        let steps = times.as_steps()?;
        let requested: BTreeSet<u64> = steps.iter().copied().collect();
        let t_max = requested.last().copied().unwrap_or(0);

        let mut snapshots: BTreeMap<u64, Array1<Complex64>> = BTreeMap::new();
        let mut psi = initial.clone();
        let mut next = Array1::zeros(psi.len());
        if requested.contains(&0) {
            snapshots.insert(0, psi.clone());
        }
        for t in 1..=t_max {
            generator.mul_vec_into(psi.view(), next.view_mut());
            std::mem::swap(&mut psi, &mut next);
            if requested.contains(&t) {
                snapshots.insert(t, psi.clone());
            }
        }
        debug!(t_max, snapshots = snapshots.len(), "unitary stepping complete");

        Ok(steps
            .iter()
            .map(|t| snapshots[t].clone())
            .collect())
    }
}

/// Binds an operator to an initial state.
#[derive(Debug, Clone)]
pub struct Evolver {
    operator: Operator,
    initial: State,
}

impl Evolver {
    /// Pair `operator` with `initial`.
    ///
    /// Fails with [`SimError::DimensionMismatch`] unless the operator has
    /// `N` rows for an `N`-site CTQW state or `2N` rows for an `N`-site DTQW
    /// state, and both belong to the same walk kind.
    pub fn new(operator: Operator, initial: State) -> SimResult<Self> {
        let kind = initial.kind();
        let expected = kind.basis_dim(initial.num_sites());
        if operator.kind() != kind || operator.dim() != expected {
            return Err(SimError::DimensionMismatch {
                operator_rows: operator.dim(),
                expected,
                kind,
            });
        }
        Ok(Self { operator, initial })
    }

    /// The bound operator.
    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    /// The bound initial state.
    pub fn initial(&self) -> &State {
        &self.initial
    }

    /// Propagate to every sample in `times`.
    #[instrument(skip_all, fields(kind = %self.operator.kind(), samples = times.len()))]
    pub fn run(&self, times: &TimeSamples) -> SimResult<Trajectory> {
        let kind = self.operator.kind();
        let matrix = self.operator.matrix();
        let amplitudes = self.initial.amplitudes();
        let raw = match kind {
            WalkKind::Continuous => ExpActionPropagator.propagate(matrix, amplitudes, times)?,
            WalkKind::Discrete => UnitaryStepPropagator.propagate(matrix, amplitudes, times)?,
        };
        debug!(samples = raw.len(), "propagation complete");
        Ok(Trajectory {
            kind,
            times: times.as_slice().to_vec(),
            states: raw.into_iter().map(|a| State::from_raw(kind, a)).collect(),
        })
    }
}
