//! Initial quantum states.
//!
//! - **Delta**: all amplitude on one site. For DTQW the amplitude is split
//!   across the two coin branches by a [`CoinState`].
//! - **Gaussian** (CTQW only): `ψ_j ∝ exp(−(j−c)²/(2σ²)) · exp(i·k·j)`.
//!
//! Every constructed [`State`] is normalised to unit L2 norm.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use ndarray::Array1;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::lattice::LatticeSpec;
use crate::operator::WalkKind;

/// Two-component coin vector `[branch 0, branch 1]` for DTQW.
///
/// Branch 0 moves right, branch 1 moves left. The vector need not be
/// normalised; the state built from it is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoinState(pub [Complex64; 2]);

impl CoinState {
    /// Create from raw branch amplitudes.
    pub fn new(right: Complex64, left: Complex64) -> Self {
        Self([right, left])
    }

    /// `(|0⟩ + i|1⟩)/√2`: equal weight, +90° relative phase.
    ///
    /// This coin makes the free Hadamard walk spread symmetrically.
    pub fn balanced() -> Self {
        Self([
            Complex64::new(FRAC_1_SQRT_2, 0.0),
            Complex64::new(0.0, FRAC_1_SQRT_2),
        ])
    }

    /// Pure branch 0, `|0⟩`.
    pub fn up() -> Self {
        Self([Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)])
    }

    /// Pure branch 1, `|1⟩`.
    pub fn down() -> Self {
        Self([Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)])
    }

    fn norm(&self) -> f64 {
        (self.0[0].norm_sqr() + self.0[1].norm_sqr()).sqrt()
    }
}

impl Default for CoinState {
    fn default() -> Self {
        Self::balanced()
    }
}

/// Spatial profile of an initial state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Profile {
    /// Localised on a single site.
    #[default]
    Delta,
    /// Gaussian envelope with a plane-wave phase.
    Gaussian {
        /// Width σ in sites.
        spread: f64,
        /// Lattice momentum k, |k| < π.
        momentum: f64,
    },
}

/// Recipe for an initial state: profile, center site, optional coin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialState {
    /// Spatial profile.
    #[serde(default)]
    pub profile: Profile,
    /// Center site.
    pub center: usize,
    /// Coin vector for DTQW; `None` means [`CoinState::balanced`]. Ignored
    /// for CTQW.
    #[serde(default)]
    pub coin: Option<CoinState>,
}

impl InitialState {
    /// A delta state at `center`.
    pub fn delta(center: usize) -> Self {
        Self {
            profile: Profile::Delta,
            center,
            coin: None,
        }
    }

    /// A Gaussian wave packet at `center`.
    pub fn gaussian(center: usize, spread: f64, momentum: f64) -> Self {
        Self {
            profile: Profile::Gaussian { spread, momentum },
            center,
            coin: None,
        }
    }

    /// Set the DTQW coin vector.
    #[must_use]
    pub fn with_coin(mut self, coin: CoinState) -> Self {
        self.coin = Some(coin);
        self
    }
}

/// A normalised state vector of length `N` (CTQW) or `2N` (DTQW).
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    kind: WalkKind,
    amplitudes: Array1<Complex64>,
}

impl State {
    pub(crate) fn from_raw(kind: WalkKind, amplitudes: Array1<Complex64>) -> Self {
        Self { kind, amplitudes }
    }

    /// Walk kind this state belongs to.
    pub fn kind(&self) -> WalkKind {
        self.kind
    }

    /// Raw amplitudes. For DTQW, index `2·site + coin`.
    pub fn amplitudes(&self) -> &Array1<Complex64> {
        &self.amplitudes
    }

    /// Length of the state vector.
    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    /// True for a zero-length vector (never produced by [`init`]).
    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    /// Number of lattice sites the state spans.
    pub fn num_sites(&self) -> usize {
        match self.kind {
            WalkKind::Continuous => self.amplitudes.len(),
            WalkKind::Discrete => self.amplitudes.len() / 2,
        }
    }

    /// `Σ |a|²`.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr()).sum()
    }

    /// Position probabilities, coin branches summed for DTQW.
    pub fn position_probabilities(&self) -> Array1<f64> {
        match self.kind {
            WalkKind::Continuous => self.amplitudes.mapv(|a| a.norm_sqr()),
            WalkKind::Discrete => Array1::from_iter((0..self.num_sites()).map(|site| {
                self.amplitudes[2 * site].norm_sqr() + self.amplitudes[2 * site + 1].norm_sqr()
            })),
        }
    }
}

/// Build a normalised initial state on `lattice` for a walk of `kind`.
pub fn init(lattice: &LatticeSpec, kind: WalkKind, initial: &InitialState) -> SimResult<State> {
    let n = lattice.num_sites();
    let center = initial.center;
    if !lattice.contains(center) {
        return Err(SimError::InvalidCenter {
            center,
            num_sites: n,
        });
    }

    let mut amplitudes = match (initial.profile, kind) {
        (Profile::Delta, WalkKind::Continuous) => {
            let mut psi = Array1::zeros(n);
            psi[center] = Complex64::new(1.0, 0.0);
            psi
        }
        (Profile::Delta, WalkKind::Discrete) => {
            let coin = initial.coin.unwrap_or_default();
            let coin_norm = coin.norm();
            if !coin_norm.is_finite() || coin_norm == 0.0 {
                return Err(SimError::InvalidCoin);
            }
            let mut psi = Array1::zeros(2 * n);
            psi[2 * center] = coin.0[0];
            psi[2 * center + 1] = coin.0[1];
            psi
        }
        (Profile::Gaussian { spread, momentum }, WalkKind::Continuous) => {
            gaussian_packet(n, center, spread, momentum)?
        }
        (Profile::Gaussian { .. }, WalkKind::Discrete) => {
            return Err(SimError::UnsupportedProfile { kind });
        }
    };

    let norm = amplitudes.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
    amplitudes.mapv_inplace(|a| a / norm);
    Ok(State::from_raw(kind, amplitudes))
}

fn gaussian_packet(
    n: usize,
    center: usize,
    spread: f64,
    momentum: f64,
) -> SimResult<Array1<Complex64>> {
    if !spread.is_finite() || spread <= 0.0 {
        return Err(SimError::InvalidSpread(spread));
    }
    // Beyond the first Brillouin zone the phase aliases onto a smaller k.
    if !momentum.is_finite() || momentum.abs() >= PI {
        return Err(SimError::InvalidMomentum(momentum));
    }
    let c = center as f64;
    Ok(Array1::from_iter((0..n).map(|j| {
        let x = j as f64;
        let envelope = (-(x - c).powi(2) / (2.0 * spread * spread)).exp();
        Complex64::from_polar(envelope, momentum * x)
    })))
}
