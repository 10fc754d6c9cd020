//! YAML configuration for sweeps and comparisons.
//!
//! A configuration file describes one walk (lattice, walk kind, initial
//! state, baseline defects, sample times) plus either a parameter sweep or a
//! set of extra defects to compare against the free walk:
//!
//! ```yaml
//! name: localization
//! walk:
//!   num_sites: 201
//!   kind: continuous
//!   initial: { center: 100 }
//!   times: { type: range, t_max: 40 }
//! sweep:
//!   type: origin_probability
//!   strengths: { start: -15.0, stop: 15.0, num: 60 }
//! ```
//!
//! Loading validates eagerly: everything that would fail inside a run is
//! reported by [`SweepConfig::from_yaml`] or [`CompareConfig::from_yaml`].

use std::path::Path;

use qwalk_sim::observables::{self, RegionBounds};
use qwalk_sim::state::{self, CoinState, InitialState, Profile};
use qwalk_sim::{
    DefectSet, Evolver, LatticeSpec, Operator, ProbabilityDistribution, TimeSamples, WalkKind,
    operator,
};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::error::{AnalysisError, AnalysisResult};

/// Sample times for a walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimeGrid {
    /// Every integer time `0..=t_max`.
    Range {
        /// Last sample.
        t_max: u64,
    },
    /// `num` evenly spaced samples, endpoints included.
    Linspace {
        /// First sample.
        start: f64,
        /// Last sample.
        stop: f64,
        /// Number of samples.
        num: usize,
    },
    /// Samples given one by one.
    Explicit {
        /// Sample times in evaluation order.
        values: Vec<f64>,
    },
}

impl TimeGrid {
    /// Expand into engine time samples.
    pub fn samples(&self) -> AnalysisResult<TimeSamples> {
        let samples = match self {
            TimeGrid::Range { t_max } => TimeSamples::range(*t_max),
            TimeGrid::Linspace { start, stop, num } => TimeSamples::linspace(*start, *stop, *num)?,
            TimeGrid::Explicit { values } => TimeSamples::new(values.clone())?,
        };
        Ok(samples)
    }
}

/// An evenly spaced parameter axis, endpoints included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    /// First value.
    pub start: f64,
    /// Last value.
    pub stop: f64,
    /// Number of values.
    pub num: usize,
}

impl ParameterRange {
    /// Create a range.
    pub fn new(start: f64, stop: f64, num: usize) -> Self {
        Self { start, stop, num }
    }

    /// The parameter values.
    pub fn values(&self) -> Vec<f64> {
        match self.num {
            0 => Vec::new(),
            1 => vec![self.start],
            n => {
                let step = (self.stop - self.start) / (n - 1) as f64;
                (0..n).map(|i| self.start + step * i as f64).collect()
            }
        }
    }

    fn validate(&self, what: &str) -> AnalysisResult<()> {
        if self.num == 0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "{what} range needs at least one value"
            )));
        }
        if !self.start.is_finite() || !self.stop.is_finite() {
            return Err(AnalysisError::InvalidConfig(format!(
                "{what} range endpoints must be finite"
            )));
        }
        Ok(())
    }
}

/// Coin vector choice for DTQW sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoinPreset {
    /// `(|0⟩ + i|1⟩)/√2`.
    Balanced,
    /// `|0⟩`.
    Up,
    /// `|1⟩`.
    Down,
    /// Arbitrary amplitudes, written as a single-key map in YAML:
    /// `custom: [[re, im], [re, im]]`.
    Custom(CoinState),
}

impl CoinPreset {
    /// The coin vector.
    pub fn state(&self) -> CoinState {
        match self {
            CoinPreset::Balanced => CoinState::balanced(),
            CoinPreset::Up => CoinState::up(),
            CoinPreset::Down => CoinState::down(),
            CoinPreset::Custom(coin) => *coin,
        }
    }

    /// Series label used in results.
    pub fn label(&self) -> &'static str {
        match self {
            CoinPreset::Balanced => "balanced",
            CoinPreset::Up => "up",
            CoinPreset::Down => "down",
            CoinPreset::Custom(_) => "custom",
        }
    }
}

/// One walk: lattice, kind, initial state, baseline defects and times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkConfig {
    /// Number of lattice sites.
    pub num_sites: usize,
    /// CTQW or DTQW.
    pub kind: WalkKind,
    /// Initial-state recipe.
    pub initial: InitialState,
    /// Defects present in every run of this walk.
    #[serde(default)]
    pub defects: DefectSet,
    /// Sample times.
    pub times: TimeGrid,
}

impl WalkConfig {
    /// Validate and build everything that is shared between runs.
    pub fn prepare(&self) -> AnalysisResult<PreparedWalk> {
        let lattice = LatticeSpec::new(self.num_sites)?;
        let template = operator::build(&lattice, &self.defects, self.kind)?;
        let samples = self.times.samples()?;
        if self.kind == WalkKind::Discrete {
            samples.as_steps()?;
        }
        state::init(&lattice, self.kind, &self.initial)?;
        Ok(PreparedWalk {
            lattice,
            template,
            samples,
            initial: self.initial,
        })
    }
}

/// A validated walk with its template operator built once.
///
/// Runs derive their operator from the template with copy-on-write, so the
/// template itself is shared read-only between parallel runs.
#[derive(Debug, Clone)]
pub struct PreparedWalk {
    lattice: LatticeSpec,
    template: Operator,
    samples: TimeSamples,
    initial: InitialState,
}

impl PreparedWalk {
    /// The lattice.
    pub fn lattice(&self) -> &LatticeSpec {
        &self.lattice
    }

    /// Template operator with only the baseline defects.
    pub fn template(&self) -> &Operator {
        &self.template
    }

    /// Sample times.
    pub fn samples(&self) -> &TimeSamples {
        &self.samples
    }

    /// Configured initial state.
    pub fn initial(&self) -> &InitialState {
        &self.initial
    }

    /// Walk kind.
    pub fn kind(&self) -> WalkKind {
        self.template.kind()
    }

    /// Run with `extra` defects on top of the baseline, from `initial`.
    pub fn run(
        &self,
        extra: &DefectSet,
        initial: &InitialState,
    ) -> AnalysisResult<ProbabilityDistribution> {
        let op = if extra.is_empty() {
            self.template.clone()
        } else {
            self.template.with_defects(extra)?
        };
        let psi = state::init(&self.lattice, self.kind(), initial)?;
        let trajectory = Evolver::new(op, psi)?.run(&self.samples)?;
        Ok(observables::probabilities(&trajectory))
    }
}

/// What a sweep varies and what it measures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SweepKind {
    /// Defect at the initial center; final probability at the center.
    OriginProbability {
        /// Defect strengths to try.
        strengths: ParameterRange,
    },
    /// Defect at `center + defect_offset`; final mass at and beyond it.
    Transmission {
        /// Signed distance from the initial center to the defect.
        defect_offset: isize,
        /// Defect strengths to try.
        strengths: ParameterRange,
    },
    /// Like [`SweepKind::Transmission`] for a Gaussian packet with varying
    /// momentum and a fixed defect.
    MomentumTransmission {
        /// Signed distance from the initial center to the defect.
        defect_offset: isize,
        /// Defect strength.
        strength: f64,
        /// Packet momenta to try.
        momenta: ParameterRange,
    },
    /// Defects at `lower` and `upper`; mass strictly between them at every
    /// sample time. Neither defect site is counted: the measure is the
    /// mass on `lower + 1..upper`, not `lower..upper`.
    Trapping {
        /// Lower defect site.
        lower: usize,
        /// Upper defect site.
        upper: usize,
        /// Strength at both sites.
        strength: f64,
    },
}

impl SweepKind {
    /// Name of the swept parameter.
    pub fn parameter_name(&self) -> &'static str {
        match self {
            SweepKind::OriginProbability { .. } | SweepKind::Transmission { .. } => "strength",
            SweepKind::MomentumTransmission { .. } => "momentum",
            SweepKind::Trapping { .. } => "time",
        }
    }

    /// Name of the measured quantity.
    pub fn measure_name(&self) -> &'static str {
        match self {
            SweepKind::OriginProbability { .. } => "origin_probability",
            SweepKind::Transmission { .. } | SweepKind::MomentumTransmission { .. } => {
                "transmitted_mass"
            }
            SweepKind::Trapping { .. } => "trapped_mass",
        }
    }
}

/// A full sweep description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Free-form name carried into the result.
    #[serde(default)]
    pub name: String,
    /// The walk being swept.
    pub walk: WalkConfig,
    /// Parameter axis and measurement.
    pub sweep: SweepKind,
    /// DTQW only: one result series per coin. Empty means the coin in
    /// `walk.initial`.
    #[serde(default, with = "serde_yaml_ng::with::singleton_map_recursive")]
    pub coins: Vec<CoinPreset>,
}

impl SweepConfig {
    /// Parse and validate YAML text.
    pub fn from_yaml(text: &str) -> AnalysisResult<Self> {
        let config: Self = parse_yaml(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AnalysisResult<Self> {
        Self::from_yaml(&read_file(path)?)
    }

    /// Check the configuration describes a runnable sweep.
    pub fn validate(&self) -> AnalysisResult<()> {
        self.prepare().map(|_| ())
    }

    /// Validate the sweep and build the walk state shared by its runs.
    pub fn prepare(&self) -> AnalysisResult<PreparedWalk> {
        let walk = self.walk.prepare()?;
        let kind = self.walk.kind;
        if !self.coins.is_empty() && kind == WalkKind::Continuous {
            return Err(AnalysisError::InvalidConfig(
                "coins only apply to discrete walks".into(),
            ));
        }
        let n = self.walk.num_sites;
        match &self.sweep {
            SweepKind::OriginProbability { strengths } => strengths.validate("strength")?,
            SweepKind::Transmission {
                defect_offset,
                strengths,
            } => {
                strengths.validate("strength")?;
                offset_site(self.walk.initial.center, *defect_offset, n)?;
            }
            SweepKind::MomentumTransmission {
                defect_offset,
                strength,
                momenta,
            } => {
                momenta.validate("momentum")?;
                if !strength.is_finite() {
                    return Err(AnalysisError::InvalidConfig(format!(
                        "defect strength must be finite, got {strength}"
                    )));
                }
                if kind != WalkKind::Continuous
                    || !matches!(self.walk.initial.profile, Profile::Gaussian { .. })
                {
                    return Err(AnalysisError::InvalidConfig(
                        "momentum sweeps need a continuous walk with a gaussian initial state".into(),
                    ));
                }
                offset_site(self.walk.initial.center, *defect_offset, n)?;
                // Every momentum must give a valid packet.
                for k in momenta.values() {
                    state::init(
                        walk.lattice(),
                        kind,
                        &with_momentum(&self.walk.initial, k),
                    )?;
                }
            }
            SweepKind::Trapping {
                lower,
                upper,
                strength,
            } => {
                if lower >= upper || *upper >= n {
                    return Err(AnalysisError::InvalidConfig(format!(
                        "trap needs lower < upper < {n}, got {lower}..{upper}"
                    )));
                }
                if !strength.is_finite() {
                    return Err(AnalysisError::InvalidConfig(format!(
                        "defect strength must be finite, got {strength}"
                    )));
                }
            }
        }
        Ok(walk)
    }

    /// The `(label, initial state)` pairs that become result series.
    pub fn series_initial_states(&self) -> Vec<(String, InitialState)> {
        if self.coins.is_empty() {
            let label = match self.walk.kind {
                WalkKind::Continuous => "ctqw",
                WalkKind::Discrete => "dtqw",
            };
            return vec![(label.to_string(), self.walk.initial)];
        }
        self.coins
            .iter()
            .map(|coin| {
                (
                    coin.label().to_string(),
                    self.walk.initial.with_coin(coin.state()),
                )
            })
            .collect()
    }
}

/// Region reporting for a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Lower boundary site (or the only one).
    pub lower: usize,
    /// Upper boundary site; `None` for a single boundary.
    #[serde(default)]
    pub upper: Option<usize>,
    /// Exclusion zone around each boundary.
    #[serde(default)]
    pub buffer: usize,
}

impl RegionConfig {
    /// Boundaries for [`observables::region_mass`].
    pub fn bounds(&self) -> RegionBounds {
        match self.upper {
            Some(upper) => RegionBounds::Pair {
                lower: self.lower,
                upper,
            },
            None => RegionBounds::Single(self.lower),
        }
    }
}

/// A free-vs-defected comparison description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareConfig {
    /// Free-form name carried into the report.
    #[serde(default)]
    pub name: String,
    /// The walk; its own defects are present in both runs.
    pub walk: WalkConfig,
    /// Defects added for the defected run only.
    pub defects: DefectSet,
    /// Optional region masses to report.
    #[serde(default)]
    pub regions: Option<RegionConfig>,
}

impl CompareConfig {
    /// Parse and validate YAML text.
    pub fn from_yaml(text: &str) -> AnalysisResult<Self> {
        let config: Self = parse_yaml(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AnalysisResult<Self> {
        Self::from_yaml(&read_file(path)?)
    }

    /// Check the configuration describes a runnable comparison.
    pub fn validate(&self) -> AnalysisResult<()> {
        let prepared = self.walk.prepare()?;
        self.defects.validate(prepared.lattice())?;
        Ok(())
    }
}

/// Defect site at `center + offset`, checked against the lattice.
pub(crate) fn offset_site(center: usize, offset: isize, num_sites: usize) -> AnalysisResult<usize> {
    center
        .checked_add_signed(offset)
        .filter(|&site| site < num_sites)
        .ok_or_else(|| {
            AnalysisError::InvalidConfig(format!(
                "defect offset {offset} from center {center} leaves the lattice [0, {num_sites})"
            ))
        })
}

/// `initial` with its Gaussian momentum replaced by `k`.
pub(crate) fn with_momentum(initial: &InitialState, k: f64) -> InitialState {
    let mut out = *initial;
    if let Profile::Gaussian { spread, .. } = initial.profile {
        out.profile = Profile::Gaussian {
            spread,
            momentum: k,
        };
    }
    out
}

fn parse_yaml<T: DeserializeOwned>(text: &str) -> AnalysisResult<T> {
    serde_yaml_ng::from_str(text).map_err(|e| AnalysisError::Config(e.to_string()))
}

fn read_file<P: AsRef<Path>>(path: P) -> AnalysisResult<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path)
        .map_err(|e| AnalysisError::Io(format!("{}: {e}", path.display())))
}
