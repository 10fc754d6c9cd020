//! Parameter sweeps.
//!
//! Each parameter point is an independent walk: the template operator is
//! built once, each point derives its own defected copy, and points are
//! evaluated in parallel on the rayon thread pool.

use qwalk_sim::{DefectSet, InitialState, ProbabilityDistribution, WalkKind};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::{SweepConfig, SweepKind, offset_site, with_momentum};
use crate::error::AnalysisResult;

/// One measured curve, parallel to [`SweepResult::parameters`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Series label (walk kind or coin preset).
    pub label: String,
    /// Measured value per parameter.
    pub values: Vec<f64>,
}

/// Output of [`run_sweep`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    /// Name from the configuration.
    pub name: String,
    /// Walk kind.
    pub kind: WalkKind,
    /// Name of the swept parameter.
    pub parameter: String,
    /// Name of the measured quantity.
    pub measure: String,
    /// Parameter values.
    pub parameters: Vec<f64>,
    /// One series per initial coin (a single series for CTQW).
    pub series: Vec<Series>,
}

impl SweepResult {
    /// Series by label.
    pub fn series(&self, label: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.label == label)
    }

    /// Number of parameter points.
    pub fn num_points(&self) -> usize {
        self.parameters.len()
    }
}

/// Number of walks [`run_sweep`] performs for `config`.
pub fn num_runs(config: &SweepConfig) -> usize {
    let series = config.coins.len().max(1);
    match &config.sweep {
        SweepKind::OriginProbability { strengths } | SweepKind::Transmission { strengths, .. } => {
            series * strengths.num
        }
        SweepKind::MomentumTransmission { momenta, .. } => series * momenta.num,
        SweepKind::Trapping { .. } => series,
    }
}

/// Run a sweep.
pub fn run_sweep(config: &SweepConfig) -> AnalysisResult<SweepResult> {
    run_sweep_with(config, || {})
}

/// Run a sweep, calling `on_run` after every completed walk.
///
/// `on_run` is called from worker threads, in no particular order.
#[instrument(skip_all, fields(name = %config.name))]
pub fn run_sweep_with<F>(config: &SweepConfig, on_run: F) -> AnalysisResult<SweepResult>
where
    F: Fn() + Sync,
{
    let walk = config.prepare()?;
    let series_states = config.series_initial_states();
    info!(
        kind = %walk.kind(),
        sites = walk.lattice().num_sites(),
        runs = num_runs(config),
        "starting sweep"
    );

    let n = walk.lattice().num_sites();
    let (parameters, series) = match &config.sweep {
        SweepKind::OriginProbability { strengths } => {
            let parameters = strengths.values();
            let series = sweep_series(&series_states, &parameters, &on_run, |initial, strength| {
                let center = initial.center;
                let dist = walk.run(&DefectSet::new().with_defect(center, strength), initial)?;
                Ok(dist.last()[center])
            })?;
            (parameters, series)
        }
        SweepKind::Transmission {
            defect_offset,
            strengths,
        } => {
            let parameters = strengths.values();
            let series = sweep_series(&series_states, &parameters, &on_run, |initial, strength| {
                let site = offset_site(initial.center, *defect_offset, n)?;
                let dist = walk.run(&DefectSet::new().with_defect(site, strength), initial)?;
                Ok(final_mass_from(&dist, site))
            })?;
            (parameters, series)
        }
        SweepKind::MomentumTransmission {
            defect_offset,
            strength,
            momenta,
        } => {
            let parameters = momenta.values();
            let series = sweep_series(&series_states, &parameters, &on_run, |initial, k| {
                let site = offset_site(initial.center, *defect_offset, n)?;
                let defects = DefectSet::new().with_defect(site, *strength);
                let dist = walk.run(&defects, &with_momentum(initial, k))?;
                Ok(final_mass_from(&dist, site))
            })?;
            (parameters, series)
        }
        SweepKind::Trapping {
            lower,
            upper,
            strength,
        } => {
            // The parameter axis is time: one walk per series.
            let defects = DefectSet::uniform([*lower, *upper], *strength);
            let series = series_states
                .par_iter()
                .map(|(label, initial)| {
                    let dist = walk.run(&defects, initial)?;
                    on_run();
                    Ok(Series {
                        label: label.clone(),
                        values: dist.mass_in(lower + 1..*upper).to_vec(),
                    })
                })
                .collect::<AnalysisResult<Vec<_>>>()?;
            (walk.samples().as_slice().to_vec(), series)
        }
    };

    info!(points = parameters.len(), series = series.len(), "sweep complete");
    Ok(SweepResult {
        name: config.name.clone(),
        kind: walk.kind(),
        parameter: config.sweep.parameter_name().to_string(),
        measure: config.sweep.measure_name().to_string(),
        parameters,
        series,
    })
}

/// Evaluate `measure` at every parameter for every series, in parallel.
fn sweep_series<M, F>(
    series_states: &[(String, InitialState)],
    parameters: &[f64],
    on_run: &F,
    measure: M,
) -> AnalysisResult<Vec<Series>>
where
    M: Fn(&InitialState, f64) -> AnalysisResult<f64> + Sync,
    F: Fn() + Sync,
{
    let measure = &measure;
    let values = series_states
        .par_iter()
        .flat_map(|(label, initial)| {
            parameters.par_iter().map(move |&p| {
                let value = measure(initial, p)?;
                debug!(series = %label, parameter = p, value, "sweep point");
                on_run();
                Ok(value)
            })
        })
        .collect::<AnalysisResult<Vec<_>>>()?;

    Ok(series_states
        .iter()
        .zip(values.chunks(parameters.len().max(1)))
        .map(|((label, _), chunk)| Series {
            label: label.clone(),
            values: chunk.to_vec(),
        })
        .collect())
}

/// Mass on sites `>= site` at the last sample.
fn final_mass_from(dist: &ProbabilityDistribution, site: usize) -> f64 {
    let last = dist.num_times() - 1;
    dist.mass_in(site..dist.num_sites())[last]
}
