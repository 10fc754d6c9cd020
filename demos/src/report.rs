//! Summaries of sweep and comparison results for console output.

use qwalk_analysis::{PairedRun, RegionConfig, Series, SweepResult};
use serde::Serialize;

const SPARK: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Extremes and mean of one sweep series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    /// Series label.
    pub label: String,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Parameter at which the largest value occurs.
    pub argmax: f64,
    /// Mean over all points.
    pub mean: f64,
}

/// Summarise `series` against its parameter axis.
///
/// Returns `None` for an empty series.
pub fn summarize_series(parameters: &[f64], series: &Series) -> Option<SeriesSummary> {
    let (best, max) = series
        .values
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(&b.1))?;
    let min = series.values.iter().copied().fold(f64::INFINITY, f64::min);
    let mean = series.values.iter().sum::<f64>() / series.values.len() as f64;
    Some(SeriesSummary {
        label: series.label.clone(),
        min,
        max,
        argmax: parameters.get(best).copied().unwrap_or(f64::NAN),
        mean,
    })
}

/// Summaries for every series of `result`.
pub fn summarize_sweep(result: &SweepResult) -> Vec<SeriesSummary> {
    result
        .series
        .iter()
        .filter_map(|s| summarize_series(&result.parameters, s))
        .collect()
}

/// One-line bar chart of `values`, scaled between their min and max.
pub fn sparkline(values: &[f64]) -> String {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    values
        .iter()
        .map(|&v| {
            if span.is_nan() || span <= 0.0 {
                return SPARK[0];
            }
            let level = ((v - min) / span * (SPARK.len() - 1) as f64).round() as usize;
            SPARK[level.min(SPARK.len() - 1)]
        })
        .collect()
}

/// Final-time mass of one region in both runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRow {
    /// Region name.
    pub name: String,
    /// Mass in the free run.
    pub free: f64,
    /// Mass in the defected run.
    pub defected: f64,
}

/// Condensed view of a [`PairedRun`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedSummary {
    /// Largest per-site probability difference over all samples.
    pub max_deviation: f64,
    /// Total mass of the free run at the last sample.
    pub final_free_mass: f64,
    /// Total mass of the defected run at the last sample.
    pub final_defected_mass: f64,
    /// Region masses at the last sample, when regions were requested.
    pub regions: Vec<RegionRow>,
}

/// Summarise a paired run, with region masses if `regions` is given.
pub fn summarize_paired(run: &PairedRun, regions: Option<&RegionConfig>) -> PairedSummary {
    let rows = regions
        .map(|cfg| {
            let (free, defected) = run.region_mass(cfg.bounds(), cfg.buffer);
            free.names()
                .iter()
                .map(|name| RegionRow {
                    name: name.clone(),
                    free: free.region(name).and_then(|m| m.iter().last().copied()).unwrap_or(0.0),
                    defected: defected
                        .region(name)
                        .and_then(|m| m.iter().last().copied())
                        .unwrap_or(0.0),
                })
                .collect()
        })
        .unwrap_or_default();
    PairedSummary {
        max_deviation: run.max_deviation(),
        final_free_mass: run.free().total_mass().iter().last().copied().unwrap_or(0.0),
        final_defected_mass: run
            .defected()
            .total_mass()
            .iter()
            .last()
            .copied()
            .unwrap_or(0.0),
        regions: rows,
    }
}
