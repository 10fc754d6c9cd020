//! Free versus defected runs of the same walk.

use ndarray::{Array1, Axis, Zip};
use qwalk_sim::observables::{self, RegionAggregate, RegionBounds};
use qwalk_sim::{DefectSet, ProbabilityDistribution};
use tracing::info;

use crate::config::WalkConfig;
use crate::error::AnalysisResult;

/// Distributions of the free walk and the defected walk, sampled at the same
/// times from the same initial state.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedRun {
    free: ProbabilityDistribution,
    defected: ProbabilityDistribution,
}

impl PairedRun {
    /// The walk with only the baseline defects.
    pub fn free(&self) -> &ProbabilityDistribution {
        &self.free
    }

    /// The walk with the extra defects applied.
    pub fn defected(&self) -> &ProbabilityDistribution {
        &self.defected
    }

    /// Largest per-site probability difference at each sample.
    pub fn deviation(&self) -> Array1<f64> {
        let mut diff = self.defected.values().clone();
        Zip::from(&mut diff)
            .and(self.free.values())
            .for_each(|d, &f| *d = (*d - f).abs());
        diff.fold_axis(Axis(1), 0.0, |&m: &f64, &x: &f64| m.max(x))
    }

    /// Largest per-site probability difference over all samples.
    pub fn max_deviation(&self) -> f64 {
        self.deviation().fold(0.0, |m: f64, &x| m.max(x))
    }

    /// Region masses of both runs, `(free, defected)`.
    pub fn region_mass(&self, bounds: RegionBounds, buffer: usize) -> (RegionAggregate, RegionAggregate) {
        (
            observables::region_mass(&self.free, bounds, buffer),
            observables::region_mass(&self.defected, bounds, buffer),
        )
    }
}

/// Run `walk` with and without `defects`.
///
/// Both runs derive from one template operator; the free run uses it as is
/// and the defected run gets a copy with `defects` added. The two walks run
/// concurrently.
pub fn run_paired(walk: &WalkConfig, defects: &DefectSet) -> AnalysisResult<PairedRun> {
    let prepared = walk.prepare()?;
    defects.validate(prepared.lattice())?;
    let initial = *prepared.initial();

    let (free, defected) = rayon::join(
        || prepared.run(&DefectSet::new(), &initial),
        || prepared.run(defects, &initial),
    );
    let run = PairedRun {
        free: free?,
        defected: defected?,
    };
    info!(
        kind = %prepared.kind(),
        defects = defects.len(),
        max_deviation = run.max_deviation(),
        "paired run complete"
    );
    Ok(run)
}
