//! Probability observables derived from trajectories.
//!
//! Arrays are laid out time-first: row `i` of a [`ProbabilityDistribution`]
//! is the position distribution at `times()[i]`, and row `i` of a
//! [`RegionAggregate`] holds the per-region masses at that time.

use std::ops::Range;

use ndarray::{Array1, Array2, ArrayView1, Axis, s};

use crate::propagator::Trajectory;

/// Position probabilities over time, shape `(times, sites)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityDistribution {
    times: Vec<f64>,
    values: Array2<f64>,
}

impl ProbabilityDistribution {
    /// Sample times, parallel to the rows.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// The `(times, sites)` matrix.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of time samples.
    pub fn num_times(&self) -> usize {
        self.values.nrows()
    }

    /// Number of lattice sites.
    pub fn num_sites(&self) -> usize {
        self.values.ncols()
    }

    /// Distribution at time index `i`.
    ///
    /// # Panics
    /// Panics if `i >= num_times()`.
    pub fn at(&self, i: usize) -> ArrayView1<'_, f64> {
        self.values.row(i)
    }

    /// Distribution at the last sample.
    pub fn last(&self) -> ArrayView1<'_, f64> {
        self.values.row(self.num_times() - 1)
    }

    /// Total probability per time sample.
    pub fn total_mass(&self) -> Array1<f64> {
        self.values.sum_axis(Axis(1))
    }

    /// Mass on `sites` per time sample. The range is clamped to the lattice.
    pub fn mass_in(&self, sites: Range<usize>) -> Array1<f64> {
        let sites = clamp_range(sites, self.num_sites());
        self.values.slice(s![.., sites]).sum_axis(Axis(1))
    }
}

/// Convert every state of `trajectory` into position probabilities.
///
/// CTQW states give `|ψ_j|²`; DTQW states sum the two coin branches of
/// each site.
pub fn probabilities(trajectory: &Trajectory) -> ProbabilityDistribution {
    let num_sites = trajectory.states().first().map_or(0, |s| s.num_sites());
    let mut values = Array2::zeros((trajectory.len(), num_sites));
    for (mut row, state) in values.rows_mut().into_iter().zip(trajectory.states()) {
        row.assign(&state.position_probabilities());
    }
    ProbabilityDistribution {
        times: trajectory.times().to_vec(),
        values,
    }
}

/// Boundary sites for [`region_mass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionBounds {
    /// One boundary, e.g. a single defect.
    Single(usize),
    /// Two boundaries, e.g. a pair of defects enclosing a trap.
    Pair {
        /// Lower boundary site.
        lower: usize,
        /// Upper boundary site.
        upper: usize,
    },
}

/// Region name: sites left of `lower − buffer`.
pub const LEFT: &str = "left";
/// Region name: sites strictly inside `(lower + buffer, upper − buffer)`.
pub const BETWEEN: &str = "between";
/// Region name: sites right of `upper + buffer`.
pub const RIGHT: &str = "right";
/// Region name: boundary sites and their exclusion zones.
pub const BUFFER: &str = "buffer";

/// Named site regions with their mass over time, shape `(times, regions)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionAggregate {
    names: Vec<String>,
    sites: Vec<Vec<Range<usize>>>,
    times: Vec<f64>,
    masses: Array2<f64>,
}

impl RegionAggregate {
    /// Region names, parallel to the columns.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Sample times, parallel to the rows.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// The `(times, regions)` mass matrix.
    pub fn masses(&self) -> &Array2<f64> {
        &self.masses
    }

    /// Mass of region `name` over time.
    pub fn region(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.column(name).map(|col| self.masses.column(col))
    }

    /// Site ranges covered by region `name`.
    pub fn sites(&self, name: &str) -> Option<&[Range<usize>]> {
        self.column(name).map(|col| self.sites[col].as_slice())
    }

    /// Sum over all regions per time sample.
    pub fn total(&self) -> Array1<f64> {
        self.masses.sum_axis(Axis(1))
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

/// Partition the lattice around one or two boundaries and sum the mass of
/// each part at every sample.
///
/// Bounds are clamped to `[0, N)` and swapped if given in reverse. With
/// `lower ≤ upper` and buffer `b`:
///
/// | region    | sites                         |
/// |-----------|-------------------------------|
/// | `left`    | `j < lower − b`               |
/// | `between` | `lower + b < j < upper − b`   |
/// | `right`   | `j > upper + b`               |
/// | `buffer`  | everything else               |
///
/// The four regions cover every site exactly once, so their masses add up
/// to the distribution's total mass. A region that comes out empty (for
/// example `between` when `2b` exceeds the gap) has zero mass.
pub fn region_mass(
    distribution: &ProbabilityDistribution,
    bounds: RegionBounds,
    buffer: usize,
) -> RegionAggregate {
    let n = distribution.num_sites();
    let last = n.saturating_sub(1);
    let (lower, upper) = match bounds {
        RegionBounds::Single(site) => (site.min(last), site.min(last)),
        RegionBounds::Pair { lower, upper } => {
            let (a, b) = (lower.min(last), upper.min(last));
            (a.min(b), a.max(b))
        }
    };

    // left.end ≤ lower ≤ upper < right.start, so the buffer is never empty.
    let left = 0..lower.saturating_sub(buffer);
    let right = upper.saturating_add(buffer).saturating_add(1).min(n)..n;
    let inner = lower.saturating_add(buffer).saturating_add(1)..upper.saturating_sub(buffer);
    let (between, buffer_sites) = if inner.start < inner.end {
        let zones = vec![left.end..inner.start, inner.end..right.start];
        (inner, zones)
    } else {
        (0..0, vec![left.end..right.start])
    };
    let buffer_sites = drop_empty(buffer_sites);

    aggregate(
        distribution,
        vec![
            (LEFT.to_string(), vec![left]),
            (BETWEEN.to_string(), vec![between]),
            (RIGHT.to_string(), vec![right]),
            (BUFFER.to_string(), buffer_sites),
        ],
    )
}

/// Sum mass over arbitrary named site ranges (clamped to the lattice).
///
/// Ranges may overlap or leave gaps; nothing is implied about coverage.
pub fn custom_region_mass<S: Into<String>>(
    distribution: &ProbabilityDistribution,
    regions: impl IntoIterator<Item = (S, Range<usize>)>,
) -> RegionAggregate {
    let n = distribution.num_sites();
    let regions = regions
        .into_iter()
        .map(|(name, sites)| (name.into(), vec![clamp_range(sites, n)]))
        .collect();
    aggregate(distribution, regions)
}

fn aggregate(
    distribution: &ProbabilityDistribution,
    regions: Vec<(String, Vec<Range<usize>>)>,
) -> RegionAggregate {
    let mut masses = Array2::zeros((distribution.num_times(), regions.len()));
    for (col, (_, ranges)) in regions.iter().enumerate() {
        for range in ranges {
            let mass = distribution.mass_in(range.clone());
            let mut column = masses.column_mut(col);
            column += &mass;
        }
    }
    let (names, sites): (Vec<String>, Vec<Vec<Range<usize>>>) = regions.into_iter().unzip();
    RegionAggregate {
        names,
        sites,
        times: distribution.times().to_vec(),
        masses,
    }
}

fn clamp_range(range: Range<usize>, n: usize) -> Range<usize> {
    let end = range.end.min(n);
    range.start.min(end)..end
}

fn drop_empty(ranges: Vec<Range<usize>>) -> Vec<Range<usize>> {
    ranges.into_iter().filter(|r| r.start < r.end).collect()
}
