//! `qwalk-analysis`: experiments built on the `qwalk-sim` engine.
//!
//! - [`sweep`]: vary a defect strength or packet momentum and record one
//!   scalar per point (origin probability, transmitted mass), or record the
//!   mass caught between two defects over time.
//! - [`paired`]: run a walk with and without extra defects and compare.
//!
//! Both are driven by [`config`] types that load from YAML.

pub mod config;
pub mod error;
pub mod paired;
pub mod sweep;

pub use config::{
    CoinPreset, CompareConfig, ParameterRange, PreparedWalk, RegionConfig, SweepConfig, SweepKind,
    TimeGrid, WalkConfig,
};
pub use error::{AnalysisError, AnalysisResult};
pub use paired::{PairedRun, run_paired};
pub use sweep::{Series, SweepResult, num_runs, run_sweep, run_sweep_with};
