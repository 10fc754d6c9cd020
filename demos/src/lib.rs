//! qwalk Demo Suite
//!
//! Console front end for `qwalk-analysis`: runs parameter sweeps and
//! free-versus-defected comparisons described by YAML files (see
//! `demos/configs/`) and prints compact summaries.
//!
//! - **Sweeps**: origin probability, transmission, momentum transmission and
//!   trapping, with one series per DTQW coin.
//! - **Comparisons**: the same walk with and without extra defects, with
//!   optional region masses around the defects.

pub mod report;

use std::fmt::Display;
use std::path::Path;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use report::{RegionRow, SeriesSummary};

const RULE_WIDTH: usize = 60;
const LABEL_WIDTH: usize = 14;

/// Progress bar counting finished walks.
pub fn create_progress_bar(walks: u64) -> ProgressBar {
    let pb = ProgressBar::new(walks);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} walks ({eta})",
    )
    .map(|s| s.progress_chars("=>·"))
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

/// Title banner naming the run and its walk kind.
pub fn print_banner(title: &str, kind: impl Display) {
    let rule = style("━".repeat(RULE_WIDTH)).cyan();
    println!();
    println!("{rule}");
    println!(
        "  {} {}",
        style(title).cyan().bold(),
        style(format!("[{kind}]")).dim()
    );
    println!("{rule}");
}

/// Sub-heading inside a run.
pub fn print_heading(title: &str) {
    println!();
    println!("{}", style(title).green().bold().underlined());
}

/// Aligned `label value` line.
pub fn print_field(label: &str, value: impl Display) {
    println!("  {} {value}", style(format!("{label:<LABEL_WIDTH$}")).dim());
}

/// One sweep series: sparkline then its extremes.
pub fn print_series(summary: &SeriesSummary, spark: &str, parameter: &str) {
    println!(
        "  {} {spark}",
        style(format!("{:<LABEL_WIDTH$}", summary.label)).bold()
    );
    println!(
        "  {:<LABEL_WIDTH$} {}",
        "",
        style(format!(
            "min {:.4}  max {:.4} at {parameter} = {:.4}  mean {:.4}",
            summary.min, summary.max, summary.argmax, summary.mean
        ))
        .dim()
    );
}

/// One region row, with the defected mass coloured by its change.
pub fn print_region(row: &RegionRow) {
    let delta = row.defected - row.free;
    let defected = format!("{:.4} ({delta:+.4})", row.defected);
    let defected = if delta > 0.0 {
        style(defected).green()
    } else if delta < 0.0 {
        style(defected).red()
    } else {
        style(defected)
    };
    println!(
        "  {} {:.4} → {defected}",
        style(format!("{:<LABEL_WIDTH$}", row.name)).dim(),
        row.free
    );
}

/// Where a JSON file was written.
pub fn print_saved(path: &Path) {
    println!("{} saved {}", style("→").blue(), path.display());
}

/// Closing line with the wall-clock time.
pub fn print_done(message: &str, elapsed: Duration) {
    println!();
    println!(
        "{} {message} {}",
        style("✓").green().bold(),
        style(format!("in {elapsed:.2?}")).dim()
    );
}
