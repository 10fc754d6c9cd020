//! Quantum Walk Demo
//!
//! Runs a parameter sweep or a free-versus-defected comparison from a YAML
//! configuration and prints a summary:
//!
//! ```text
//! qwalk-demo sweep demos/configs/localization.yaml --output results/
//! qwalk-demo compare demos/configs/compare_trapping.yaml
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use qwalk_analysis::{CompareConfig, SweepConfig, num_runs, run_paired, run_sweep_with};
use qwalk_demos::report::{sparkline, summarize_paired, summarize_sweep};
use qwalk_demos::{
    create_progress_bar, print_banner, print_done, print_field, print_heading, print_region,
    print_saved, print_series,
};

#[derive(Parser, Debug)]
#[command(name = "qwalk-demo")]
#[command(about = "Quantum walk sweeps and comparisons on a 1D lattice")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a parameter sweep
    Sweep {
        /// Sweep configuration file
        config: PathBuf,

        /// Directory for the JSON result
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compare a walk with and without extra defects
    Compare {
        /// Comparison configuration file
        config: PathBuf,

        /// Directory for the JSON summary
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match args.command {
        Command::Sweep { config, output } => sweep(&config, output.as_deref()),
        Command::Compare { config, output } => compare(&config, output.as_deref()),
    }
}

fn sweep(path: &Path, output: Option<&Path>) -> Result<()> {
    let config = SweepConfig::from_file(path)
        .with_context(|| format!("loading sweep config {}", path.display()))?;
    let title = if config.name.is_empty() { "sweep" } else { config.name.as_str() };
    print_banner(title, config.walk.kind);

    print_field("sites", config.walk.num_sites);
    print_field("center", config.walk.initial.center);
    print_field("parameter", config.sweep.parameter_name());
    print_field("measure", config.sweep.measure_name());

    let start = Instant::now();
    let pb = create_progress_bar(num_runs(&config) as u64);
    let result = run_sweep_with(&config, || pb.inc(1))?;
    pb.finish_and_clear();

    print_heading("Series");
    for summary in summarize_sweep(&result) {
        let spark = result
            .series(&summary.label)
            .map(|s| sparkline(&s.values))
            .unwrap_or_default();
        print_series(&summary, &spark, &result.parameter);
    }

    if let Some(dir) = output {
        let file = write_json(dir, &format!("{}_sweep.json", file_stem(&config.name)), &result)?;
        print_saved(&file);
    }

    print_done("sweep complete", start.elapsed());
    Ok(())
}

fn compare(path: &Path, output: Option<&Path>) -> Result<()> {
    let config = CompareConfig::from_file(path)
        .with_context(|| format!("loading comparison config {}", path.display()))?;
    let title = if config.name.is_empty() { "comparison" } else { config.name.as_str() };
    print_banner(title, config.walk.kind);

    print_field("sites", config.walk.num_sites);
    print_field("center", config.walk.initial.center);
    let defects: Vec<String> = config
        .defects
        .iter()
        .map(|(site, strength)| format!("{site}:{strength}"))
        .collect();
    print_field("defects", defects.join(", "));

    let start = Instant::now();
    let run = run_paired(&config.walk, &config.defects)?;
    let summary = summarize_paired(&run, config.regions.as_ref());
    info!(max_deviation = summary.max_deviation, "comparison finished");

    print_heading("Final time");
    print_field("free mass", format!("{:.6}", summary.final_free_mass));
    print_field("defected mass", format!("{:.6}", summary.final_defected_mass));
    print_field("max deviation", format!("{:.6}", summary.max_deviation));
    print_field("deviation", sparkline(&run.deviation().to_vec()));

    if !summary.regions.is_empty() {
        print_heading("Regions (free → defected)");
        for row in &summary.regions {
            print_region(row);
        }
    }

    if let Some(dir) = output {
        let file = write_json(dir, &format!("{}_compare.json", file_stem(&config.name)), &summary)?;
        print_saved(&file);
    }

    print_done("comparison complete", start.elapsed());
    Ok(())
}

fn file_stem(name: &str) -> String {
    if name.is_empty() {
        "qwalk".to_string()
    } else {
        name.replace(|c: char| !c.is_ascii_alphanumeric(), "_")
    }
}

fn write_json(dir: &Path, file_name: &str, value: &impl serde::Serialize) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, serde_json::to_string_pretty(value)?)?;
    Ok(path)
}
