//! Period search over a light curve from the command line
//!
//! Reads observations from a JSON file (an array of
//! `{"time": .., "magnitude": .., "uncertainty": ..}` objects) or generates
//! a seeded synthetic sinusoid, sweeps the requested period range and
//! prints the best candidate periods.
//!
//! # Usage
//!
//! ```bash
//! # Synthetic 5-day variable, minimum scatter
//! cargo run --release --bin period_scan -- \
//!     --synthetic-period 5.0 --noise 0.05 --min-period 1 --max-period 10 --resolution 0.01
//!
//! # Observations from disk, AoV with 20 bins, parallel sweep, JSON report
//! cargo run --release --bin period_scan -- \
//!     --input star.json --method aov --bins 20 --min-period 0.5 --max-period 50 --parallel --json
//! ```
//!
//! Set `RUST_LOG=debug` to see every skipped trial period.

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use period_search::scanner::{DEFAULT_BINS, DEFAULT_RESOLUTION};
use period_search::{
    find_harmonics, EpochStrategy, Execution, Observation, PeriodScanner, ScanMethod,
    ScanParameters, ScanReport, MAX_TOP_HITS,
};
use test_helpers::light_curve::SyntheticLightCurve;

/// Parse a strictly positive, finite number
fn parse_positive(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid numeric value: {}", s))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("Value must be greater than zero, got {}", value));
    }
    Ok(value)
}

/// Parse a finite number that is zero or greater
fn parse_non_negative(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid numeric value: {}", s))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("Value cannot be negative, got {}", value));
    }
    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MethodArg {
    /// Minimum point-to-point scatter of the folded curve
    Scatter,
    /// Analysis of variance over phase bins
    Aov,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EpochArg {
    /// Fold relative to time zero
    Zero,
    /// Fold relative to the earliest observation
    Alpha,
    /// Fold relative to the midpoint of the observations
    AlphaOmegaMean,
}

impl From<EpochArg> for EpochStrategy {
    fn from(arg: EpochArg) -> Self {
        match arg {
            EpochArg::Zero => EpochStrategy::Zero,
            EpochArg::Alpha => EpochStrategy::Alpha,
            EpochArg::AlphaOmegaMean => EpochStrategy::AlphaOmegaMean,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "period_scan",
    about = "Search a variable star light curve for its period by phase folding",
    long_about = None
)]
struct Args {
    /// Smallest trial period
    #[arg(long, value_parser = parse_positive)]
    min_period: f64,

    /// Largest trial period (inclusive)
    #[arg(long, value_parser = parse_positive)]
    max_period: f64,

    /// Step between trial periods
    #[arg(long, default_value_t = DEFAULT_RESOLUTION, value_parser = parse_positive)]
    resolution: f64,

    /// Scoring statistic
    #[arg(long, value_enum, default_value_t = MethodArg::Scatter)]
    method: MethodArg,

    /// Number of phase bins (AoV only)
    #[arg(long, default_value_t = DEFAULT_BINS)]
    bins: usize,

    /// Include the jump from the last phase point back to the first (scatter only)
    #[arg(long)]
    wraparound: bool,

    /// Only list trial periods with scatter at or below this value
    #[arg(long, value_parser = parse_non_negative)]
    filter: Option<f64>,

    /// Reference time for folding
    #[arg(long, value_enum, default_value_t = EpochArg::Zero)]
    epoch: EpochArg,

    /// Number of best periods to keep
    #[arg(long, default_value_t = MAX_TOP_HITS)]
    top_hits: usize,

    /// Score trial periods on all cores
    #[arg(long)]
    parallel: bool,

    /// JSON file with an array of observations
    #[arg(long, conflicts_with = "synthetic_period")]
    input: Option<PathBuf>,

    /// Generate a synthetic sinusoid with this period instead of reading a file
    #[arg(long, value_parser = parse_positive)]
    synthetic_period: Option<f64>,

    /// Number of synthetic samples
    #[arg(long, default_value_t = 100)]
    points: usize,

    /// Synthetic amplitude in magnitudes
    #[arg(long, default_value_t = 1.0)]
    amplitude: f64,

    /// Synthetic Gaussian noise sigma in magnitudes
    #[arg(long, default_value_t = 0.0, value_parser = parse_non_negative)]
    noise: f64,

    /// Seed for synthetic noise
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Print the full report as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// List harmonics of the best period among the scanned frequencies
    #[arg(long)]
    harmonics: bool,
}

impl Args {
    fn scan_parameters(&self) -> ScanParameters {
        let method = match self.method {
            MethodArg::Scatter => ScanMethod::MinimumScatter {
                wraparound: self.wraparound,
            },
            MethodArg::Aov => ScanMethod::Aov { bins: self.bins },
        };
        let execution = if self.parallel {
            Execution::Parallel
        } else {
            Execution::Sequential
        };

        let mut params = ScanParameters::new(self.min_period, self.max_period, self.resolution)
            .with_method(method)
            .with_epoch(self.epoch.into())
            .with_max_top_hits(self.top_hits)
            .with_execution(execution);
        if let Some(threshold) = self.filter {
            params = params.with_filter_threshold(threshold);
        }
        params
    }

    fn load_observations(&self) -> Result<Vec<Observation>, Box<dyn Error>> {
        if let Some(path) = &self.input {
            let content = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
            let observations: Vec<Observation> = serde_json::from_str(&content)?;
            info!("Loaded {} observations from {}", observations.len(), path.display());
            return Ok(observations);
        }

        let period = self
            .synthetic_period
            .ok_or("Either --input or --synthetic-period is required")?;
        let samples = SyntheticLightCurve::new(period, self.points)
            .with_amplitude(self.amplitude)
            .with_noise(self.noise)
            .with_seed(self.seed)
            .generate()?;
        info!(
            "Generated {} synthetic observations with period {}",
            samples.len(),
            period
        );
        Ok(samples
            .into_iter()
            .map(|s| Observation::new(s.time, s.magnitude, s.uncertainty))
            .collect())
    }
}

fn print_report(report: &ScanReport, show_harmonics: bool) {
    println!(
        "Scan {:?}: {} of {} trial periods processed ({} scored, {} skipped), epoch {}",
        report.state,
        report.processed(),
        report.candidates,
        report.scored,
        report.skipped,
        report.epoch
    );
    println!();
    println!(
        "{:>4} {:>14} {:>14} {:>12} {:>12} {:>10} {:>10}",
        "rank", "period", "frequency", "scatter", "segments", "F", "p"
    );
    for (rank, hit) in report.top_hits.entries().iter().enumerate() {
        let f_value = hit
            .f_value()
            .map_or_else(|| "-".to_string(), |f| format!("{:.3}", f));
        let p_value = hit
            .p_value()
            .map_or_else(|| "-".to_string(), |p| format!("{:.2e}", p));
        println!(
            "{:>4} {:>14.6} {:>14.8} {:>12.5} {:>12.5} {:>10} {:>10}",
            rank + 1,
            hit.period(),
            hit.frequency(),
            hit.scatter(),
            hit.segment_sum(),
            f_value,
            p_value
        );
    }

    if show_harmonics {
        if let Some(best) = report.best() {
            println!();
            println!("Harmonics of period {:.6}:", best.period());
            // Harmonics are matched in order, so walk up in frequency
            let mut frequencies = report.frequencies();
            frequencies.sort_by(f64::total_cmp);
            for harmonic in find_harmonics(best.frequency(), &frequencies) {
                println!(
                    "  n={:<3} frequency {:.8} period {:.6}",
                    harmonic.number,
                    harmonic.frequency,
                    harmonic.period()
                );
            }
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args = Args::parse();
    let observations = args.load_observations()?;

    let mut scanner = PeriodScanner::new();
    scanner.set_parameters(args.scan_parameters())?;
    let total = scanner
        .parameters()
        .map_or(0, |params| params.candidate_count());

    let progress_bar = ProgressBar::new(total as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} periods ({eta})")?
            .progress_chars("=>-"),
    );

    let report = scanner.scan_with_progress(&observations, |progress| {
        progress_bar.set_position(progress.completed as u64);
    })?;
    progress_bar.finish_and_clear();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, args.harmonics);
    }

    Ok(())
}
