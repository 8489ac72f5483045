//! Period sweep orchestration.
//!
//! A [`PeriodScanner`] walks a grid of trial periods from `min_period` to
//! `max_period` inclusive. For each trial period it folds the observations,
//! scores the folded curve, appends the result to the full series and
//! offers it to the bounded [`TopHits`] list.
//!
//! # Lifecycle
//!
//! ```text
//! Idle -> ParameterCollection -> Scanning -> Completed
//!                |                        \-> Interrupted
//!                \-> Cancelled
//! ```
//!
//! Invalid parameters leave the scanner in `ParameterCollection` so the
//! caller can supply corrected values. A raised [`InterruptHandle`] stops
//! the sweep before the next trial period and the partial results are
//! returned, not discarded.
//!
//! # Failure handling
//!
//! Periods that cannot be scored (too few points for the bins, zero
//! within-group variance) are skipped and counted; they contribute to
//! neither the series nor the top hits.

use std::borrow::Cow;

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{PeriodSearchError, Result};
use crate::fold::{EpochStrategy, PhaseFolder};
use crate::interrupt::InterruptHandle;
use crate::observation::Observation;
use crate::result::ScanResult;
use crate::score::{anova, score_scatter, ScatterOptions};
use crate::top_hits::{Ranking, TopHits, MAX_TOP_HITS};

/// Default number of phase bins for the AoV method.
pub const DEFAULT_BINS: usize = 10;

/// Default step between trial periods.
pub const DEFAULT_RESOLUTION: f64 = 0.1;

/// Upper bound on the number of trial periods in one sweep.
pub const MAX_CANDIDATE_PERIODS: usize = 10_000_000;

/// Trial periods scored per parallel batch; progress and the interrupt
/// flag are checked between batches.
pub const PARALLEL_CHUNK_SIZE: usize = 1024;

/// Slack applied when counting grid steps so that a range which is an exact
/// multiple of the resolution keeps its final period.
const GRID_EPSILON: f64 = 1e-9;

/// Statistic used to score each trial period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanMethod {
    /// Point-to-point scatter in phase order (lower is better)
    MinimumScatter { wraparound: bool },
    /// Binned analysis of variance (higher F is better)
    Aov { bins: usize },
}

impl ScanMethod {
    /// Ranking used for top hits unless overridden.
    pub fn default_ranking(&self) -> Ranking {
        match self {
            ScanMethod::MinimumScatter { .. } => Ranking::LowestScatter,
            ScanMethod::Aov { .. } => Ranking::HighestFValue,
        }
    }
}

impl Default for ScanMethod {
    fn default() -> Self {
        ScanMethod::MinimumScatter { wraparound: false }
    }
}

/// Whether trial periods are scored on the calling thread or across the
/// rayon thread pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Execution {
    #[default]
    Sequential,
    Parallel,
}

/// Parameters of one period sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanParameters {
    pub min_period: f64,
    pub max_period: f64,
    /// Step between trial periods
    pub resolution: f64,
    pub method: ScanMethod,
    pub epoch: EpochStrategy,
    /// Only emit results with scatter at or below this value into the series
    pub filter_threshold: Option<f64>,
    pub max_top_hits: usize,
    /// Overrides the method's default ranking
    pub ranking: Option<Ranking>,
    pub execution: Execution,
}

impl Default for ScanParameters {
    fn default() -> Self {
        Self {
            min_period: 0.0,
            max_period: 0.0,
            resolution: DEFAULT_RESOLUTION,
            method: ScanMethod::default(),
            epoch: EpochStrategy::default(),
            filter_threshold: None,
            max_top_hits: MAX_TOP_HITS,
            ranking: None,
            execution: Execution::default(),
        }
    }
}

impl ScanParameters {
    pub fn new(min_period: f64, max_period: f64, resolution: f64) -> Self {
        Self {
            min_period,
            max_period,
            resolution,
            ..Default::default()
        }
    }

    pub fn with_method(mut self, method: ScanMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_epoch(mut self, epoch: EpochStrategy) -> Self {
        self.epoch = epoch;
        self
    }

    pub fn with_filter_threshold(mut self, threshold: f64) -> Self {
        self.filter_threshold = Some(threshold);
        self
    }

    pub fn with_max_top_hits(mut self, max_top_hits: usize) -> Self {
        self.max_top_hits = max_top_hits;
        self
    }

    pub fn with_ranking(mut self, ranking: Ranking) -> Self {
        self.ranking = Some(ranking);
        self
    }

    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }

    /// Effective ranking for the top-hit list.
    pub fn ranking(&self) -> Ranking {
        self.ranking
            .unwrap_or_else(|| self.method.default_ranking())
    }

    /// Check the parameters before any scanning starts.
    ///
    /// # Errors
    /// * `PeriodSearchError::InvalidParameter` - Describing the first problem found
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(PeriodSearchError::InvalidParameter(msg));

        if !self.min_period.is_finite() || self.min_period <= 0.0 {
            return invalid(format!(
                "minimum period must be greater than zero, got {}",
                self.min_period
            ));
        }
        if !self.max_period.is_finite() || self.max_period < self.min_period {
            return invalid(format!(
                "minimum period ({}) must be less than or equal to maximum period ({})",
                self.min_period, self.max_period
            ));
        }
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return invalid(format!(
                "resolution must be greater than zero, got {}",
                self.resolution
            ));
        }
        if let ScanMethod::Aov { bins: 0 } = self.method {
            return invalid("number of bins must be greater than zero".to_string());
        }
        if let Some(threshold) = self.filter_threshold {
            if !threshold.is_finite() || threshold < 0.0 {
                return invalid(format!(
                    "filter threshold must be non-negative, got {threshold}"
                ));
            }
        }
        if self.max_top_hits == 0 {
            return invalid("top hit capacity must be greater than zero".to_string());
        }

        if self.grid_steps() + 1.0 > MAX_CANDIDATE_PERIODS as f64 {
            return invalid(format!(
                "period range and resolution give more than {MAX_CANDIDATE_PERIODS} trial periods"
            ));
        }
        Ok(())
    }

    /// Whole resolution steps between `min_period` and `max_period`.
    fn grid_steps(&self) -> f64 {
        ((self.max_period - self.min_period) / self.resolution + GRID_EPSILON).floor()
    }

    /// Number of trial periods in `[min_period, max_period]`.
    pub fn candidate_count(&self) -> usize {
        (self.grid_steps() as usize).saturating_add(1)
    }

    /// The `index`-th trial period, computed directly to avoid accumulated
    /// rounding from repeated addition.
    pub fn period_at(&self, index: usize) -> f64 {
        self.min_period + index as f64 * self.resolution
    }

    /// All trial periods in sweep order.
    pub fn candidate_periods(&self) -> Vec<f64> {
        (0..self.candidate_count())
            .map(|index| self.period_at(index))
            .collect()
    }
}

/// Where the scanner is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanState {
    Idle,
    ParameterCollection,
    Scanning,
    Completed,
    Cancelled,
    Interrupted,
}

/// Progress notification passed to the scan callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgress {
    /// Trial periods processed so far (scored or skipped)
    pub completed: usize,
    pub total: usize,
}

/// Everything a scan produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// `Completed` or `Interrupted`
    pub state: ScanState,
    /// Scored periods in sweep order (after the filter threshold)
    pub results: Vec<ScanResult>,
    pub top_hits: TopHits,
    /// Epoch used for folding
    pub epoch: f64,
    /// Trial periods in the full grid
    pub candidates: usize,
    pub scored: usize,
    pub skipped: usize,
}

impl ScanReport {
    pub fn is_complete(&self) -> bool {
        self.state == ScanState::Completed
    }

    /// Trial periods processed before the scan ended.
    pub fn processed(&self) -> usize {
        self.scored + self.skipped
    }

    pub fn best(&self) -> Option<&ScanResult> {
        self.top_hits.best()
    }

    pub fn periods(&self) -> Vec<f64> {
        self.results.iter().map(|r| r.period()).collect()
    }

    pub fn frequencies(&self) -> Vec<f64> {
        self.results.iter().map(|r| r.frequency()).collect()
    }

    /// Scatter mapped to a power-like scale: `1 - scatter / max_scatter`.
    ///
    /// Values near one mark low-scatter periods, so the series reads like a
    /// periodogram whose peaks are the good periods. All zeros when the
    /// largest scatter is zero.
    pub fn relative_power(&self) -> Vec<f64> {
        let max_scatter = self
            .results
            .iter()
            .map(|r| r.scatter())
            .fold(0.0f64, f64::max);
        if max_scatter <= 0.0 {
            return vec![0.0; self.results.len()];
        }
        self.results
            .iter()
            .map(|r| 1.0 - r.scatter() / max_scatter)
            .collect()
    }
}

/// Score one trial period.
fn score_period(
    folder: &mut PhaseFolder,
    observations: &[Observation],
    period: f64,
    method: ScanMethod,
) -> Result<ScanResult> {
    let folded = folder.fold(observations, period)?;
    match method {
        ScanMethod::MinimumScatter { wraparound } => {
            let scatter = score_scatter(folded, ScatterOptions { wraparound })?;
            Ok(ScanResult::new(period, scatter))
        }
        ScanMethod::Aov { bins } => {
            let anova = anova(folded, bins)?;
            let scatter = score_scatter(folded, ScatterOptions::default())?;
            Ok(ScanResult::new(period, scatter).with_anova(anova))
        }
    }
}

/// Accumulates per-period outcomes into the result series and top hits.
struct Tally {
    results: Vec<ScanResult>,
    top_hits: TopHits,
    filter_threshold: Option<f64>,
    scored: usize,
    skipped: usize,
}

impl Tally {
    fn new(params: &ScanParameters) -> Self {
        Self {
            results: Vec::with_capacity(params.candidate_count().min(65_536)),
            top_hits: TopHits::new(params.ranking(), params.max_top_hits),
            filter_threshold: params.filter_threshold,
            scored: 0,
            skipped: 0,
        }
    }

    fn record(&mut self, period: f64, outcome: Result<ScanResult>) {
        match outcome {
            Ok(result) => {
                self.scored += 1;
                self.top_hits.insert(result);
                let passes = self
                    .filter_threshold
                    .map_or(true, |threshold| result.scatter() <= threshold);
                if passes {
                    self.results.push(result);
                }
            }
            Err(e) => {
                self.skipped += 1;
                if e.is_per_period() {
                    debug!("Skipping period {period:.6}: {e}");
                } else {
                    warn!("Unexpected failure at period {period:.6}: {e}");
                }
            }
        }
    }
}

/// Runs period sweeps over in-memory observations.
#[derive(Debug)]
pub struct PeriodScanner {
    state: ScanState,
    parameters: Option<ScanParameters>,
    interrupt: InterruptHandle,
}

impl Default for PeriodScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl PeriodScanner {
    pub fn new() -> Self {
        Self {
            state: ScanState::Idle,
            parameters: None,
            interrupt: InterruptHandle::new(),
        }
    }

    /// Convenience constructor for a scanner with accepted parameters.
    ///
    /// # Errors
    /// * `PeriodSearchError::InvalidParameter` - If the parameters fail validation
    pub fn with_parameters(parameters: ScanParameters) -> Result<Self> {
        let mut scanner = Self::new();
        scanner.set_parameters(parameters)?;
        Ok(scanner)
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn parameters(&self) -> Option<&ScanParameters> {
        self.parameters.as_ref()
    }

    /// Handle for stopping a running scan from another thread.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    /// Supply scan parameters.
    ///
    /// Rejected parameters are not stored and the scanner stays in
    /// `ParameterCollection`, ready for another attempt.
    ///
    /// # Errors
    /// * `PeriodSearchError::InvalidParameter` - If the parameters fail validation
    pub fn set_parameters(&mut self, parameters: ScanParameters) -> Result<()> {
        self.state = ScanState::ParameterCollection;
        if let Err(e) = parameters.validate() {
            warn!("Rejected scan parameters: {e}");
            self.parameters = None;
            return Err(e);
        }
        self.parameters = Some(parameters);
        Ok(())
    }

    /// Abandon parameter collection; subsequent scans report `Cancelled`.
    pub fn cancel(&mut self) {
        self.state = ScanState::Cancelled;
    }

    /// Forget parameters and any pending interrupt, returning to `Idle`.
    pub fn reset(&mut self) {
        self.state = ScanState::Idle;
        self.parameters = None;
        self.interrupt.clear();
    }

    /// Run the sweep over `observations`.
    ///
    /// # Errors
    /// * `PeriodSearchError::Cancelled` - If parameter collection was cancelled
    /// * `PeriodSearchError::InvalidParameter` - If no valid parameters were supplied
    /// * `PeriodSearchError::InsufficientData` - If fewer than two observations
    ///   with finite time and magnitude are given
    pub fn scan(&mut self, observations: &[Observation]) -> Result<ScanReport> {
        self.scan_with_progress(observations, |_| {})
    }

    /// Run the sweep, reporting progress after each trial period.
    ///
    /// Observations with a non-finite time or magnitude are dropped before
    /// folding. In parallel execution progress is reported after each batch
    /// of [`PARALLEL_CHUNK_SIZE`] trial periods.
    ///
    /// # Errors
    /// See [`PeriodScanner::scan`].
    pub fn scan_with_progress<F>(
        &mut self,
        observations: &[Observation],
        mut progress: F,
    ) -> Result<ScanReport>
    where
        F: FnMut(ScanProgress),
    {
        if self.state == ScanState::Cancelled {
            return Err(PeriodSearchError::Cancelled);
        }
        let params = self.parameters.clone().ok_or_else(|| {
            PeriodSearchError::InvalidParameter("scan parameters have not been set".to_string())
        })?;
        let observations = finite_observations(observations);
        if observations.len() < 2 {
            return Err(PeriodSearchError::InsufficientData {
                needed: 2,
                got: observations.len(),
                context: "period search",
            });
        }
        let observations: &[Observation] = &observations;

        let total = params.candidate_count();
        let epoch = params.epoch.determine_epoch(observations);
        info!(
            "Scanning {} trial periods in [{}, {}] step {} over {} observations ({:?}, {:?})",
            total,
            params.min_period,
            params.max_period,
            params.resolution,
            observations.len(),
            params.method,
            params.execution
        );

        self.interrupt.clear();
        self.state = ScanState::Scanning;

        let mut tally = Tally::new(&params);
        let interrupted = match params.execution {
            Execution::Sequential => {
                self.sweep_sequential(observations, &params, epoch, &mut tally, &mut progress)
            }
            Execution::Parallel => {
                self.sweep_parallel(observations, &params, epoch, &mut tally, &mut progress)
            }
        };

        self.state = if interrupted {
            ScanState::Interrupted
        } else {
            ScanState::Completed
        };

        let report = ScanReport {
            state: self.state,
            results: tally.results,
            top_hits: tally.top_hits,
            epoch,
            candidates: total,
            scored: tally.scored,
            skipped: tally.skipped,
        };

        if report.scored == 0 && report.skipped > 0 {
            warn!(
                "No trial period could be scored ({} skipped)",
                report.skipped
            );
        }
        info!(
            "Scan {:?}: {} of {} trial periods processed, {} scored, {} skipped, best period {:?}",
            report.state,
            report.processed(),
            total,
            report.scored,
            report.skipped,
            report.best().map(|r| r.period())
        );

        Ok(report)
    }

    /// Returns true if the sweep was interrupted.
    fn sweep_sequential<F>(
        &self,
        observations: &[Observation],
        params: &ScanParameters,
        epoch: f64,
        tally: &mut Tally,
        progress: &mut F,
    ) -> bool
    where
        F: FnMut(ScanProgress),
    {
        let total = params.candidate_count();
        let mut folder = PhaseFolder::new(epoch);

        for index in 0..total {
            if self.interrupt.is_interrupted() {
                return true;
            }
            let period = params.period_at(index);
            let outcome = score_period(&mut folder, observations, period, params.method);
            tally.record(period, outcome);
            progress(ScanProgress {
                completed: index + 1,
                total,
            });
        }
        false
    }

    /// Scores batches of trial periods across the rayon pool. Each worker
    /// folds into its own buffer and outcomes are merged in sweep order, so
    /// the report matches a sequential run.
    fn sweep_parallel<F>(
        &self,
        observations: &[Observation],
        params: &ScanParameters,
        epoch: f64,
        tally: &mut Tally,
        progress: &mut F,
    ) -> bool
    where
        F: FnMut(ScanProgress),
    {
        let total = params.candidate_count();
        let method = params.method;
        let interrupt = &self.interrupt;
        let mut completed = 0;

        for start in (0..total).step_by(PARALLEL_CHUNK_SIZE) {
            if interrupt.is_interrupted() {
                return true;
            }
            let end = (start + PARALLEL_CHUNK_SIZE).min(total);

            let outcomes: Vec<Option<Result<ScanResult>>> = (start..end)
                .into_par_iter()
                .map_init(
                    || PhaseFolder::new(epoch),
                    |folder, index| {
                        if interrupt.is_interrupted() {
                            return None;
                        }
                        Some(score_period(
                            folder,
                            observations,
                            params.period_at(index),
                            method,
                        ))
                    },
                )
                .collect();

            let mut interrupted = false;
            for (offset, outcome) in outcomes.into_iter().enumerate() {
                match outcome {
                    Some(outcome) => {
                        completed += 1;
                        tally.record(params.period_at(start + offset), outcome);
                    }
                    None => interrupted = true,
                }
            }
            progress(ScanProgress { completed, total });
            if interrupted {
                return true;
            }
        }
        false
    }
}

/// Drop observations that would fold to a NaN phase or magnitude.
fn finite_observations(observations: &[Observation]) -> Cow<'_, [Observation]> {
    if observations.iter().all(Observation::is_finite) {
        return Cow::Borrowed(observations);
    }
    let finite: Vec<Observation> = observations
        .iter()
        .copied()
        .filter(Observation::is_finite)
        .collect();
    warn!(
        "Ignoring {} of {} observations with non-finite time or magnitude",
        observations.len() - finite.len(),
        observations.len()
    );
    Cow::Owned(finite)
}
