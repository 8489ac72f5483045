//! Phase folding of observations at a trial period.
//!
//! Folding maps each observation time onto its fractional position within
//! one cycle of a candidate period:
//!
//! ```text
//! phase = x - floor(x),   x = (time - epoch) / period
//! ```
//!
//! The folded points are then stably sorted by phase, so that points which
//! share a phase keep their original observation order. Scorers treat
//! neighbours in this order as adjacent, which makes the sort order part of
//! the result.

use serde::{Deserialize, Serialize};

use crate::error::{PeriodSearchError, Result};
use crate::observation::{time_span, Observation};

/// An observation placed at its phase for one candidate period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseFoldedPoint {
    /// Index of the source observation in the caller's slice
    pub original_index: usize,
    /// Phase in [0, 1)
    pub phase: f64,
    pub magnitude: f64,
}

/// How the reference epoch for folding is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EpochStrategy {
    /// Fold on absolute time, `phase = frac(time / period)`
    #[default]
    Zero,
    /// Earliest observation time
    Alpha,
    /// Midpoint of the earliest and latest observation times
    AlphaOmegaMean,
}

impl EpochStrategy {
    /// Epoch (Julian Day) for the given observations under this strategy.
    ///
    /// An empty observation list yields an epoch of zero.
    pub fn determine_epoch(&self, observations: &[Observation]) -> f64 {
        match (self, time_span(observations)) {
            (EpochStrategy::Zero, _) | (_, None) => 0.0,
            (EpochStrategy::Alpha, Some((first, _))) => first,
            (EpochStrategy::AlphaOmegaMean, Some((first, last))) => (first + last) / 2.0,
        }
    }
}

impl std::fmt::Display for EpochStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EpochStrategy::Zero => write!(f, "zero"),
            EpochStrategy::Alpha => write!(f, "alpha"),
            EpochStrategy::AlphaOmegaMean => write!(f, "alpha-omega-mean"),
        }
    }
}

/// Standard phase of `time` for `period`, guaranteed to lie in [0, 1).
///
/// `x - floor(x)` can round up to exactly 1.0 for tiny negative `x`; that
/// case is the same point in the cycle as 0.0 and is returned as such.
pub fn standard_phase(time: f64, epoch: f64, period: f64) -> f64 {
    let x = (time - epoch) / period;
    let phase = x - x.floor();
    if phase >= 1.0 {
        0.0
    } else {
        phase
    }
}

fn validate_period(period: f64) -> Result<()> {
    if !period.is_finite() || period <= 0.0 {
        return Err(PeriodSearchError::InvalidParameter(format!(
            "period must be a positive finite number, got {period}"
        )));
    }
    Ok(())
}

/// Fold observations at `period` with an epoch of zero.
///
/// # Errors
/// * `PeriodSearchError::InvalidParameter` - If `period` is not positive and finite
pub fn fold(observations: &[Observation], period: f64) -> Result<Vec<PhaseFoldedPoint>> {
    fold_with_epoch(observations, period, 0.0)
}

/// Fold observations at `period` relative to `epoch`.
///
/// Returns points sorted ascending by phase (stable). An empty observation
/// list produces an empty result.
///
/// # Errors
/// * `PeriodSearchError::InvalidParameter` - If `period` is not positive and
///   finite, or `epoch` is not finite
pub fn fold_with_epoch(
    observations: &[Observation],
    period: f64,
    epoch: f64,
) -> Result<Vec<PhaseFoldedPoint>> {
    let mut points = Vec::with_capacity(observations.len());
    fold_into(observations, period, epoch, &mut points)?;
    Ok(points)
}

fn fold_into(
    observations: &[Observation],
    period: f64,
    epoch: f64,
    points: &mut Vec<PhaseFoldedPoint>,
) -> Result<()> {
    validate_period(period)?;
    if !epoch.is_finite() {
        return Err(PeriodSearchError::InvalidParameter(format!(
            "epoch must be finite, got {epoch}"
        )));
    }

    points.clear();
    points.extend(
        observations
            .iter()
            .enumerate()
            .map(|(original_index, ob)| PhaseFoldedPoint {
                original_index,
                phase: standard_phase(ob.time, epoch, period),
                magnitude: ob.magnitude,
            }),
    );

    // slice::sort_by is stable
    points.sort_by(|a, b| a.phase.total_cmp(&b.phase));
    Ok(())
}

/// Reusable folder that keeps its working buffer between candidate periods.
#[derive(Debug, Clone, Default)]
pub struct PhaseFolder {
    epoch: f64,
    points: Vec<PhaseFoldedPoint>,
}

impl PhaseFolder {
    pub fn new(epoch: f64) -> Self {
        Self {
            epoch,
            points: Vec::new(),
        }
    }

    /// Create a folder whose epoch is chosen from the observations.
    pub fn with_strategy(strategy: EpochStrategy, observations: &[Observation]) -> Self {
        let mut folder = Self::new(strategy.determine_epoch(observations));
        folder.points.reserve(observations.len());
        folder
    }

    pub fn epoch(&self) -> f64 {
        self.epoch
    }

    /// Fold into the internal buffer and borrow the phase-sorted points.
    pub fn fold(&mut self, observations: &[Observation], period: f64) -> Result<&[PhaseFoldedPoint]> {
        fold_into(observations, period, self.epoch, &mut self.points)?;
        Ok(&self.points)
    }
}
