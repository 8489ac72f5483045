//! Scoring of phase-folded light curves.
//!
//! - **Scatter**: summed absolute magnitude change between phase neighbours
//! - **Segment sum**: length of the path through the phase-magnitude plane
//! - **ANOVA**: F statistic of magnitudes grouped into equal-width phase bins
//!
//! Lower scatter and segment sums, and higher F values, indicate a trial
//! period that folds the light curve more tightly.

pub mod anova;

pub use anova::{anova, AnovaScore};

use serde::{Deserialize, Serialize};

use crate::error::{PeriodSearchError, Result};
use crate::fold::PhaseFoldedPoint;

/// Options for the point-to-point scatter statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScatterOptions {
    /// Also count the segment closing the cycle (last point back to the first)
    pub wraparound: bool,
}

/// Scatter statistics of one folded light curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterScore {
    pub scatter: f64,
    pub segment_sum: f64,
}

/// Compute scatter and segment sum over phase-sorted points.
///
/// # Errors
/// * `PeriodSearchError::InsufficientData` - Fewer than 2 points
pub fn score_scatter(folded: &[PhaseFoldedPoint], options: ScatterOptions) -> Result<ScatterScore> {
    if folded.len() < 2 {
        return Err(PeriodSearchError::InsufficientData {
            needed: 2,
            got: folded.len(),
            context: "scatter",
        });
    }

    let mut scatter = 0.0;
    let mut segment_sum = 0.0;
    for pair in folded.windows(2) {
        let d_phase = pair[1].phase - pair[0].phase;
        let d_mag = pair[1].magnitude - pair[0].magnitude;
        scatter += d_mag.abs();
        segment_sum += d_phase.hypot(d_mag);
    }

    if options.wraparound {
        let first = folded[0];
        let last = folded[folded.len() - 1];
        let d_phase = first.phase + 1.0 - last.phase;
        let d_mag = first.magnitude - last.magnitude;
        scatter += d_mag.abs();
        segment_sum += d_phase.hypot(d_mag);
    }

    if !scatter.is_finite() || !segment_sum.is_finite() {
        return Err(PeriodSearchError::Numerical(
            "non-finite scatter (check magnitudes for NaN)".to_string(),
        ));
    }

    Ok(ScatterScore {
        scatter,
        segment_sum,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn points(data: &[(f64, f64)]) -> Vec<PhaseFoldedPoint> {
        data.iter()
            .enumerate()
            .map(|(i, &(phase, magnitude))| PhaseFoldedPoint {
                original_index: i,
                phase,
                magnitude,
            })
            .collect()
    }

    #[test]
    fn test_scatter_sums_adjacent_differences() {
        let folded = points(&[(0.0, 10.0), (0.25, 10.5), (0.5, 10.25), (0.75, 11.0)]);
        let score = score_scatter(&folded, ScatterOptions::default()).unwrap();

        // |0.5| + |-0.25| + |0.75|
        assert_relative_eq!(score.scatter, 1.5, epsilon = 1e-12);

        let expected_segments = (0.25f64.powi(2) + 0.5f64.powi(2)).sqrt()
            + (0.25f64.powi(2) + 0.25f64.powi(2)).sqrt()
            + (0.25f64.powi(2) + 0.75f64.powi(2)).sqrt();
        assert_relative_eq!(score.segment_sum, expected_segments, epsilon = 1e-12);
    }

    #[test]
    fn test_wraparound_adds_closing_segment() {
        let folded = points(&[(0.1, 10.0), (0.6, 11.0), (0.9, 10.5)]);
        let open = score_scatter(&folded, ScatterOptions::default()).unwrap();
        let closed = score_scatter(&folded, ScatterOptions { wraparound: true }).unwrap();

        assert_relative_eq!(open.scatter, 1.5, epsilon = 1e-12);
        assert_relative_eq!(closed.scatter, 2.0, epsilon = 1e-12);
        // Closing segment spans phase 0.9 -> 1.1
        assert_relative_eq!(
            closed.segment_sum - open.segment_sum,
            (0.2f64.powi(2) + 0.5f64.powi(2)).sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_constant_magnitudes_have_zero_scatter() {
        let folded = points(&[(0.0, 9.0), (0.3, 9.0), (0.7, 9.0)]);
        let score = score_scatter(&folded, ScatterOptions::default()).unwrap();
        assert_eq!(score.scatter, 0.0);
        assert_relative_eq!(score.segment_sum, 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_scatter_needs_two_points() {
        let folded = points(&[(0.5, 10.0)]);
        assert_eq!(
            score_scatter(&folded, ScatterOptions::default()),
            Err(PeriodSearchError::InsufficientData {
                needed: 2,
                got: 1,
                context: "scatter",
            })
        );
        assert!(score_scatter(&[], ScatterOptions::default()).is_err());
    }

    #[test]
    fn test_nan_magnitude_is_numerical_error() {
        let folded = points(&[(0.0, 10.0), (0.5, f64::NAN)]);
        assert!(matches!(
            score_scatter(&folded, ScatterOptions::default()),
            Err(PeriodSearchError::Numerical(_))
        ));
    }
}
