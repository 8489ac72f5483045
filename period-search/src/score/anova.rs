//! One-way analysis of variance over phase bins (AoV).
//!
//! The cycle [0, 1) is cut into equal-width bins and every folded point is
//! assigned to the bin containing its phase. The F statistic compares the
//! spread of bin means around the grand mean with the spread of points
//! around their own bin mean. Only populated bins form groups.

use statrs::distribution::{ContinuousCDF, FisherSnedecor};

use crate::error::{PeriodSearchError, Result};
use crate::fold::PhaseFoldedPoint;

/// ANOVA statistics for one folded light curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnovaScore {
    /// Between-group mean square over within-group mean square
    pub f_value: f64,
    /// Probability of an F at least this large under the null hypothesis
    pub p_value: f64,
    pub df_between: usize,
    pub df_within: usize,
    /// Number of bins holding at least one point
    pub populated_bins: usize,
}

/// Bin index for a phase in [0, 1).
fn bin_index(phase: f64, bins: usize) -> usize {
    ((phase * bins as f64).floor() as usize).min(bins - 1)
}

/// Binned ANOVA of folded magnitudes.
///
/// # Arguments
/// * `folded` - Phase-folded points (any order)
/// * `bins` - Number of equal-width phase bins
///
/// # Errors
/// * `PeriodSearchError::InvalidParameter` - `bins` is zero
/// * `PeriodSearchError::InsufficientData` - Fewer points than bins, fewer
///   than two populated bins, or no within-group degrees of freedom
/// * `PeriodSearchError::Numerical` - Zero within-group variance or a
///   non-finite F value
pub fn anova(folded: &[PhaseFoldedPoint], bins: usize) -> Result<AnovaScore> {
    if bins == 0 {
        return Err(PeriodSearchError::InvalidParameter(
            "number of bins must be greater than zero".to_string(),
        ));
    }
    if folded.len() < bins {
        return Err(PeriodSearchError::InsufficientData {
            needed: bins,
            got: folded.len(),
            context: "ANOVA",
        });
    }

    let mut counts = vec![0usize; bins];
    let mut sums = vec![0.0f64; bins];
    for point in folded {
        let bin = bin_index(point.phase, bins);
        counts[bin] += 1;
        sums[bin] += point.magnitude;
    }

    let populated_bins = counts.iter().filter(|&&c| c > 0).count();
    let n = folded.len();
    if populated_bins < 2 {
        return Err(PeriodSearchError::InsufficientData {
            needed: 2,
            got: populated_bins,
            context: "ANOVA phase groups",
        });
    }
    if n <= populated_bins {
        return Err(PeriodSearchError::InsufficientData {
            needed: populated_bins + 1,
            got: n,
            context: "ANOVA",
        });
    }

    let means: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(&sum, &count)| if count > 0 { sum / count as f64 } else { 0.0 })
        .collect();
    let grand_mean = sums.iter().sum::<f64>() / n as f64;

    let between_ss: f64 = means
        .iter()
        .zip(&counts)
        .filter(|(_, &count)| count > 0)
        .map(|(&mean, &count)| count as f64 * (mean - grand_mean).powi(2))
        .sum();
    let within_ss: f64 = folded
        .iter()
        .map(|point| (point.magnitude - means[bin_index(point.phase, bins)]).powi(2))
        .sum();

    let df_between = populated_bins - 1;
    let df_within = n - populated_bins;
    let between_ms = between_ss / df_between as f64;
    let within_ms = within_ss / df_within as f64;

    if !(within_ms > 0.0) {
        return Err(PeriodSearchError::Numerical(
            "zero within-group variance".to_string(),
        ));
    }

    let f_value = between_ms / within_ms;
    if !f_value.is_finite() {
        return Err(PeriodSearchError::Numerical(format!(
            "non-finite F value ({f_value})"
        )));
    }

    let distribution = FisherSnedecor::new(df_between as f64, df_within as f64)
        .map_err(|e| PeriodSearchError::Numerical(format!("F distribution: {e}")))?;
    let p_value = distribution.sf(f_value);

    Ok(AnovaScore {
        f_value,
        p_value,
        df_between,
        df_within,
        populated_bins,
    })
}
