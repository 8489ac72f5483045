//! Per-period scan results.

use serde::{Deserialize, Serialize};

use crate::score::{AnovaScore, ScatterScore};

/// Score of a single candidate period.
///
/// Frequency is always derived from the period, so the two never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    period: f64,
    frequency: f64,
    scatter: f64,
    segment_sum: f64,
    f_value: Option<f64>,
    p_value: Option<f64>,
    df_between: Option<usize>,
    df_within: Option<usize>,
}

impl ScanResult {
    /// Result carrying scatter statistics only.
    pub fn new(period: f64, scatter: ScatterScore) -> Self {
        Self {
            period,
            frequency: 1.0 / period,
            scatter: scatter.scatter,
            segment_sum: scatter.segment_sum,
            f_value: None,
            p_value: None,
            df_between: None,
            df_within: None,
        }
    }

    /// Attach ANOVA statistics.
    pub fn with_anova(mut self, anova: AnovaScore) -> Self {
        self.f_value = Some(anova.f_value);
        self.p_value = Some(anova.p_value);
        self.df_between = Some(anova.df_between);
        self.df_within = Some(anova.df_within);
        self
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn scatter(&self) -> f64 {
        self.scatter
    }

    pub fn segment_sum(&self) -> f64 {
        self.segment_sum
    }

    pub fn f_value(&self) -> Option<f64> {
        self.f_value
    }

    pub fn p_value(&self) -> Option<f64> {
        self.p_value
    }

    /// Degrees of freedom (between, within) when ANOVA was computed.
    pub fn degrees_of_freedom(&self) -> Option<(usize, usize)> {
        self.df_between.zip(self.df_within)
    }
}
