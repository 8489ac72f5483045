//! Error types for period search operations.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PeriodSearchError>;

/// Errors raised while configuring or running a period search.
///
/// Parameter errors are surfaced before any scanning starts. Data and
/// numerical errors are raised per candidate period by the scorers; the
/// scanner absorbs them and skips that period.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PeriodSearchError {
    /// Malformed scan parameters (period range, resolution, bin count).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Too few observations (or points per bin) for the chosen statistic.
    #[error("insufficient data for {context}: need at least {needed}, got {got}")]
    InsufficientData {
        needed: usize,
        got: usize,
        context: &'static str,
    },

    /// Numerical failure such as a zero within-group variance.
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Parameter collection was abandoned before scanning began.
    #[error("period search cancelled")]
    Cancelled,
}

impl PeriodSearchError {
    /// True for errors the scanner absorbs by skipping a single period.
    pub fn is_per_period(&self) -> bool {
        matches!(
            self,
            PeriodSearchError::InsufficientData { .. } | PeriodSearchError::Numerical(_)
        )
    }
}
