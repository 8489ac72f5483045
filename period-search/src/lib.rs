//! Phase-folding period search for variable star photometry.
//!
//! Given a light curve (times and magnitudes), the search sweeps a range of
//! trial periods. Each trial period folds the observations into phase
//! `[0, 1)` and scores how coherent the folded curve looks:
//!
//! - **Minimum scatter**: sum of magnitude jumps between phase-adjacent
//!   points; a true period gives a smooth folded curve and a low sum.
//! - **AoV**: one-way analysis of variance over equal-width phase bins; a
//!   true period separates the bins and gives a high F statistic.
//!
//! The sweep returns the full series of scored periods, suitable for a
//! periodogram, plus a bounded list of the best candidates.
//!
//! # Example
//! ```rust
//! use period_search::{Observation, PeriodScanner, ScanParameters};
//!
//! let observations: Vec<Observation> = (0..100)
//!     .map(|i| {
//!         let t = i as f64;
//!         Observation::new(t, (2.0 * std::f64::consts::PI * t / 5.0).cos(), 0.0)
//!     })
//!     .collect();
//!
//! let mut scanner = PeriodScanner::new();
//! scanner.set_parameters(ScanParameters::new(4.5, 5.5, 0.1)).unwrap();
//! let report = scanner.scan(&observations).unwrap();
//!
//! let best = report.best().unwrap();
//! assert!((best.period() - 5.0).abs() < 0.1);
//! ```

pub mod error;
pub mod fold;
pub mod harmonics;
pub mod interrupt;
pub mod observation;
pub mod result;
pub mod scanner;
pub mod score;
pub mod top_hits;

pub use error::{PeriodSearchError, Result};
pub use fold::{fold, fold_with_epoch, EpochStrategy, PhaseFoldedPoint, PhaseFolder};
pub use harmonics::{find_harmonics, Harmonic};
pub use interrupt::InterruptHandle;
pub use observation::Observation;
pub use result::ScanResult;
pub use scanner::{
    Execution, PeriodScanner, ScanMethod, ScanParameters, ScanProgress, ScanReport, ScanState,
};
pub use score::{anova, score_scatter, AnovaScore, ScatterOptions, ScatterScore};
pub use top_hits::{insert_ranked, Ranking, TopHits, MAX_TOP_HITS};
