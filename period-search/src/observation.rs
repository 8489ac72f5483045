//! Photometric observations supplied to the period search.

use serde::{Deserialize, Serialize};

/// A single brightness measurement of a variable star.
///
/// Observations are owned by whoever loaded them; the scanner only reads
/// them and builds its own phase-folded working copies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Julian Day of the measurement
    pub time: f64,
    /// Magnitude (smaller is brighter)
    pub magnitude: f64,
    /// One-sigma magnitude uncertainty
    #[serde(default)]
    pub uncertainty: f64,
}

impl Observation {
    pub fn new(time: f64, magnitude: f64, uncertainty: f64) -> Self {
        Self {
            time,
            magnitude,
            uncertainty,
        }
    }

    /// True if time and magnitude are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.time.is_finite() && self.magnitude.is_finite()
    }
}

/// Earliest and latest observation times, or `None` for an empty slice.
pub fn time_span(observations: &[Observation]) -> Option<(f64, f64)> {
    observations.iter().fold(None, |span, ob| match span {
        None => Some((ob.time, ob.time)),
        Some((lo, hi)) => Some((lo.min(ob.time), hi.max(ob.time))),
    })
}
