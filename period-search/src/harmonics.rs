//! Harmonic search over a list of candidate frequencies.

use serde::{Deserialize, Serialize};

/// Relative tolerance for matching a frequency to a harmonic.
pub const HARMONIC_TOLERANCE: f64 = 1e-3;

/// A frequency that is the `number`-th multiple of a fundamental.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Harmonic {
    pub frequency: f64,
    /// 1 for the fundamental itself
    pub number: usize,
}

impl Harmonic {
    pub fn period(&self) -> f64 {
        1.0 / self.frequency
    }
}

/// Find successive harmonics of `fundamental` among `frequencies`.
///
/// The fundamental is always the first entry. The frequencies are walked in
/// order looking for harmonic 2, then 3, and so on: `f` matches harmonic `n`
/// when `f / n` equals the fundamental exactly or lies within
/// [`HARMONIC_TOLERANCE`] of it relative to both values.
pub fn find_harmonics(fundamental: f64, frequencies: &[f64]) -> Vec<Harmonic> {
    let mut harmonics = vec![Harmonic {
        frequency: fundamental,
        number: 1,
    }];
    let mut n = 2;

    for &frequency in frequencies {
        let potential = frequency / n as f64;
        let diff = (potential - fundamental).abs();

        if diff == 0.0
            || (diff <= (HARMONIC_TOLERANCE * potential).abs()
                && diff <= (HARMONIC_TOLERANCE * fundamental).abs())
        {
            harmonics.push(Harmonic {
                frequency: fundamental * n as f64,
                number: n,
            });
            n += 1;
        }
    }

    harmonics
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fundamental_always_present() {
        let harmonics = find_harmonics(0.2, &[]);
        assert_eq!(harmonics.len(), 1);
        assert_eq!(harmonics[0].number, 1);
        assert_relative_eq!(harmonics[0].period(), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_finds_successive_harmonics() {
        let frequencies = [0.1, 0.2, 0.3, 0.40002, 0.55, 0.6];
        let harmonics = find_harmonics(0.2, &frequencies);

        let numbers: Vec<usize> = harmonics.iter().map(|h| h.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_relative_eq!(harmonics[1].frequency, 0.4, epsilon = 1e-12);
        assert_relative_eq!(harmonics[2].frequency, 0.6000000000000001, epsilon = 1e-12);
    }

    #[test]
    fn test_outside_tolerance_is_ignored() {
        let harmonics = find_harmonics(0.2, &[0.41]);
        assert_eq!(harmonics.len(), 1);
    }
}
