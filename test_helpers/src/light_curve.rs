//! Seeded synthetic light curves.
//!
//! Produces a sinusoidally varying magnitude with optional Gaussian noise
//! and irregular sampling. The same settings and seed always yield the
//! same samples.

use std::f64::consts::PI;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::TestHelperError;

/// One synthetic measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightCurveSample {
    pub time: f64,
    pub magnitude: f64,
    /// Noise sigma used for this sample
    pub uncertainty: f64,
}

/// Builder for a sinusoidal light curve.
///
/// `magnitude(t) = mean + amplitude * cos(2π (t - start) / period) + noise`
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticLightCurve {
    pub period: f64,
    pub points: usize,
    pub start_time: f64,
    /// Nominal spacing between samples
    pub cadence: f64,
    /// Each time is pushed later by up to this fraction of the cadence
    pub jitter: f64,
    pub amplitude: f64,
    pub mean_magnitude: f64,
    /// Gaussian noise sigma in magnitudes
    pub noise: f64,
    pub seed: u64,
}

impl SyntheticLightCurve {
    /// Unit-amplitude, noise-free curve sampled once per time unit from zero.
    pub fn new(period: f64, points: usize) -> Self {
        Self {
            period,
            points,
            start_time: 0.0,
            cadence: 1.0,
            jitter: 0.0,
            amplitude: 1.0,
            mean_magnitude: 0.0,
            noise: 0.0,
            seed: 0,
        }
    }

    pub fn with_start_time(mut self, start_time: f64) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn with_cadence(mut self, cadence: f64) -> Self {
        self.cadence = cadence;
        self
    }

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn with_mean_magnitude(mut self, mean_magnitude: f64) -> Self {
        self.mean_magnitude = mean_magnitude;
        self
    }

    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Generate the samples in time order.
    ///
    /// # Errors
    /// * `TestHelperError::InvalidFixture` - If the period or cadence is not
    ///   positive, or the noise or jitter is negative
    pub fn generate(&self) -> Result<Vec<LightCurveSample>, TestHelperError> {
        if !(self.period > 0.0) || !self.period.is_finite() {
            return Err(TestHelperError::InvalidFixture(format!(
                "period must be positive, got {}",
                self.period
            )));
        }
        if !(self.cadence > 0.0) {
            return Err(TestHelperError::InvalidFixture(format!(
                "cadence must be positive, got {}",
                self.cadence
            )));
        }
        if !(0.0..1.0).contains(&self.jitter) {
            return Err(TestHelperError::InvalidFixture(format!(
                "jitter must be in [0, 1), got {}",
                self.jitter
            )));
        }
        let noise = Normal::new(0.0, self.noise).map_err(|e| {
            TestHelperError::InvalidFixture(format!("noise sigma {}: {}", self.noise, e))
        })?;

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let samples = (0..self.points)
            .map(|i| {
                let mut time = self.start_time + i as f64 * self.cadence;
                if self.jitter > 0.0 {
                    time += rng.random_range(0.0..self.jitter) * self.cadence;
                }
                let signal = self.amplitude * (2.0 * PI * (time - self.start_time) / self.period).cos();
                let error = if self.noise > 0.0 {
                    noise.sample(&mut rng)
                } else {
                    0.0
                };
                LightCurveSample {
                    time,
                    magnitude: self.mean_magnitude + signal + error,
                    uncertainty: self.noise,
                }
            })
            .collect();

        Ok(samples)
    }
}

/// Noise-free `cos(2π t / period)` sampled at `t = 0, 1, ..., points - 1`.
pub fn cosine(period: f64, points: usize) -> Result<Vec<LightCurveSample>, TestHelperError> {
    SyntheticLightCurve::new(period, points).generate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cosine_samples() {
        let samples = cosine(5.0, 100).unwrap();
        assert_eq!(samples.len(), 100);
        assert_relative_eq!(samples[0].magnitude, 1.0);
        assert_relative_eq!(samples[5].magnitude, 1.0, epsilon = 1e-12);
        assert_relative_eq!(samples[99].time, 99.0);
    }

    #[test]
    fn test_same_seed_same_curve() {
        let curve = SyntheticLightCurve::new(3.3, 50)
            .with_noise(0.1)
            .with_jitter(0.5)
            .with_seed(42);
        assert_eq!(curve.generate().unwrap(), curve.generate().unwrap());

        let other = curve.clone().with_seed(43).generate().unwrap();
        assert_ne!(curve.generate().unwrap(), other);
    }

    #[test]
    fn test_jittered_times_stay_ordered() {
        let samples = SyntheticLightCurve::new(2.0, 200)
            .with_jitter(0.9)
            .with_seed(1)
            .generate()
            .unwrap();
        assert!(samples.windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn test_invalid_settings() {
        assert!(SyntheticLightCurve::new(0.0, 10).generate().is_err());
        assert!(SyntheticLightCurve::new(1.0, 10).with_noise(-1.0).generate().is_err());
        assert!(SyntheticLightCurve::new(1.0, 10).with_jitter(1.5).generate().is_err());
        assert!(SyntheticLightCurve::new(1.0, 10).with_cadence(0.0).generate().is_err());
    }
}
