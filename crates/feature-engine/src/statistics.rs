//! Time-Domain Features Computation

use crate::features::names;
use crate::numeric::safe_ratio;

/// Time-domain features of a vibration signal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeDomainFeatures {
    /// Mean value
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    /// Root mean square
    pub rms: f64,
    /// Maximum absolute amplitude
    pub peak: f64,
    /// Maximum minus minimum
    pub peak_to_peak: f64,
    /// Peak / RMS
    pub crest_factor: f64,
    /// Skewness (asymmetry)
    pub skewness: f64,
    /// Excess kurtosis (tailedness, normal = 0)
    pub kurtosis: f64,
    /// Peak / mean(sqrt(|x|))²
    pub clearance_factor: f64,
    /// RMS / mean(|x|)
    pub shape_factor: f64,
    /// Peak / mean(|x|)
    pub impulse_factor: f64,
    /// Set when the signal has zero variance or zero energy
    pub degenerate: bool,
}

impl TimeDomainFeatures {
    /// Compute time-domain features from a slice of samples
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                degenerate: true,
                ..Self::default()
            };
        }

        let n = values.len() as f64;

        let mean = values.iter().sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let mut m2 = 0.0;
        let mut m3 = 0.0;
        let mut m4 = 0.0;
        let mut sum_sq = 0.0;
        let mut sum_abs = 0.0;
        let mut sum_sqrt_abs = 0.0;

        for &v in values {
            let d = v - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
            sum_sq += v * v;
            sum_abs += v.abs();
            sum_sqrt_abs += v.abs().sqrt();
        }

        // Identical samples are exactly zero-variance, whatever the rounding of the mean
        let constant = max == min;
        let variance = if constant { 0.0 } else { m2 / n };
        let std = variance.sqrt();

        // Skewness: E[(X-μ)³] / σ³
        let skewness = if constant {
            0.0
        } else {
            safe_ratio(m3 / n, variance * std, 0.0)
        };

        // Kurtosis: E[(X-μ)⁴] / σ⁴ - 3 (excess kurtosis)
        let kurtosis = if constant {
            0.0
        } else {
            safe_ratio(m4 / n, variance * variance, 3.0) - 3.0
        };

        let rms = (sum_sq / n).sqrt();
        let peak = max.abs().max(min.abs());
        let abs_mean = sum_abs / n;
        let sqrt_abs_mean = sum_sqrt_abs / n;

        Self {
            mean,
            std,
            rms,
            peak,
            peak_to_peak: max - min,
            crest_factor: safe_ratio(peak, rms, 0.0),
            skewness,
            kurtosis,
            clearance_factor: safe_ratio(peak, sqrt_abs_mean * sqrt_abs_mean, 0.0),
            shape_factor: safe_ratio(rms, abs_mean, 0.0),
            impulse_factor: safe_ratio(peak, abs_mean, 0.0),
            degenerate: std == 0.0 || rms == 0.0,
        }
    }

    /// Named values in canonical order
    pub fn entries(&self) -> [(&'static str, f64); 11] {
        [
            (names::MEAN, self.mean),
            (names::STD, self.std),
            (names::RMS, self.rms),
            (names::PEAK, self.peak),
            (names::PEAK_TO_PEAK, self.peak_to_peak),
            (names::CREST_FACTOR, self.crest_factor),
            (names::SKEWNESS, self.skewness),
            (names::KURTOSIS, self.kurtosis),
            (names::CLEARANCE_FACTOR, self.clearance_factor),
            (names::SHAPE_FACTOR, self.shape_factor),
            (names::IMPULSE_FACTOR, self.impulse_factor),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_computation() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let stats = TimeDomainFeatures::compute(&values);
        assert!((stats.mean - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_std_computation() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = TimeDomainFeatures::compute(&values);
        assert!((stats.std - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric_signal_has_no_skew() {
        let values = vec![-2.0, -1.0, 0.0, 1.0, 2.0];
        let stats = TimeDomainFeatures::compute(&values);
        assert!(stats.skewness.abs() < 1e-12);
        // Uniform-like spread is platykurtic
        assert!(stats.kurtosis < 0.0);
    }

    #[test]
    fn test_impulsive_signal_is_leptokurtic() {
        let mut values = vec![0.01; 1000];
        for i in (0..1000).step_by(100) {
            values[i] = 5.0;
        }
        let stats = TimeDomainFeatures::compute(&values);
        assert!(stats.kurtosis > 5.0);
        assert!(stats.crest_factor > 3.0);
    }

    #[test]
    fn test_constant_signal() {
        let stats = TimeDomainFeatures::compute(&vec![0.1; 2400]);
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.peak_to_peak, 0.0);
        assert_eq!(stats.skewness, 0.0);
        assert_eq!(stats.kurtosis, 0.0);
        assert!((stats.rms - 0.1).abs() < 1e-12);
        assert!((stats.crest_factor - 1.0).abs() < 1e-12);
        assert!(stats.degenerate);
    }

    #[test]
    fn test_negative_constant_signal() {
        let stats = TimeDomainFeatures::compute(&vec![-3.0; 200]);
        assert_eq!(stats.std, 0.0);
        assert!((stats.rms - 3.0).abs() < 1e-12);
        assert!((stats.peak - 3.0).abs() < 1e-12);
        assert!((stats.crest_factor - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_all_zero_signal() {
        let stats = TimeDomainFeatures::compute(&vec![0.0; 500]);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.rms, 0.0);
        assert_eq!(stats.peak, 0.0);
        assert_eq!(stats.crest_factor, 0.0);
        assert_eq!(stats.clearance_factor, 0.0);
        assert_eq!(stats.shape_factor, 0.0);
        assert_eq!(stats.impulse_factor, 0.0);
        assert!(stats.degenerate);
    }

    #[test]
    fn test_empty_values() {
        let stats = TimeDomainFeatures::compute(&[]);
        assert_eq!(stats.mean, 0.0);
        assert!(stats.degenerate);
    }
}
