//! Frequency feature strategies
//!
//! Two trained classifiers in this system expect two different sets of
//! frequency features. Each set is produced by one strategy, and the strategy
//! is named by the [`FeatureOrder`](crate::FeatureOrder) of the classifier it
//! was trained with.

use crate::features::{names, FeatureMap};
use crate::fft::FftAnalyzer;
use crate::numeric::safe_ratio;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default Welch segment length (samples)
const WELCH_SEGMENT_LEN: usize = 1024;

/// Offset added inside the entropy logarithm
const ENTROPY_EPSILON: f64 = 1e-12;

/// Identifies a frequency feature strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Welch power spectral density features
    WelchPsd,
    /// Direct positive-frequency FFT features
    DirectFft,
}

impl StrategyKind {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::WelchPsd => "welch_psd",
            StrategyKind::DirectFft => "direct_fft",
        }
    }

    /// Instantiate the strategy
    pub fn strategy(&self) -> Box<dyn FrequencyFeatureStrategy> {
        match self {
            StrategyKind::WelchPsd => Box::new(WelchPsd::default()),
            StrategyKind::DirectFft => Box::new(DirectFft),
        }
    }

    /// Frequency feature names produced by this strategy
    pub fn frequency_feature_names(&self) -> &'static [&'static str] {
        match self {
            StrategyKind::WelchPsd => WelchPsd::NAMES,
            StrategyKind::DirectFft => DirectFft::NAMES,
        }
    }

    /// Whether an extractor using this strategy emits `name`
    pub fn produces(&self, name: &str) -> bool {
        names::TIME_DOMAIN.contains(&name) || self.frequency_feature_names().contains(&name)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computes frequency-domain features into a feature map
pub trait FrequencyFeatureStrategy: Send + Sync {
    /// Which strategy this is
    fn kind(&self) -> StrategyKind;

    /// Append frequency features for `signal` to `features`
    fn extract(
        &self,
        analyzer: &mut FftAnalyzer,
        signal: &[f64],
        sampling_rate: f64,
        features: &mut FeatureMap,
    );
}

/// Welch PSD features: power-weighted mean, spread and peak frequency
#[derive(Debug, Clone, Copy)]
pub struct WelchPsd {
    /// Maximum segment length (samples)
    pub max_segment_len: usize,
}

impl WelchPsd {
    const NAMES: &'static [&'static str] = &[names::FREQ_MEAN, names::FREQ_STD, names::FREQ_PEAK];
}

impl Default for WelchPsd {
    fn default() -> Self {
        Self {
            max_segment_len: WELCH_SEGMENT_LEN,
        }
    }
}

impl FrequencyFeatureStrategy for WelchPsd {
    fn kind(&self) -> StrategyKind {
        StrategyKind::WelchPsd
    }

    fn extract(
        &self,
        analyzer: &mut FftAnalyzer,
        signal: &[f64],
        sampling_rate: f64,
        features: &mut FeatureMap,
    ) {
        let psd = analyzer.welch_psd(signal, sampling_rate, self.max_segment_len);
        let total = psd.total_power();

        let weighted: f64 = psd.frequencies.iter().zip(&psd.power).map(|(f, p)| f * p).sum();
        let freq_mean = safe_ratio(weighted, total, 0.0);

        let spread: f64 = psd
            .frequencies
            .iter()
            .zip(&psd.power)
            .map(|(f, p)| (f - freq_mean).powi(2) * p)
            .sum();
        let freq_std = safe_ratio(spread, total, 0.0).sqrt();

        let mut peak_idx = 0;
        for (i, &p) in psd.power.iter().enumerate() {
            if p > psd.power[peak_idx] {
                peak_idx = i;
            }
        }
        let freq_peak = psd.frequencies.get(peak_idx).copied().unwrap_or(0.0);

        features.insert(names::FREQ_MEAN, freq_mean);
        features.insert(names::FREQ_STD, freq_std);
        features.insert(names::FREQ_PEAK, freq_peak);
    }
}

/// Direct FFT features: dominant peaks, spectral entropy and centroid
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectFft;

impl DirectFft {
    const NAMES: &'static [&'static str] = &[
        names::DOMINANT_FREQUENCY,
        names::PEAK_FFT_MAGNITUDE,
        names::TOP_FREQ_1,
        names::TOP_FREQ_2,
        names::TOP_FREQ_3,
        names::SPECTRAL_ENTROPY,
        names::FREQUENCY_CENTROID,
    ];
}

impl FrequencyFeatureStrategy for DirectFft {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DirectFft
    }

    fn extract(
        &self,
        analyzer: &mut FftAnalyzer,
        signal: &[f64],
        sampling_rate: f64,
        features: &mut FeatureMap,
    ) {
        let spectrum = analyzer.positive_spectrum(signal, sampling_rate);
        let freqs = &spectrum.frequencies;
        let mags = &spectrum.magnitudes;

        let ranked = rank_descending(mags);

        let top = |rank: usize| ranked.get(rank).map(|&i| freqs[i]).unwrap_or(0.0);
        let dominant_frequency = top(0);
        let peak_fft_magnitude = ranked.first().map(|&i| mags[i]).unwrap_or(0.0);

        let total_power: f64 = mags.iter().map(|m| m * m).sum();
        let spectral_entropy = if total_power > 0.0 {
            -mags
                .iter()
                .map(|m| {
                    let p = m * m / total_power;
                    p * (p + ENTROPY_EPSILON).log2()
                })
                .sum::<f64>()
        } else {
            0.0
        };

        let weighted: f64 = freqs.iter().zip(mags).map(|(f, m)| f * m).sum();
        let frequency_centroid = safe_ratio(weighted, mags.iter().sum(), 0.0);

        features.insert(names::DOMINANT_FREQUENCY, dominant_frequency);
        features.insert(names::PEAK_FFT_MAGNITUDE, peak_fft_magnitude);
        features.insert(names::TOP_FREQ_1, top(0));
        features.insert(names::TOP_FREQ_2, top(1));
        features.insert(names::TOP_FREQ_3, top(2));
        features.insert(names::SPECTRAL_ENTROPY, spectral_entropy);
        features.insert(names::FREQUENCY_CENTROID, frequency_centroid);
    }
}

/// Bin indices sorted by magnitude, largest first; ties keep ascending bin order
fn rank_descending(magnitudes: &[f64]) -> Vec<usize> {
    let mut ranked: Vec<usize> = (0..magnitudes.len()).collect();
    ranked.sort_by(|&a, &b| magnitudes[b].total_cmp(&magnitudes[a]));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn run(strategy: &dyn FrequencyFeatureStrategy, signal: &[f64], fs: f64) -> FeatureMap {
        let mut analyzer = FftAnalyzer::new();
        let mut features = FeatureMap::new();
        strategy.extract(&mut analyzer, signal, fs, &mut features);
        features
    }

    #[test]
    fn test_welch_names() {
        let features = run(&WelchPsd::default(), &vec![0.3; 256], 12_000.0);
        let names: Vec<_> = features.names().collect();
        assert_eq!(names, vec!["freq_mean", "freq_std", "freq_peak"]);
    }

    #[test]
    fn test_welch_zero_power() {
        let features = run(&WelchPsd::default(), &vec![0.0; 256], 12_000.0);
        assert_eq!(features.get(names::FREQ_MEAN), Some(0.0));
        assert_eq!(features.get(names::FREQ_STD), Some(0.0));
        assert_eq!(features.get(names::FREQ_PEAK), Some(0.0));
    }

    #[test]
    fn test_fft_top_frequencies_ranked() {
        let fs = 1000.0;
        let signal: Vec<f64> = (0..1000)
            .map(|i| {
                let t = i as f64 / fs;
                3.0 * (2.0 * PI * 50.0 * t).sin()
                    + 2.0 * (2.0 * PI * 120.0 * t).sin()
                    + 1.0 * (2.0 * PI * 200.0 * t).sin()
            })
            .collect();
        let features = run(&DirectFft, &signal, fs);

        assert_eq!(features.get(names::DOMINANT_FREQUENCY), Some(50.0));
        assert_eq!(features.get(names::TOP_FREQ_1), Some(50.0));
        assert_eq!(features.get(names::TOP_FREQ_2), Some(120.0));
        assert_eq!(features.get(names::TOP_FREQ_3), Some(200.0));
        // |X| of a bin-centered sine of amplitude A is A·n/2
        let peak = features.get(names::PEAK_FFT_MAGNITUDE).unwrap();
        assert!((peak - 1500.0).abs() < 1e-6);
    }

    #[test]
    fn test_rank_ties_keep_lower_bin_first() {
        let ranked = rank_descending(&[1.0, 3.0, 2.0, 3.0, 2.0]);
        assert_eq!(ranked, vec![1, 3, 2, 4, 0]);
    }

    #[test]
    fn test_fft_flat_spectrum_entropy() {
        // An impulse spreads energy evenly over the 31 positive bins
        let mut signal = vec![0.0; 64];
        signal[0] = 1.0;
        let features = run(&DirectFft, &signal, 64.0);
        let entropy = features.get(names::SPECTRAL_ENTROPY).unwrap();
        assert!((entropy - 31f64.log2()).abs() < 1e-6);
        let centroid = features.get(names::FREQUENCY_CENTROID).unwrap();
        assert!((centroid - 16.0).abs() < 1e-6);
    }

    #[test]
    fn test_fft_zero_signal() {
        let features = run(&DirectFft, &vec![0.0; 128], 12_000.0);
        assert_eq!(features.get(names::SPECTRAL_ENTROPY), Some(0.0));
        assert_eq!(features.get(names::FREQUENCY_CENTROID), Some(0.0));
        assert_eq!(features.get(names::PEAK_FFT_MAGNITUDE), Some(0.0));
    }

    #[test]
    fn test_strategy_kind_serde() {
        let json = serde_json::to_string(&StrategyKind::DirectFft).unwrap();
        assert_eq!(json, "\"direct_fft\"");
        let kind: StrategyKind = serde_json::from_str("\"welch_psd\"").unwrap();
        assert_eq!(kind, StrategyKind::WelchPsd);
        assert_eq!(kind.strategy().kind(), StrategyKind::WelchPsd);
    }

    #[test]
    fn test_produces() {
        assert!(StrategyKind::WelchPsd.produces("kurtosis"));
        assert!(StrategyKind::WelchPsd.produces("freq_peak"));
        assert!(!StrategyKind::WelchPsd.produces("spectral_entropy"));
        assert!(StrategyKind::DirectFft.produces("top_freq_2"));
        assert!(!StrategyKind::DirectFft.produces("freq_mean"));
    }
}
