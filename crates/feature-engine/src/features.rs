//! Feature Map Assembly

use crate::fft::FftAnalyzer;
use crate::numeric::finite_or;
use crate::order::FeatureOrder;
use crate::signal::Signal;
use crate::statistics::TimeDomainFeatures;
use crate::strategy::{FrequencyFeatureStrategy, StrategyKind};
use data_validator::{ValidationError, Validator};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, warn};

/// Feature names
pub mod names {
    pub const MEAN: &str = "mean";
    pub const STD: &str = "std";
    pub const RMS: &str = "rms";
    pub const PEAK: &str = "peak";
    pub const PEAK_TO_PEAK: &str = "peak_to_peak";
    pub const CREST_FACTOR: &str = "crest_factor";
    pub const SKEWNESS: &str = "skewness";
    pub const KURTOSIS: &str = "kurtosis";
    pub const CLEARANCE_FACTOR: &str = "clearance_factor";
    pub const SHAPE_FACTOR: &str = "shape_factor";
    pub const IMPULSE_FACTOR: &str = "impulse_factor";

    pub const FREQ_MEAN: &str = "freq_mean";
    pub const FREQ_STD: &str = "freq_std";
    pub const FREQ_PEAK: &str = "freq_peak";

    pub const DOMINANT_FREQUENCY: &str = "dominant_frequency";
    pub const PEAK_FFT_MAGNITUDE: &str = "peak_fft_magnitude";
    pub const TOP_FREQ_1: &str = "top_freq_1";
    pub const TOP_FREQ_2: &str = "top_freq_2";
    pub const TOP_FREQ_3: &str = "top_freq_3";
    pub const SPECTRAL_ENTROPY: &str = "spectral_entropy";
    pub const FREQUENCY_CENTROID: &str = "frequency_centroid";

    /// Features every strategy emits
    pub const TIME_DOMAIN: &[&str] = &[
        MEAN,
        STD,
        RMS,
        PEAK,
        PEAK_TO_PEAK,
        CREST_FACTOR,
        SKEWNESS,
        KURTOSIS,
        CLEARANCE_FACTOR,
        SHAPE_FACTOR,
        IMPULSE_FACTOR,
    ];
}

/// Named feature values in extraction order
///
/// Values are always finite: anything else is replaced with 0 on insert and
/// the map is marked degenerate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMap {
    entries: Vec<(&'static str, f64)>,
    degenerate: bool,
}

impl FeatureMap {
    /// Create an empty feature map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a feature value
    pub fn insert(&mut self, name: &'static str, value: f64) {
        if !value.is_finite() {
            warn!("Feature {} evaluated to {}, using 0", name, value);
            self.degenerate = true;
        }
        let value = finite_or(value, 0.0);

        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Look up a feature value
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, v)| v)
    }

    /// Iterate over (name, value) pairs in extraction order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Iterate over feature names in extraction order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|&(n, _)| n)
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a guarded computation fell back to a default value
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Flag the map as computed from degenerate input
    pub fn mark_degenerate(&mut self) {
        self.degenerate = true;
    }
}

impl Serialize for FeatureMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Feature extractor bound to one frequency strategy
pub struct FeatureExtractor {
    /// FFT analyzer
    analyzer: FftAnalyzer,
    /// Frequency feature strategy
    strategy: Box<dyn FrequencyFeatureStrategy>,
    /// Input validator
    validator: Validator,
}

impl FeatureExtractor {
    /// Create a new feature extractor
    pub fn new(kind: StrategyKind) -> Self {
        Self::with_validator(kind, Validator::default())
    }

    /// Create an extractor with custom validation bounds
    pub fn with_validator(kind: StrategyKind, validator: Validator) -> Self {
        Self {
            analyzer: FftAnalyzer::new(),
            strategy: kind.strategy(),
            validator,
        }
    }

    /// Create the extractor a feature order was trained with
    pub fn for_order(order: &FeatureOrder) -> Self {
        Self::new(order.strategy)
    }

    /// Active strategy
    pub fn strategy(&self) -> StrategyKind {
        self.strategy.kind()
    }

    /// Extract features from a signal
    pub fn extract(&mut self, signal: &Signal) -> Result<FeatureMap, ValidationError> {
        self.extract_samples(signal.samples(), signal.sampling_rate())
    }

    /// Extract features from raw samples
    pub fn extract_samples(
        &mut self,
        samples: &[f64],
        sampling_rate: u32,
    ) -> Result<FeatureMap, ValidationError> {
        self.validator.validate(samples, sampling_rate)?;

        let time = TimeDomainFeatures::compute(samples);
        let mut features = FeatureMap::new();
        for (name, value) in time.entries() {
            features.insert(name, value);
        }
        if time.degenerate {
            debug!("Degenerate input: zero variance or zero energy signal");
            features.mark_degenerate();
        }

        self.strategy
            .extract(&mut self.analyzer, samples, sampling_rate as f64, &mut features);

        debug!(
            "Extracted {} features ({}) from {} samples",
            features.len(),
            self.strategy.kind(),
            samples.len()
        );

        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    const FS: u32 = 12_000;

    fn sine(freq: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / FS as f64).sin())
            .collect()
    }

    #[test]
    fn test_welch_feature_names() {
        let mut extractor = FeatureExtractor::new(StrategyKind::WelchPsd);
        let features = extractor.extract_samples(&sine(30.0, 2400), FS).unwrap();
        let names: Vec<_> = features.names().collect();
        assert_eq!(
            names,
            vec![
                "mean",
                "std",
                "rms",
                "peak",
                "peak_to_peak",
                "crest_factor",
                "skewness",
                "kurtosis",
                "clearance_factor",
                "shape_factor",
                "impulse_factor",
                "freq_mean",
                "freq_std",
                "freq_peak",
            ]
        );
    }

    #[test]
    fn test_fft_feature_count() {
        let mut extractor = FeatureExtractor::new(StrategyKind::DirectFft);
        let features = extractor.extract_samples(&sine(30.0, 2400), FS).unwrap();
        assert_eq!(features.len(), 18);
        assert!(features.get(names::SPECTRAL_ENTROPY).is_some());
        assert!(features.get(names::FREQ_MEAN).is_none());
    }

    #[test]
    fn test_too_short_signal() {
        let mut extractor = FeatureExtractor::new(StrategyKind::WelchPsd);
        let err = extractor.extract_samples(&vec![0.1; 99], FS).unwrap_err();
        assert_eq!(err, ValidationError::TooShort { actual: 99, min: 100 });
    }

    #[test]
    fn test_sine_peak_frequency_welch() {
        let mut extractor = FeatureExtractor::new(StrategyKind::WelchPsd);
        let features = extractor.extract_samples(&sine(30.0, 2400), FS).unwrap();
        let bin_width = FS as f64 / 1024.0;
        let freq_peak = features.get(names::FREQ_PEAK).unwrap();
        assert!((freq_peak - 30.0).abs() <= bin_width, "freq_peak = {freq_peak}");
    }

    #[test]
    fn test_sine_dominant_frequency_fft() {
        let mut extractor = FeatureExtractor::new(StrategyKind::DirectFft);
        let features = extractor.extract_samples(&sine(30.0, 2400), FS).unwrap();
        let bin_width = FS as f64 / 2400.0;
        let dominant = features.get(names::DOMINANT_FREQUENCY).unwrap();
        assert!((dominant - 30.0).abs() <= bin_width, "dominant = {dominant}");
    }

    #[test]
    fn test_off_bin_sine_within_one_bin() {
        for strategy in [StrategyKind::WelchPsd, StrategyKind::DirectFft] {
            let mut extractor = FeatureExtractor::new(strategy);
            let features = extractor.extract_samples(&sine(1234.5, 1500), FS).unwrap();
            let (name, bin_width) = match strategy {
                StrategyKind::WelchPsd => (names::FREQ_PEAK, FS as f64 / 1024.0),
                StrategyKind::DirectFft => (names::DOMINANT_FREQUENCY, FS as f64 / 1500.0),
            };
            let found = features.get(name).unwrap();
            assert!((found - 1234.5).abs() <= bin_width, "{strategy}: {found}");
        }
    }

    #[test]
    fn test_constant_signal() {
        let mut extractor = FeatureExtractor::new(StrategyKind::WelchPsd);
        let features = extractor.extract_samples(&vec![0.7; 500], FS).unwrap();
        assert_eq!(features.get(names::STD), Some(0.0));
        assert_eq!(features.get(names::PEAK_TO_PEAK), Some(0.0));
        assert!((features.get(names::RMS).unwrap() - 0.7).abs() < 1e-12);
        assert!((features.get(names::CREST_FACTOR).unwrap() - 1.0).abs() < 1e-12);
        assert!(features.is_degenerate());
    }

    #[test]
    fn test_all_zero_signal() {
        for strategy in [StrategyKind::WelchPsd, StrategyKind::DirectFft] {
            let mut extractor = FeatureExtractor::new(strategy);
            let features = extractor.extract_samples(&vec![0.0; 300], FS).unwrap();
            for name in [
                names::MEAN,
                names::RMS,
                names::PEAK,
                names::CREST_FACTOR,
                names::CLEARANCE_FACTOR,
                names::SHAPE_FACTOR,
                names::IMPULSE_FACTOR,
            ] {
                assert_eq!(features.get(name), Some(0.0), "{name}");
            }
            assert!(features.iter().all(|(_, v)| v.is_finite()));
        }
    }

    #[test]
    fn test_deterministic_extraction() {
        let signal: Vec<f64> = (0..2400)
            .map(|i| ((i * 7919) % 1000) as f64 / 500.0 - 1.0)
            .collect();
        for strategy in [StrategyKind::WelchPsd, StrategyKind::DirectFft] {
            let first = FeatureExtractor::new(strategy).extract_samples(&signal, FS).unwrap();
            let mut reused = FeatureExtractor::new(strategy);
            reused.extract_samples(&sine(10.0, 700), FS).unwrap();
            let second = reused.extract_samples(&signal, FS).unwrap();

            let bits = |m: &FeatureMap| m.iter().map(|(n, v)| (n, v.to_bits())).collect::<Vec<_>>();
            assert_eq!(bits(&first), bits(&second));
        }
    }

    #[test]
    fn test_non_finite_values_are_replaced() {
        let mut features = FeatureMap::new();
        features.insert("x", f64::NAN);
        features.insert("y", 2.0);
        features.insert("y", 3.0);
        assert_eq!(features.get("x"), Some(0.0));
        assert_eq!(features.get("y"), Some(3.0));
        assert_eq!(features.len(), 2);
        assert!(features.is_degenerate());
    }

    #[test]
    fn test_serializes_in_extraction_order() {
        let mut features = FeatureMap::new();
        features.insert(names::RMS, 1.5);
        features.insert(names::MEAN, 0.25);
        let json = serde_json::to_string(&features).unwrap();
        assert_eq!(json, r#"{"rms":1.5,"mean":0.25}"#);
    }

    proptest! {
        #[test]
        fn prop_features_are_finite(
            samples in proptest::collection::vec(-1.0e4f64..1.0e4, 100..1200),
            rate in 1u32..50_000,
            fft in any::<bool>(),
        ) {
            let strategy = if fft { StrategyKind::DirectFft } else { StrategyKind::WelchPsd };
            let features = FeatureExtractor::new(strategy).extract_samples(&samples, rate).unwrap();
            prop_assert!(features.iter().all(|(_, v)| v.is_finite()));
        }

        #[test]
        fn prop_short_signals_rejected(len in 0usize..100) {
            let result = FeatureExtractor::new(StrategyKind::WelchPsd).extract_samples(&vec![1.0; len], FS);
            let is_too_short = matches!(result, Err(ValidationError::TooShort { .. }));
            prop_assert!(is_too_short);
        }
    }
}
