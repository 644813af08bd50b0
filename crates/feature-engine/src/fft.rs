//! FFT-based Frequency Analysis

use rustfft::{num_complex::Complex, FftPlanner};
use std::f64::consts::PI;

/// Magnitude spectrum restricted to strictly positive frequencies
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spectrum {
    /// Bin frequencies (Hz)
    pub frequencies: Vec<f64>,
    /// |X(k)| for each bin
    pub magnitudes: Vec<f64>,
}

/// One-sided power spectral density estimate
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PowerSpectrum {
    /// Bin frequencies (Hz), starting at DC
    pub frequencies: Vec<f64>,
    /// Power density for each bin (V²/Hz)
    pub power: Vec<f64>,
    /// Number of averaged segments
    pub segments: usize,
}

impl PowerSpectrum {
    /// Total power across all bins
    pub fn total_power(&self) -> f64 {
        self.power.iter().sum()
    }

    /// Width of one frequency bin (Hz)
    pub fn bin_width(&self) -> f64 {
        match self.frequencies.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        }
    }
}

/// FFT analyzer with a cached planner
pub struct FftAnalyzer {
    /// FFT planner for efficient computation
    planner: FftPlanner<f64>,
}

impl FftAnalyzer {
    /// Create a new FFT analyzer
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Periodic Hann window
    fn hann_window(len: usize) -> Vec<f64> {
        if len == 1 {
            return vec![1.0];
        }
        (0..len)
            .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / len as f64).cos())
            .collect()
    }

    /// Magnitude spectrum of the raw signal over bins `1..=(n-1)/2`
    pub fn positive_spectrum(&mut self, signal: &[f64], sampling_rate: f64) -> Spectrum {
        let n = signal.len();
        if n < 3 {
            return Spectrum::default();
        }

        let mut buffer: Vec<Complex<f64>> =
            signal.iter().map(|&v| Complex::new(v, 0.0)).collect();
        let fft = self.planner.plan_fft_forward(n);
        fft.process(&mut buffer);

        let resolution = sampling_rate / n as f64;
        let last_bin = (n - 1) / 2;

        Spectrum {
            frequencies: (1..=last_bin).map(|k| k as f64 * resolution).collect(),
            magnitudes: buffer[1..=last_bin].iter().map(|c| c.norm()).collect(),
        }
    }

    /// Welch power spectral density estimate
    ///
    /// Segments of `min(max_segment_len, n)` samples with 50% overlap, each
    /// mean-detrended and Hann-windowed; periodograms are density-scaled,
    /// folded to one side and averaged.
    pub fn welch_psd(
        &mut self,
        signal: &[f64],
        sampling_rate: f64,
        max_segment_len: usize,
    ) -> PowerSpectrum {
        let n = signal.len();
        let segment_len = max_segment_len.min(n);
        if segment_len == 0 || sampling_rate <= 0.0 {
            return PowerSpectrum::default();
        }

        let step = segment_len - segment_len / 2;
        let window = Self::hann_window(segment_len);
        let window_energy: f64 = window.iter().map(|w| w * w).sum();
        let scale = 1.0 / (sampling_rate * window_energy);
        let bins = segment_len / 2 + 1;

        let fft = self.planner.plan_fft_forward(segment_len);
        let mut accumulated = vec![0.0; bins];
        let mut buffer: Vec<Complex<f64>> = Vec::with_capacity(segment_len);
        let mut segments = 0;
        let mut start = 0;

        while start + segment_len <= n {
            let segment = &signal[start..start + segment_len];
            let mean = segment.iter().sum::<f64>() / segment_len as f64;

            buffer.clear();
            buffer.extend(
                segment
                    .iter()
                    .zip(&window)
                    .map(|(&x, &w)| Complex::new((x - mean) * w, 0.0)),
            );
            fft.process(&mut buffer);

            for (acc, c) in accumulated.iter_mut().zip(&buffer) {
                *acc += c.norm_sqr();
            }

            segments += 1;
            start += step;
        }

        let nyquist_bin = (segment_len % 2 == 0).then_some(bins - 1);
        let power = accumulated
            .iter()
            .enumerate()
            .map(|(k, &p)| {
                let density = p * scale / segments as f64;
                if k == 0 || Some(k) == nyquist_bin {
                    density
                } else {
                    2.0 * density
                }
            })
            .collect();

        let resolution = sampling_rate / segment_len as f64;

        PowerSpectrum {
            frequencies: (0..bins).map(|k| k as f64 * resolution).collect(),
            power,
            segments,
        }
    }
}

impl Default for FftAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, sample_rate: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_positive_spectrum_sine_wave() {
        let mut analyzer = FftAnalyzer::new();
        let spectrum = analyzer.positive_spectrum(&sine(50.0, 1000.0, 1000), 1000.0);

        assert_eq!(spectrum.frequencies.len(), 499);
        assert_eq!(spectrum.frequencies[0], 1.0);

        let (idx, _) = spectrum
            .magnitudes
            .iter()
            .enumerate()
            .fold((0, 0.0), |best, (i, &m)| if m > best.1 { (i, m) } else { best });
        assert!((spectrum.frequencies[idx] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_positive_spectrum_odd_length() {
        let mut analyzer = FftAnalyzer::new();
        let spectrum = analyzer.positive_spectrum(&vec![1.0; 101], 101.0);
        assert_eq!(spectrum.frequencies.len(), 50);
        assert_eq!(*spectrum.frequencies.last().unwrap(), 50.0);
    }

    #[test]
    fn test_welch_segmentation() {
        let mut analyzer = FftAnalyzer::new();
        let psd = analyzer.welch_psd(&sine(30.0, 12_000.0, 2400), 12_000.0, 1024);

        // Starts at 0, 512, 1024
        assert_eq!(psd.segments, 3);
        assert_eq!(psd.power.len(), 513);
        assert!((psd.bin_width() - 12_000.0 / 1024.0).abs() < 1e-9);
    }

    #[test]
    fn test_welch_short_signal_uses_single_segment() {
        let mut analyzer = FftAnalyzer::new();
        let psd = analyzer.welch_psd(&sine(1000.0, 12_000.0, 100), 12_000.0, 1024);
        assert_eq!(psd.segments, 1);
        assert_eq!(psd.power.len(), 51);
        assert!((psd.bin_width() - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_welch_preserves_variance() {
        // Integrated density of a unit sine is close to its variance (0.5)
        let mut analyzer = FftAnalyzer::new();
        let psd = analyzer.welch_psd(&sine(375.0, 12_000.0, 4096), 12_000.0, 1024);
        let integrated = psd.total_power() * psd.bin_width();
        assert!((integrated - 0.5).abs() < 0.05, "integrated power {integrated}");
    }

    #[test]
    fn test_welch_constant_signal_has_no_power() {
        let mut analyzer = FftAnalyzer::new();
        let psd = analyzer.welch_psd(&vec![2.5; 300], 12_000.0, 1024);
        assert!(psd.total_power().abs() < 1e-20);
    }

    #[test]
    fn test_empty_signal() {
        let mut analyzer = FftAnalyzer::new();
        assert_eq!(analyzer.welch_psd(&[], 100.0, 1024).total_power(), 0.0);
        assert!(analyzer.positive_spectrum(&[], 100.0).magnitudes.is_empty());
    }
}
