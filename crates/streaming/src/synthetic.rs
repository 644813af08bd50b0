//! Synthetic vibration scenarios

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Noise level of the healthy-looking scenario
const NOISE_SIGMA: f64 = 0.05;
/// Noise level added to the fault tone
const FAULT_SIGMA: f64 = 0.2;
const FAULT_AMPLITUDE: f64 = 0.5;
/// Angular frequency of the fault tone (rad/s)
const FAULT_OMEGA: f64 = 10.0;

/// Generated scenario used by random-mode streaming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntheticScenario {
    /// Low-level Gaussian noise
    SimulatedNoise,
    /// Low-frequency tone buried in stronger noise
    SimulatedFault,
}

impl SyntheticScenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyntheticScenario::SimulatedNoise => "simulated_noise",
            SyntheticScenario::SimulatedFault => "simulated_fault",
        }
    }

    /// Pick a scenario with a fair coin
    pub fn choose<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            SyntheticScenario::SimulatedFault
        } else {
            SyntheticScenario::SimulatedNoise
        }
    }

    /// Generate `len` samples spaced `dt` seconds apart
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, len: usize, dt: f64) -> Vec<f64> {
        (0..len)
            .map(|i| {
                let noise: f64 = rng.sample(StandardNormal);
                match self {
                    SyntheticScenario::SimulatedNoise => NOISE_SIGMA * noise,
                    SyntheticScenario::SimulatedFault => {
                        let t = i as f64 * dt;
                        FAULT_AMPLITUDE * (FAULT_OMEGA * t).sin() + FAULT_SIGMA * noise
                    }
                }
            })
            .collect()
    }
}
