//! Feature ordering contract
//!
//! A trained classifier consumes features positionally. The [`FeatureOrder`]
//! it was trained with travels inside its artifact manifest, names the
//! extraction strategy, and is the only way to build a [`FeatureVector`].

use crate::error::SchemaError;
use crate::features::{names, FeatureMap};
use crate::strategy::StrategyKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::error;

/// Named, versioned feature ordering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureOrder {
    /// Order name
    pub name: String,
    /// Order version
    pub version: u32,
    /// Extraction strategy the classifier was trained with
    pub strategy: StrategyKind,
    /// Feature names in classifier input order
    pub features: Vec<String>,
}

impl FeatureOrder {
    /// Create a feature order
    pub fn new<I, S>(name: impl Into<String>, version: u32, strategy: StrategyKind, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            version,
            strategy,
            features: features.into_iter().map(Into::into).collect(),
        }
    }

    /// Reference Welch order for fixtures and benches
    ///
    /// Not an authority: a loaded model always uses the order in its manifest.
    pub fn cwru_welch() -> Self {
        Self::new(
            "cwru-welch",
            2,
            StrategyKind::WelchPsd,
            [
                names::MEAN,
                names::STD,
                names::RMS,
                names::PEAK,
                names::PEAK_TO_PEAK,
                names::CREST_FACTOR,
                names::SKEWNESS,
                names::KURTOSIS,
                names::CLEARANCE_FACTOR,
                names::SHAPE_FACTOR,
                names::IMPULSE_FACTOR,
                names::FREQ_MEAN,
                names::FREQ_STD,
                names::FREQ_PEAK,
            ],
        )
    }

    /// Reference direct FFT order for fixtures and benches
    pub fn cwru_fft() -> Self {
        Self::new(
            "cwru-fft",
            1,
            StrategyKind::DirectFft,
            [
                names::RMS,
                names::PEAK,
                names::PEAK_TO_PEAK,
                names::CREST_FACTOR,
                names::KURTOSIS,
                names::SKEWNESS,
                names::STD,
                names::DOMINANT_FREQUENCY,
                names::PEAK_FFT_MAGNITUDE,
                names::TOP_FREQ_1,
                names::TOP_FREQ_2,
                names::TOP_FREQ_3,
                names::SPECTRAL_ENTROPY,
                names::FREQUENCY_CENTROID,
            ],
        )
    }

    /// Identity string (`name@vN`)
    pub fn id(&self) -> String {
        format!("{}@v{}", self.name, self.version)
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Check if the order has no features
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Check the order is non-empty, duplicate-free and producible by its strategy
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.features.is_empty() {
            return Err(SchemaError::EmptyOrder(self.id()));
        }

        let mut seen = HashSet::with_capacity(self.features.len());
        for name in &self.features {
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::DuplicateFeature {
                    name: name.clone(),
                    order: self.id(),
                });
            }
            if !self.strategy.produces(name) {
                return Err(SchemaError::UnknownFeature {
                    name: name.clone(),
                    order: self.id(),
                    strategy: self.strategy.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Check the order length against a classifier's input width
    pub fn ensure_len(&self, expected: usize) -> Result<(), SchemaError> {
        if self.features.len() != expected {
            return Err(SchemaError::LengthMismatch {
                order: self.id(),
                expected,
                actual: self.features.len(),
            });
        }
        Ok(())
    }

    /// Project a feature map into a vector in this order
    pub fn project(&self, features: &FeatureMap) -> Result<FeatureVector, SchemaError> {
        let values = self
            .features
            .iter()
            .map(|name| {
                features.get(name).ok_or_else(|| {
                    error!("Feature map is missing '{}' required by {}", name, self.id());
                    SchemaError::MissingFeature {
                        name: name.clone(),
                        order: self.id(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FeatureVector {
            values,
            order_id: self.id(),
        })
    }
}

/// Feature values projected through a [`FeatureOrder`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    values: Vec<f64>,
    order_id: String,
}

impl FeatureVector {
    /// Values in order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Identity of the order that produced this vector
    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the vector is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
