//! Inference Engine Implementation

use crate::classifier::{argmax, Classifier};
use crate::fault::FaultClass;
use crate::forest::RandomForest;
use crate::manifest::{ArtifactManifest, ClassifierFormat};
use crate::onnx::OnnxClassifier;
use crate::scaler::{FeatureScaler, StandardScaler};
use crate::InferenceError;
use feature_engine::{
    FeatureExtractor, FeatureMap, FeatureOrder, FeatureVector, SchemaError, Signal,
    ValidationConfig, Validator,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Tolerance on the probability sum reported by a backend
const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Prediction result from inference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Predicted fault class
    pub label: FaultClass,
    /// Maximum class probability (0.0 to 1.0)
    pub confidence: f64,
    /// Probability for each known class
    pub probabilities: BTreeMap<FaultClass, f64>,
}

/// Features and prediction for one signal
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub features: FeatureMap,
    pub result: ClassificationResult,
}

/// Description of the loaded model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub version: String,
    /// Identity of the feature order (`name@vN`)
    pub feature_order: String,
    pub n_features: usize,
    pub classes: Vec<FaultClass>,
    pub has_scaler: bool,
}

struct LoadedModel {
    info: ModelInfo,
    order: FeatureOrder,
    classifier: Box<dyn Classifier>,
    scaler: Option<Box<dyn FeatureScaler>>,
}

/// Classifier adapter
///
/// Holds the artifact loaded at startup read-only. An engine without a model
/// answers every inference call with [`InferenceError::ModelNotLoaded`].
pub struct InferenceEngine {
    model: Option<LoadedModel>,
    validation: ValidationConfig,
}

impl InferenceEngine {
    /// Engine with no model, used when the artifact failed to load
    pub fn unloaded() -> Self {
        Self {
            model: None,
            validation: ValidationConfig::default(),
        }
    }

    /// Load a classifier artifact from its manifest
    pub fn load(manifest_path: &Path) -> Result<Self, InferenceError> {
        let manifest = ArtifactManifest::load(manifest_path)?;
        // Order problems must surface before any backend is touched
        manifest.validate()?;

        let classifier_path = ArtifactManifest::resolve(manifest_path, &manifest.classifier.path);
        let classifier: Box<dyn Classifier> = match manifest.classifier.format {
            ClassifierFormat::Forest => Box::new(RandomForest::load(&classifier_path)?),
            ClassifierFormat::Onnx => Box::new(OnnxClassifier::load(
                &classifier_path,
                manifest.n_features,
                manifest.classes.len(),
                manifest.classifier.output_index,
            )?),
        };

        let scaler = manifest.scaler.as_ref().and_then(|relative| {
            let path = ArtifactManifest::resolve(manifest_path, relative);
            match StandardScaler::load(&path) {
                Ok(scaler) if scaler.len() == manifest.n_features => {
                    Some(Box::new(scaler) as Box<dyn FeatureScaler>)
                }
                Ok(scaler) => {
                    warn!(
                        "Scaler fitted on {} features but model expects {}, using raw features",
                        scaler.len(),
                        manifest.n_features
                    );
                    None
                }
                Err(e) => {
                    warn!("Scaler unavailable ({}), using raw features", e);
                    None
                }
            }
        });

        Self::from_parts(&manifest, classifier, scaler)
    }

    /// Assemble an engine from an already loaded classifier
    pub fn from_parts(
        manifest: &ArtifactManifest,
        classifier: Box<dyn Classifier>,
        scaler: Option<Box<dyn FeatureScaler>>,
    ) -> Result<Self, InferenceError> {
        let classes = manifest.validate()?;

        if let Err(e) = manifest.order.ensure_len(classifier.n_features()) {
            error!("Feature order {} does not fit the classifier: {}", manifest.order.id(), e);
            return Err(e.into());
        }
        if classifier.n_classes() != classes.len() {
            return Err(InferenceError::InvalidArtifact(format!(
                "classifier outputs {} classes but manifest lists {}",
                classifier.n_classes(),
                classes.len()
            )));
        }

        let info = ModelInfo {
            name: manifest.name.clone(),
            version: manifest.version.clone(),
            feature_order: manifest.order.id(),
            n_features: manifest.n_features,
            classes,
            has_scaler: scaler.is_some(),
        };
        info!(
            "Model {} {} loaded (order {}, {} classes, scaler: {})",
            info.name,
            info.version,
            info.feature_order,
            info.classes.len(),
            info.has_scaler
        );

        Ok(Self {
            model: Some(LoadedModel {
                info,
                order: manifest.order.clone(),
                classifier,
                scaler,
            }),
            validation: ValidationConfig::default(),
        })
    }

    /// Override signal validation limits used by [`analyze`](Self::analyze)
    pub fn with_validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = validation;
        self
    }

    /// Check if a model is loaded
    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Loaded model description
    pub fn info(&self) -> Option<&ModelInfo> {
        self.model.as_ref().map(|m| &m.info)
    }

    /// Feature order of the loaded model
    pub fn order(&self) -> Option<&FeatureOrder> {
        self.model.as_ref().map(|m| &m.order)
    }

    fn model(&self) -> Result<&LoadedModel, InferenceError> {
        self.model.as_ref().ok_or(InferenceError::ModelNotLoaded)
    }

    /// Known classes in classifier output order
    pub fn classes(&self) -> Result<&[FaultClass], InferenceError> {
        Ok(&self.model()?.info.classes)
    }

    /// Feature extractor bound to the loaded model's strategy
    pub fn extractor(&self) -> Result<FeatureExtractor, InferenceError> {
        let model = self.model()?;
        Ok(FeatureExtractor::with_validator(
            model.order.strategy,
            Validator::new(self.validation.clone()),
        ))
    }

    /// Classify a feature vector
    pub fn predict(&self, vector: &FeatureVector) -> Result<ClassificationResult, InferenceError> {
        let start = std::time::Instant::now();
        let model = self.model()?;

        let expected_order = model.order.id();
        if vector.order_id() != expected_order {
            error!(
                "Refusing vector built with {} for a model trained on {}",
                vector.order_id(),
                expected_order
            );
            return Err(SchemaError::ForeignOrder {
                expected: expected_order,
                actual: vector.order_id().to_string(),
            }
            .into());
        }
        if vector.len() != model.info.n_features {
            return Err(SchemaError::LengthMismatch {
                order: expected_order,
                expected: model.info.n_features,
                actual: vector.len(),
            }
            .into());
        }

        let scaled = match &model.scaler {
            Some(scaler) => match scaler.transform(vector.values()) {
                Ok(scaled) => Some(scaled),
                Err(e) => {
                    warn!("Scaling failed ({}), using raw features", e);
                    None
                }
            },
            None => None,
        };
        let row = scaled.as_deref().unwrap_or(vector.values());

        let raw = model.classifier.predict_proba(row)?;
        let probabilities = normalize(raw, model.info.classes.len())?;

        let best = argmax(&probabilities)
            .ok_or_else(|| InferenceError::InferenceFailed("empty probability output".to_string()))?;

        let result = ClassificationResult {
            label: model.info.classes[best],
            confidence: probabilities[best],
            probabilities: model
                .info
                .classes
                .iter()
                .copied()
                .zip(probabilities.iter().copied())
                .collect(),
        };

        debug!(
            "Inference completed in {}us: {} ({:.3})",
            start.elapsed().as_micros(),
            result.label,
            result.confidence
        );
        Ok(result)
    }

    /// Project a feature map through the model's order and classify it
    pub fn predict_features(&self, features: &FeatureMap) -> Result<ClassificationResult, InferenceError> {
        let vector = self.model()?.order.project(features)?;
        self.predict(&vector)
    }

    /// Extract, project and classify a signal
    pub fn analyze(&self, signal: &Signal) -> Result<Analysis, InferenceError> {
        let features = self.extractor()?.extract(signal)?;
        let result = self.predict_features(&features)?;
        Ok(Analysis { features, result })
    }
}

/// Check backend probabilities and rescale them to sum to 1
fn normalize(raw: Vec<f64>, n_classes: usize) -> Result<Vec<f64>, InferenceError> {
    if raw.len() != n_classes {
        return Err(InferenceError::InferenceFailed(format!(
            "expected {} probabilities, got {}",
            n_classes,
            raw.len()
        )));
    }
    if raw.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(InferenceError::InferenceFailed(format!(
            "invalid probabilities {:?}",
            raw
        )));
    }

    let total: f64 = raw.iter().sum();
    if total <= 0.0 {
        return Err(InferenceError::InferenceFailed("probabilities sum to zero".to_string()));
    }
    if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
        debug!("Renormalizing probabilities summing to {}", total);
    }
    Ok(raw.into_iter().map(|p| p / total).collect())
}
