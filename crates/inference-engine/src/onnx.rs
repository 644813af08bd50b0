//! ONNX classifier evaluated with tract

use crate::classifier::Classifier;
use crate::InferenceError;
use std::path::Path;
use tract_onnx::prelude::*;
use tracing::{debug, error, info};

type OnnxPlan = TypedRunnableModel<TypedModel>;

/// ONNX classifier with input `f32[1, n_features]`
///
/// The output at `output_index` must be a `[1, n_classes]` probability tensor
/// (for converted scikit-learn models this is output 1, after the label).
pub struct OnnxClassifier {
    plan: OnnxPlan,
    n_features: usize,
    n_classes: usize,
    output_index: usize,
}

impl OnnxClassifier {
    /// Load and optimize an ONNX model
    pub fn load(
        path: &Path,
        n_features: usize,
        n_classes: usize,
        output_index: usize,
    ) -> Result<Self, InferenceError> {
        info!("Loading ONNX classifier from {}", path.display());

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, n_features]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| {
                error!("Failed to load ONNX model {}: {}", path.display(), e);
                InferenceError::ModelLoad(e.to_string())
            })?;

        let outputs = plan.model().outputs.len();
        if output_index >= outputs {
            return Err(InferenceError::InvalidArtifact(format!(
                "probability output {} requested but model has {} outputs",
                output_index, outputs
            )));
        }

        Ok(Self {
            plan,
            n_features,
            n_classes,
            output_index,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        let row: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let input = Tensor::from_shape(&[1, self.n_features], &row)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let probabilities = outputs
            .get(self.output_index)
            .ok_or_else(|| InferenceError::InferenceFailed("missing probability output".to_string()))?
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?
            .iter()
            .map(|&p| p as f64)
            .collect::<Vec<_>>();

        debug!("ONNX output {}: {:?}", self.output_index, probabilities);

        if probabilities.len() != self.n_classes {
            return Err(InferenceError::InferenceFailed(format!(
                "expected {} probabilities, got {}",
                self.n_classes,
                probabilities.len()
            )));
        }
        Ok(probabilities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = OnnxClassifier::load(&dir.path().join("absent.onnx"), 14, 4, 1);
        assert!(matches!(result, Err(InferenceError::ModelLoad(_))));
    }

    #[test]
    fn test_corrupt_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        std::fs::write(&path, b"not an onnx graph").unwrap();
        assert!(matches!(
            OnnxClassifier::load(&path, 14, 4, 1),
            Err(InferenceError::ModelLoad(_))
        ));
    }
}
