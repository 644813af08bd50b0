//! Feature scaling applied before classification

use crate::InferenceError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Transforms a feature row before it reaches the classifier
pub trait FeatureScaler: Send + Sync {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError>;
}

/// Standard scaler: `(x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Load a scaler from a JSON file
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        info!("Loading feature scaler from {}", path.display());
        let raw = std::fs::read_to_string(path)
            .map_err(|e| InferenceError::ModelLoad(format!("{}: {}", path.display(), e)))?;
        let scaler: Self = serde_json::from_str(&raw)
            .map_err(|e| InferenceError::InvalidArtifact(format!("scaler: {}", e)))?;

        if scaler.mean.len() != scaler.scale.len() {
            return Err(InferenceError::InvalidArtifact(format!(
                "scaler has {} means and {} scales",
                scaler.mean.len(),
                scaler.scale.len()
            )));
        }
        Ok(scaler)
    }

    /// Number of features the scaler was fitted on
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }
}

impl FeatureScaler for StandardScaler {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if features.len() != self.mean.len() || features.len() != self.scale.len() {
            return Err(InferenceError::InferenceFailed(format!(
                "scaler fitted on {} features, got {}",
                self.mean.len(),
                features.len()
            )));
        }

        let scaled: Vec<f64> = features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| {
                let s = if *s == 0.0 { 1.0 } else { *s };
                (x - m) / s
            })
            .collect();

        if scaled.iter().any(|v| !v.is_finite()) {
            return Err(InferenceError::InferenceFailed(
                "scaled features are not finite".to_string(),
            ));
        }
        Ok(scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform() {
        let scaler = StandardScaler {
            mean: vec![1.0, 2.0, 3.0],
            scale: vec![2.0, 0.0, 0.5],
        };
        let scaled = scaler.transform(&[3.0, 5.0, 2.0]).unwrap();
        assert_eq!(scaled, vec![1.0, 3.0, -2.0]);
    }

    #[test]
    fn test_length_mismatch() {
        let scaler = StandardScaler {
            mean: vec![0.0; 3],
            scale: vec![1.0; 3],
        };
        assert!(scaler.transform(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_load_rejects_ragged_scaler() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        std::fs::write(&path, r#"{"mean": [0.0, 1.0], "scale": [1.0]}"#).unwrap();
        assert!(matches!(
            StandardScaler::load(&path),
            Err(InferenceError::InvalidArtifact(_))
        ));
    }
}
