//! Classifier artifact manifest
//!
//! ```json
//! {
//!   "name": "cwru-bearing-rf",
//!   "version": "2.0.0",
//!   "order": { "name": "cwru-welch", "version": 2, "strategy": "welch_psd", "features": ["mean", "..."] },
//!   "classes": ["ball", "inner_race", "normal", "outer_race"],
//!   "n_features": 14,
//!   "classifier": { "format": "forest", "path": "forest.json" },
//!   "scaler": null
//! }
//! ```

use crate::fault::FaultClass;
use crate::InferenceError;
use feature_engine::FeatureOrder;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Classifier serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierFormat {
    Forest,
    Onnx,
}

/// Location and format of the classifier file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierSpec {
    pub format: ClassifierFormat,
    /// Path relative to the manifest
    pub path: PathBuf,
    /// ONNX output holding class probabilities
    #[serde(default = "default_output_index")]
    pub output_index: usize,
}

fn default_output_index() -> usize {
    1
}

/// Manifest describing a trained classifier artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub name: String,
    pub version: String,
    /// Feature order the classifier was trained against
    pub order: FeatureOrder,
    /// Class labels in classifier output order
    pub classes: Vec<String>,
    pub n_features: usize,
    pub classifier: ClassifierSpec,
    /// Optional scaler path relative to the manifest
    #[serde(default)]
    pub scaler: Option<PathBuf>,
}

impl ArtifactManifest {
    /// Read a manifest from disk
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        info!("Reading model manifest {}", path.display());
        let raw = std::fs::read_to_string(path).map_err(|e| {
            error!("Failed to read manifest {}: {}", path.display(), e);
            InferenceError::ModelLoad(format!("{}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| InferenceError::InvalidArtifact(format!("manifest: {}", e)))
    }

    /// Check the order and class list, returning parsed classes
    pub fn validate(&self) -> Result<Vec<FaultClass>, InferenceError> {
        self.order.validate()?;
        self.order.ensure_len(self.n_features)?;

        let mut seen = HashSet::new();
        let mut classes = Vec::with_capacity(self.classes.len());
        for label in &self.classes {
            let class = FaultClass::from_label(label).ok_or_else(|| {
                InferenceError::InvalidArtifact(format!("unknown class label '{}'", label))
            })?;
            if !seen.insert(class) {
                return Err(InferenceError::InvalidArtifact(format!(
                    "duplicate class label '{}'",
                    label
                )));
            }
            classes.push(class);
        }

        if classes.is_empty() {
            return Err(InferenceError::InvalidArtifact("manifest lists no classes".to_string()));
        }
        Ok(classes)
    }

    /// Resolve a manifest-relative path
    pub fn resolve(manifest_path: &Path, relative: &Path) -> PathBuf {
        match manifest_path.parent() {
            Some(dir) if relative.is_relative() => dir.join(relative),
            _ => relative.to_path_buf(),
        }
    }
}
