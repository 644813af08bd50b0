//! Bearing Fault Classifier Adapter
//!
//! Loads a trained classifier artifact together with the feature order it was
//! trained against, and turns ordered feature vectors into class
//! probabilities. Two classifier formats are supported: a JSON decision-tree
//! ensemble and an ONNX model evaluated with tract.

mod classifier;
mod engine;
mod fault;
mod forest;
mod manifest;
mod onnx;
mod scaler;

pub use classifier::Classifier;
pub use engine::{Analysis, ClassificationResult, InferenceEngine, ModelInfo};
pub use fault::{FaultClass, Severity};
pub use forest::{DecisionTree, RandomForest, TreeNode};
pub use manifest::{ArtifactManifest, ClassifierFormat, ClassifierSpec};
pub use onnx::OnnxClassifier;
pub use scaler::{FeatureScaler, StandardScaler};

use feature_engine::{SchemaError, ValidationError};
use thiserror::Error;

/// Errors during model loading and inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model not loaded")]
    ModelNotLoaded,
    #[error("Model load failed: {0}")]
    ModelLoad(String),
    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
}
