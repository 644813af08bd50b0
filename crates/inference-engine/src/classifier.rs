//! Classifier backend trait

use crate::InferenceError;

/// A trained probabilistic multi-class classifier
///
/// Class indices follow the label list of the artifact manifest.
pub trait Classifier: Send + Sync {
    /// Number of input features expected
    fn n_features(&self) -> usize;

    /// Number of classes in the probability output
    fn n_classes(&self) -> usize;

    /// Per-class probabilities for one feature row
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError>;

    /// Index of the most probable class; the first maximum wins
    fn predict(&self, features: &[f64]) -> Result<usize, InferenceError> {
        let probabilities = self.predict_proba(features)?;
        argmax(&probabilities)
            .ok_or_else(|| InferenceError::InferenceFailed("empty probability output".to_string()))
    }
}

pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some(b) if values[b] >= v => {}
            _ => best = Some(i),
        }
    }
    best
}
