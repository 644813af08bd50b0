//! Feature ordering errors

use thiserror::Error;

/// Violations of the feature ordering contract
///
/// These indicate a mismatch between the extractor and the classifier
/// artifact and should never occur in a correct deployment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Feature required by the order is absent from the feature map
    #[error("Feature '{name}' required by order {order} is missing from the feature map")]
    MissingFeature { name: String, order: String },

    /// Order length differs from what the classifier expects
    #[error("Feature order {order} has {actual} features, classifier expects {expected}")]
    LengthMismatch {
        order: String,
        expected: usize,
        actual: usize,
    },

    /// Vector was built with a different order than the classifier was trained on
    #[error("Feature vector built with order {actual}, classifier requires {expected}")]
    ForeignOrder { expected: String, actual: String },

    /// Order lists the same feature twice
    #[error("Feature '{name}' appears more than once in order {order}")]
    DuplicateFeature { name: String, order: String },

    /// Order names a feature its extraction strategy never produces
    #[error("Feature '{name}' in order {order} is not produced by the {strategy} strategy")]
    UnknownFeature {
        name: String,
        order: String,
        strategy: String,
    },

    /// Order has no features at all
    #[error("Feature order {0} is empty")]
    EmptyOrder(String),
}
