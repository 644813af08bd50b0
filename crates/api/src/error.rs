//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use feature_engine::{SchemaError, ValidationError};
use inference_engine::InferenceError;
use serde_json::json;
use streaming::SourceError;
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("Model not loaded")]
    ModelNotLoaded,
    #[error(transparent)]
    NotFound(#[from] SourceError),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::ModelNotLoaded => ApiError::ModelNotLoaded,
            InferenceError::Validation(e) => ApiError::Validation(e),
            InferenceError::Schema(e) => ApiError::Schema(e),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ModelNotLoaded => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Schema(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Schema(e) => {
                error!("Feature schema inconsistency: {}", e);
                "Feature schema mismatch between extractor and model".to_string()
            }
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            ApiError::ModelNotLoaded => {
                "Model not loaded, the service is unhealthy".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let too_short: ApiError = ValidationError::TooShort { actual: 10, min: 100 }.into();
        assert_eq!(too_short.status(), StatusCode::BAD_REQUEST);

        let unloaded: ApiError = InferenceError::ModelNotLoaded.into();
        assert_eq!(unloaded.status(), StatusCode::SERVICE_UNAVAILABLE);

        let missing: ApiError = SourceError::Unavailable {
            scenario: "fault/cage".to_string(),
            reason: "unknown scenario".to_string(),
        }
        .into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let schema: ApiError = InferenceError::Schema(SchemaError::EmptyOrder("x@v1".to_string())).into();
        assert_eq!(schema.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_message_is_user_facing() {
        let err: ApiError = ValidationError::TooShort { actual: 50, min: 100 }.into();
        assert_eq!(err.to_string(), "Signal too short: 50 samples (minimum 100 samples)");
    }
}
