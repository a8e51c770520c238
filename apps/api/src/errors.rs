use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::planner::chain::ChainError;

/// Fatal conditions raised before the router is built.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Model client initialization failed: {0}")]
    ModelInit(String),
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Session limit reached: {0}")]
    SessionLimit(String),

    #[error("Chain execution failed at stage {stage}: {message}")]
    ChainExecution { stage: u8, message: String },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ChainError> for AppError {
    fn from(err: ChainError) -> Self {
        AppError::ChainExecution {
            stage: err.stage.index(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, stage) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::SessionLimit(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SESSION_LIMIT_REACHED",
                msg.clone(),
                None,
            ),
            AppError::ChainExecution { stage, message } => {
                tracing::error!("Chain execution error (stage {stage}): {message}");
                (
                    StatusCode::BAD_GATEWAY,
                    "CHAIN_EXECUTION_ERROR",
                    "The language model could not complete your learning plan. Please try again."
                        .to_string(),
                    Some(*stage),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(stage) = stage {
            error["stage"] = json!(stage);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let response = AppError::Validation("target_role cannot be empty".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_chain_execution_maps_to_bad_gateway() {
        let response = AppError::ChainExecution {
            stage: 2,
            message: "boom".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_session_limit_maps_to_service_unavailable() {
        let response = AppError::SessionLimit("1000 live sessions".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let response = AppError::NotFound("session".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
