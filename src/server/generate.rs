//! `/api/generate` handler and its error mapping.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use super::metrics::{record_error, record_generation};
use super::state::GuardedOrchestrator;
use crate::mood::{MoodError, MoodRequest, MoodResult};

pub const GENERATION_FAILED_MESSAGE: &str = "Failed to analyze mood and generate playlist";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";
pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Image is too large";

const ENDPOINT: &str = "/api/generate";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Message is returned to the caller as is.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Detail is logged, never returned.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<MoodError> for ApiError {
    fn from(err: MoodError) -> Self {
        match err {
            MoodError::Validation(message) => ApiError::BadRequest(message),
            err @ MoodError::Upstream { .. } => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::BadRequest(format!("Invalid JSON body: {}", rejection.body_text()))
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "validation", msg),
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                PAYLOAD_TOO_LARGE_MESSAGE.to_string(),
            ),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "method_not_allowed",
                METHOD_NOT_ALLOWED_MESSAGE.to_string(),
            ),
            ApiError::Internal(detail) => {
                error!("Generation failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "upstream",
                    GENERATION_FAILED_MESSAGE.to_string(),
                )
            }
        };
        record_error(error_type, ENDPOINT);

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub async fn generate(
    State(orchestrator): State<GuardedOrchestrator>,
    payload: Result<Json<MoodRequest>, JsonRejection>,
) -> Result<Json<MoodResult>, ApiError> {
    let Json(request) = payload?;

    let request = request.validate().map_err(|err| {
        warn!("Rejected generate request: {}", err);
        ApiError::from(err)
    })?;

    let strategy = request.strategy;
    match orchestrator.generate(request).await {
        Ok(result) => {
            record_generation(strategy.as_str(), "success");
            Ok(Json(result))
        }
        Err(err) => {
            record_generation(strategy.as_str(), "failure");
            Err(err.into())
        }
    }
}

/// Any method other than POST on `/api/generate`.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
