//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::registry::RegistryError;
use crate::services::DemandError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Internal server error
    Internal(String),
    /// Demand query error
    Demand(DemandError),
    /// Model registry error
    Registry(RegistryError),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ApiError) {
        match self {
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Demand(e) => {
                let msg = e.to_string();
                match e {
                    DemandError::InvalidInput(_) => {
                        (StatusCode::BAD_REQUEST, ApiError::new("INVALID_INPUT", msg))
                    }
                    DemandError::TimestampNotFound(_) => (
                        StatusCode::NOT_FOUND,
                        ApiError::new("TIMESTAMP_NOT_FOUND", msg),
                    ),
                    DemandError::RegionNotFound { .. } => {
                        (StatusCode::NOT_FOUND, ApiError::new("REGION_NOT_FOUND", msg))
                    }
                    DemandError::Inference(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiError::new("INFERENCE_ERROR", msg),
                    ),
                }
            }
            AppError::Registry(e) => {
                let msg = e.to_string();
                match e {
                    RegistryError::NoVersionInStage { .. } => (
                        StatusCode::NOT_FOUND,
                        ApiError::new("NO_VERSION_IN_STAGE", msg),
                    ),
                    RegistryError::NotFound { .. } => {
                        (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg))
                    }
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiError::new("REGISTRY_ERROR", msg),
                    ),
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_body();
        if status.is_server_error() {
            tracing::error!(code = %error.code, message = %error.message, "Request failed");
        }
        (status, Json(error)).into_response()
    }
}

impl From<DemandError> for AppError {
    fn from(err: DemandError) -> Self {
        AppError::Demand(err)
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        AppError::Registry(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RegionId;
    use crate::registry::Stage;

    fn status_of(err: AppError) -> StatusCode {
        err.status_and_body().0
    }

    #[test]
    fn test_demand_error_statuses() {
        let ts = chrono::NaiveDate::from_ymd_opt(2016, 4, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            status_of(DemandError::InvalidInput("x".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DemandError::TimestampNotFound(ts).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(
                DemandError::RegionNotFound {
                    region: RegionId::new(3),
                    timestamp: ts
                }
                .into()
            ),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_registry_error_statuses() {
        let (status, body) =
            AppError::from(RegistryError::no_version_in_stage("m", Stage::Staging)).status_and_body();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, "NO_VERSION_IN_STAGE");

        assert_eq!(
            status_of(RegistryError::configuration("bad").into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
