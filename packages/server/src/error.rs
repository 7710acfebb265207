use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::upstream::{Service, UpstreamError};

/// Structured error response returned by all endpoints on failure.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `CONFIG_MISSING`,
    /// `UPSTREAM_ERROR`, `NETWORK_ERROR`, `NOT_FOUND`.
    #[schema(example = "UPSTREAM_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Upstream vote API error")]
    pub error: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    /// Base URL for the service is not configured.
    ConfigMissing(Service),
    /// The service answered with a non-2xx status.
    Upstream(Service),
    /// The service could not be reached or its reply could not be read.
    Network(Service),
    NotFound(String),
}

impl AppError {
    /// Log the upstream failure and collapse it into a client-facing error.
    ///
    /// Upstream detail stays in the logs.
    pub fn from_upstream(service: Service, err: UpstreamError) -> Self {
        match err {
            UpstreamError::Status { status, body } => {
                tracing::error!(
                    service = %service,
                    status = status.as_u16(),
                    body = %body,
                    "Upstream API error"
                );
                AppError::Upstream(service)
            }
            UpstreamError::Transport(e) | UpstreamError::Decode(e) => {
                tracing::error!(service = %service, error = %e, "Upstream API network error");
                AppError::Network(service)
            }
        }
    }

    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    error: msg,
                },
            ),
            AppError::ConfigMissing(service) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    code: "CONFIG_MISSING",
                    error: format!("{} API URL not configured", service.title()),
                },
            ),
            AppError::Upstream(service) => (
                StatusCode::BAD_GATEWAY,
                ErrorBody {
                    code: "UPSTREAM_ERROR",
                    error: format!("Upstream {service} API error"),
                },
            ),
            AppError::Network(service) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    code: "NETWORK_ERROR",
                    error: format!("Network error calling {service} API"),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    error: msg,
                },
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}
