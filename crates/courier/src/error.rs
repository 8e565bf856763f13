use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use courier_worker::{StatusReply, ValidationError, WorkerError};

/// Single place where domain failures become HTTP responses.
///
/// Gateway text is relayed for upstream rejections; transport and storage
/// details are only logged.
#[derive(Debug)]
pub struct ApiError(WorkerError);

impl From<WorkerError> for ApiError {
    fn from(err: WorkerError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(WorkerError::Validation(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            WorkerError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            WorkerError::Upstream { status, message } => (upstream_status(status), message),
            WorkerError::Gateway(e) => {
                tracing::error!(error = %e, "Gateway request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "gateway request failed".to_string(),
                )
            }
            WorkerError::Store(e) => {
                tracing::error!(error = %e, "Message store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "message store unavailable".to_string(),
                )
            }
        };

        (status, Json(StatusReply::error(message))).into_response()
    }
}

/// Mirrors a gateway status code, falling back to 502 when it is unusable.
pub fn upstream_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
}
