//! API error type and HTTP status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{debug, error};

use neno_core::GatewayError;

/// Error returned by API handlers, rendered as the wire failure shape
/// `{"success": false, "error": ..., "request_id": ...}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub request_id: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    request_id: &'a str,
}

impl ApiError {
    /// Map a gateway failure to its HTTP status and wire message. Client
    /// faults are surfaced verbatim; server faults keep detail in the log
    /// and send a generic message to the caller.
    pub fn from_gateway(err: GatewayError, request_id: &str) -> Self {
        let status = match &err {
            GatewayError::Validation(_) | GatewayError::Parse(_) => StatusCode::BAD_REQUEST,
            GatewayError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Invocation(_) | GatewayError::ResponseShape(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Config(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(request_id, error = %err, "internal failure");
            "An unexpected error occurred".to_string()
        } else if err.is_client_error() {
            // Caller mistakes are not incidents.
            debug!(request_id, error = %err, "request rejected");
            err.to_string()
        } else {
            err.to_string()
        };

        Self {
            status,
            message,
            request_id: request_id.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: &self.message,
            request_id: &self.request_id,
        };
        (self.status, Json(body)).into_response()
    }
}
