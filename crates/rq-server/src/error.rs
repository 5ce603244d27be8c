//! Error-to-HTTP response conversion.
//!
//! Route handlers return `Result<T, AppError>`; [`rq_core::Error`] converts
//! into it with `?`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::middleware::request_id::RequestId;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: rq_core::Error,
    request_id: Option<String>,
}

impl AppError {
    pub fn new(inner: rq_core::Error) -> Self {
        Self {
            inner,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, id: &RequestId) -> Self {
        self.request_id = Some(id.0.clone());
        self
    }
}

impl From<rq_core::Error> for AppError {
    fn from(e: rq_core::Error) -> Self {
        Self::new(e)
    }
}

fn error_code(err: &rq_core::Error) -> &'static str {
    use rq_core::Error;
    match err {
        Error::RemoteUnavailable { .. } => "remote_unavailable",
        Error::RemoteRejected { .. } => "remote_rejected",
        Error::MalformedResponse { .. } => "malformed_response",
        Error::ConfigurationMissing(_) => "configuration_missing",
        Error::Validation(_) => "validation_error",
        Error::Internal(_) => "internal_error",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in API handler"
            );
        }

        let body = json!({
            "error": self.inner.user_message(),
            "code": error_code(&self.inner),
            "request_id": self.request_id,
        });

        (status, axum::Json(body)).into_response()
    }
}
