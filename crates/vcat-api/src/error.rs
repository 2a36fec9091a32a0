//! API error types.

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use vcat_models::{ErrorKind, JobId, JobState};
use vcat_worker::JobFailure;

use crate::state::AppState;

/// Detail shown instead of internal error messages in production.
const REDACTED_DETAIL: &str = "An internal error occurred";

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("Invalid request body: {0}")]
    Validation(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error(transparent)]
    Job(#[from] JobFailure),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Unauthorized(_) => ErrorKind::AuthError,
            ApiError::Validation(_) | ApiError::PayloadTooLarge => ErrorKind::ValidationError,
            ApiError::Job(failure) => failure.kind(),
            ApiError::Internal(_) => ErrorKind::InternalError,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            _ => match self.kind() {
                ErrorKind::AuthError => StatusCode::UNAUTHORIZED,
                ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
                ErrorKind::DownloadError
                | ErrorKind::EncodingError
                | ErrorKind::UploadError
                | ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge;
        }
        ApiError::Validation(rejection.body_text())
    }
}

#[derive(Debug, Clone, Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorKind,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    job_id: Option<JobId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<JobState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostics: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let kind = self.kind();

        let detail = self.to_string();

        let body = match self {
            ApiError::Job(failure) => ErrorResponse {
                success: false,
                error: kind,
                detail,
                code: failure.error.code().map(str::to_string),
                diagnostics: failure.error.diagnostics().map(str::to_string),
                job_id: failure.job_id,
                stage: failure.stage,
            },
            _ => ErrorResponse {
                success: false,
                error: kind,
                detail,
                job_id: None,
                stage: None,
                code: None,
                diagnostics: None,
            },
        };

        // Carry a redacted copy; `redact_internal_errors` swaps it in
        let redacted = (kind == ErrorKind::InternalError).then(|| {
            RedactedBody(ErrorResponse {
                detail: REDACTED_DETAIL.to_string(),
                diagnostics: None,
                ..body.clone()
            })
        });

        let mut response = (status, Json(body)).into_response();
        if let Some(redacted) = redacted {
            response.extensions_mut().insert(redacted);
        }
        response
    }
}

/// Redacted form of an internal error body, attached as a response extension.
#[derive(Debug, Clone)]
struct RedactedBody(ErrorResponse);

/// Replace internal error details with a generic message in production.
pub async fn redact_internal_errors(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let redacted = response.extensions_mut().remove::<RedactedBody>();

    match redacted {
        Some(RedactedBody(body)) if state.config.is_production() => {
            (response.status(), Json(body)).into_response()
        }
        _ => response,
    }
}
