use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use faculty_core::error::FacultyError;

use super::tracing::current_request_id;

/// Client-facing message for failures whose detail stays in the logs.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Response envelope shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    /// Whether the call succeeded.
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    /// Request ID for tracing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip)]
    status: StatusCode,
}

impl ApiResponse {
    /// Create a successful response carrying `data`.
    pub fn success(data: impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self {
                ok: true,
                message: None,
                data: Some(data),
                error: None,
                request_id: None,
                status: StatusCode::OK,
            },
            Err(e) => Self::error(ApiError::internal(format!("Failed to encode response: {}", e))),
        }
    }

    /// Create a successful response with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: Some(message.into()),
            data: None,
            error: None,
            request_id: None,
            status: StatusCode::OK,
        }
    }

    /// Create an error response.
    pub fn error(error: ApiError) -> Self {
        Self {
            ok: false,
            message: None,
            data: None,
            status: error.status_code(),
            error: Some(error),
            request_id: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Override the HTTP status of a successful response.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        if self.ok {
            self.status = status;
        }
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(mut self) -> Response {
        if self.request_id.is_none() {
            self.request_id = current_request_id();
        }
        (self.status, Json(self)).into_response()
    }
}

/// Error information carried in the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self.code.as_str() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            "PAYLOAD_TOO_LARGE" => StatusCode::PAYLOAD_TOO_LARGE,
            "TIMEOUT" => StatusCode::REQUEST_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new("TIMEOUT", message)
    }
}

impl From<FacultyError> for ApiError {
    fn from(err: FacultyError) -> Self {
        match err {
            FacultyError::NotFound(msg) => Self::not_found(msg),
            FacultyError::Validation(msg) => Self::validation(msg),
            FacultyError::Conflict(msg) => Self::conflict(msg),
            other => {
                tracing::error!("Request failed: {}", other);
                Self::internal(INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ApiResponse::error(self).into_response()
    }
}

/// Handler result: an envelope on both paths.
pub type ApiResult = Result<ApiResponse, ApiError>;
