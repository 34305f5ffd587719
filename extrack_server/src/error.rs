//! Mapping of core errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use extrack_core::{Error, Field};

/// Error returned by every handler
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] Error),

    /// The request body or query string could not be decoded
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// A blocking store task panicked or was cancelled
    #[error("Task failed: {0}")]
    Task(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            // An unparseable exercise date has always answered 409.
            ApiError::Core(Error::Validation(v)) if v.field == Field::Date => StatusCode::CONFLICT,
            ApiError::Core(Error::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Core(Error::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Core(Error::Validation(v)) => ErrorBody {
                error: v.to_string(),
                field: Some(v.field.as_str()),
            },
            ApiError::Core(Error::NotFound(_)) => ErrorBody {
                error: "User not found".into(),
                field: None,
            },
            ApiError::MalformedPayload(_) => ErrorBody {
                error: self.to_string(),
                field: None,
            },
            ApiError::Core(_) | ApiError::Task(_) => {
                tracing::error!("Request failed: {}", self);
                ErrorBody {
                    error: "Internal server error".into(),
                    field: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}
