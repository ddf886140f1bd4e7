use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;

use serde::Serialize;

use crate::store::StoreError;

pub async fn handler404(path: Uri) -> Error {
    Error::NotFound {
        message: format!("Invalid path: {}", path),
    }
}

/// Successful envelope: `success: true` followed by the flattened payload.
#[derive(Debug, Clone, Serialize)]
pub struct Success<V> {
    success: bool,
    #[serde(flatten)]
    value: V,
}

impl<V: Serialize> Success<V> {
    pub fn of(value: V) -> Self {
        Self {
            success: true,
            value,
        }
    }
}

#[derive(Debug, Serialize)]
struct Failure<'a> {
    success: bool,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [String]>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("{message}")]
    MalformedInput { message: String },
    #[error("{message}: {}", .errors.join("; "))]
    ValidationFailed {
        message: String,
        errors: Vec<String>,
    },
    #[error("{message}")]
    Conflict { message: String },
    #[error("{message}")]
    NotFound { message: String },
    #[error("{message}")]
    MethodNotAllowed { message: String },
    #[error("{kind}: {message}")]
    StoreFailure { kind: &'static str, message: String },
}

impl Error {
    pub fn malformed<S: Into<String>>(msg: S) -> Error {
        Error::MalformedInput {
            message: msg.into(),
        }
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Error {
        Error::NotFound {
            message: msg.into(),
        }
    }

    pub fn conflict<S: Into<String>>(msg: S) -> Error {
        Error::Conflict {
            message: msg.into(),
        }
    }

    pub fn method_not_allowed() -> Error {
        Error::MethodNotAllowed {
            message: "Method not allowed".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::MalformedInput { .. } | Error::ValidationFailed { .. } => {
                StatusCode::BAD_REQUEST
            }
            Error::Conflict { .. } => StatusCode::CONFLICT,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Error::StoreFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client.
    pub fn message(&self) -> &str {
        match self {
            Error::MalformedInput { message }
            | Error::ValidationFailed { message, .. }
            | Error::Conflict { message }
            | Error::NotFound { message }
            | Error::MethodNotAllowed { message }
            | Error::StoreFailure { message, .. } => message,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let errors = match &self {
            Error::ValidationFailed { errors, .. } => Some(errors.as_slice()),
            _ => None,
        };
        let body = Failure {
            success: false,
            message: self.message(),
            errors,
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        log::debug!("rejecting request body: {}", err);
        Self::malformed("Invalid JSON data")
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => Self::conflict("Email address already registered"),
            StoreError::Unavailable(cause) => {
                log::error!("student store unavailable: {}", cause);
                Self::StoreFailure {
                    kind: "ConnectionError",
                    message: "Database connection failed".to_string(),
                }
            }
            StoreError::Query(cause) => {
                log::error!("student store query failed: {}", cause);
                Self::StoreFailure {
                    kind: "DatabaseError",
                    message: "Database operation failed".to_string(),
                }
            }
        }
    }
}
