//! Error types for the HTTP server.
//!
//! [`ServerError`] covers server lifecycle failures. [`ApiError`] is what a
//! handler returns; it renders itself as the HTTP response.

use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::net::SocketAddr;
use thiserror::Error;
use todo_store::StoreError;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while starting or running the server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error while serving.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where a rejected value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// A path parameter.
    Params,
    /// The JSON request body.
    Body,
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Where the field was read from.
    pub location: Location,
    /// Field name.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    pub fn new(location: Location, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location,
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct ValidationBody<'a> {
    errors: &'a [FieldError],
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorMessage<'a>,
}

#[derive(Serialize)]
struct ErrorMessage<'a> {
    message: &'a str,
}

fn error_json(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: ErrorMessage { message },
        }),
    )
        .into_response()
}

/// Error returned from a request handler.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Path parameters or body failed validation.
    #[error("validation failed ({} field(s))", .0.len())]
    Validation(Vec<FieldError>),

    /// A page or item is missing, or not reachable through the addressed page.
    #[error("{0}")]
    NotFound(String),

    /// No route matches the request.
    #[error("{method} {uri} Not Found")]
    RouteNotFound {
        /// Request method.
        method: Method,
        /// Request URI.
        uri: Uri,
    },

    /// Unexpected failure; details are logged, not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Creates a validation error.
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::Validation(errors)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns the HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) | ApiError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        if error.is_not_found() {
            ApiError::NotFound(error.to_string())
        } else {
            ApiError::Internal(error.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Validation(errors) => {
                tracing::warn!(fields = errors.len(), "request rejected");
                (status, Json(ValidationBody { errors })).into_response()
            }
            ApiError::NotFound(message) => {
                tracing::debug!(%message, "not found");
                (status, message.clone()).into_response()
            }
            ApiError::RouteNotFound { .. } => error_json(status, &self.to_string()),
            ApiError::Internal(cause) => {
                tracing::error!(%cause, "request failed");
                error_json(status, "internal server error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_store::EntityId;

    #[test]
    fn error_classification() {
        assert!(ApiError::validation(vec![]).is_client_error());
        assert!(ApiError::NotFound("x".into()).is_client_error());
        assert!(ApiError::internal("oops").is_server_error());
        assert!(!ApiError::internal("oops").is_client_error());
    }

    #[test]
    fn store_errors_map_to_api_errors() {
        let id = EntityId::new();
        let err = ApiError::from(StoreError::page_not_found(id));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), format!("Page {id} not found!"));

        let err = ApiError::from(StoreError::Closed);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn route_not_found_message() {
        let err = ApiError::RouteNotFound {
            method: Method::GET,
            uri: "/nowhere?x=1".parse().unwrap(),
        };
        assert_eq!(err.to_string(), "GET /nowhere?x=1 Not Found");
    }

    #[test]
    fn field_error_serializes() {
        let err = FieldError::new(Location::Body, "text", "must be a string");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"location": "body", "field": "text", "message": "must be a string"})
        );
    }

    #[test]
    fn server_error_display() {
        let err = ServerError::Bind {
            addr: "127.0.0.1:1".parse().unwrap(),
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        };
        assert!(err.to_string().contains("127.0.0.1:1"));
    }
}
