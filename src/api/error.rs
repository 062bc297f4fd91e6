//! HTTP mapping of [`Error`].
//!
//! Every error becomes a JSON body `{ "message": ..., "field": ... }`. Retryable
//! store failures are answered with 503 and a `retry-after` hint.

use crate::errors::Error;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, error};

/// Seconds a client should wait before retrying after a 503
pub const RETRY_AFTER_SECS: &str = "3";

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable message
    pub message: String,
    /// Offending field, for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

impl Error {
    /// Status code this error is reported with.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        if self.is_retryable() {
            return StatusCode::SERVICE_UNAVAILABLE;
        }
        match self {
            Self::Validation { .. } | Self::DuplicateUser { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::NotAuthorized { .. } | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::ConcurrentAdvance { .. } => StatusCode::CONFLICT,
            Self::Config { .. }
            | Self::Database(_)
            | Self::StoreUnavailable { .. }
            | Self::Io(_)
            | Self::Csv(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self);
            ErrorBody {
                message: "Internal server error".to_string(),
                field: None,
            }
        } else {
            debug!("Request rejected with {}: {}", status, self);
            ErrorBody {
                field: match &self {
                    Self::Validation { field, .. } => Some(*field),
                    _ => None,
                },
                message: self.to_string(),
            }
        };

        let mut resp = (status, Json(body)).into_response();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            resp.headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from_static(RETRY_AFTER_SECS));
        }
        resp
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_names_field() {
        let resp = Error::validation("amount", "cannot be negative").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["field"], "amount");
        assert_eq!(body["message"], "Invalid amount: cannot be negative");
    }

    #[tokio::test]
    async fn test_store_unavailable_sets_retry_after() {
        let resp = Error::StoreUnavailable {
            message: "timed out".to_string(),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(resp.headers().get(RETRY_AFTER).unwrap(), RETRY_AFTER_SECS);
    }

    #[tokio::test]
    async fn test_internal_errors_are_not_leaked() {
        let resp = Error::Config {
            message: "secret path".to_string(),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["message"], "Internal server error");
        assert!(body.get("field").is_none());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::NotFound { entity: "Budget", id: 1 }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::NotAuthorized { entity: "Budget", id: 1 }.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(Error::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            Error::DuplicateUser {
                email: "a@b.c".to_string()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
