//! Repository and request-level errors.

use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::response::{IntoResponse, Json, Response};
use crate::status::Status;

/// Failures raised by a [`ShippingRepository`](super::ShippingRepository).
#[derive(Debug, Error)]
pub enum ShippingError {
    #[error("shipping record {0} not found")]
    NotFound(i32),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be turned into a record.
    #[error("corrupt shipping row: {0}")]
    Corrupt(String),
}

/// Errors surfaced to HTTP callers as `{"error": "<message>"}`.
///
/// Missing fields answer `404`, not `400`; existing clients depend on it.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("SHIPPING_SECRET_KEY is missing or invalid")]
    MissingSecret,

    #[error("Failed to authenticate SHIPPING_SECRET_KEY")]
    InvalidSecret,

    #[error("All fields required")]
    MissingFields,

    #[error("Missing shippingId")]
    MissingShippingId,

    #[error("Invalid request body")]
    InvalidBody,

    #[error("Invalid shippingId")]
    InvalidShippingId,

    #[error("Shipping record not found")]
    NotFound,

    /// Detail is logged, never returned.
    #[error("Internal Server Error")]
    Internal(#[source] ShippingError),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            Self::MissingSecret | Self::InvalidSecret => Status::Forbidden,
            Self::MissingFields | Self::MissingShippingId | Self::NotFound => Status::NotFound,
            Self::InvalidBody | Self::InvalidShippingId => Status::BadRequest,
            Self::Internal(_) => Status::InternalServerError,
        }
    }
}

impl From<ShippingError> for ApiError {
    fn from(err: ShippingError) -> Self {
        match err {
            ShippingError::NotFound(_) => Self::NotFound,
            other => Self::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(source) = &self {
            error!(error = %source, "request failed");
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn body(err: ApiError) -> (u16, Value) {
        let res = err.into_response();
        (res.status_code(), serde_json::from_slice(res.body()).unwrap())
    }

    #[test]
    fn envelope_has_single_error_key() {
        let (status, value) = body(ApiError::MissingFields);
        assert_eq!(status, 404);
        assert_eq!(value, json!({ "error": "All fields required" }));
    }

    #[test]
    fn internal_detail_is_hidden() {
        let err = ApiError::from(ShippingError::Corrupt("status `lost`".into()));
        let (status, value) = body(err);
        assert_eq!(status, 500);
        assert_eq!(value, json!({ "error": "Internal Server Error" }));
    }

    #[test]
    fn repository_not_found_maps_to_404() {
        let err = ApiError::from(ShippingError::NotFound(9));
        assert!(matches!(err, ApiError::NotFound));
        assert_eq!(body(err).1, json!({ "error": "Shipping record not found" }));
    }

    #[test]
    fn auth_errors_are_forbidden() {
        assert_eq!(ApiError::MissingSecret.status(), Status::Forbidden);
        assert_eq!(ApiError::InvalidSecret.status(), Status::Forbidden);
    }
}
