//! Shared-secret authentication.
//!
//! Every guarded request must carry the `shipping_secret_key` header with the
//! exact configured value. The header name is matched case-insensitively.

use std::hint;
use std::sync::Arc;

use tracing::warn;

use super::{Middleware, Next};
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::IntoResponse;
use crate::shipping::ApiError;

/// Header carrying the shared secret.
pub const SECRET_HEADER: &str = "shipping_secret_key";

/// Rejects requests whose `shipping_secret_key` header is absent, empty, or
/// different from the configured secret with `403`.
#[derive(Clone)]
pub struct RequireSecret {
    secret: Arc<str>,
}

impl RequireSecret {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self { secret: secret.into() }
    }

    /// Checks a presented header value against the configured secret.
    pub fn verify(&self, presented: Option<&str>) -> Result<(), ApiError> {
        match presented {
            None | Some("") => Err(ApiError::MissingSecret),
            Some(key) if constant_time_eq(key.as_bytes(), self.secret.as_bytes()) => Ok(()),
            Some(_) => Err(ApiError::InvalidSecret),
        }
    }
}

impl std::fmt::Debug for RequireSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequireSecret").finish_non_exhaustive()
    }
}

impl Middleware for RequireSecret {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        match self.verify(req.header(SECRET_HEADER)) {
            Ok(()) => next.run(req),
            Err(e) => {
                warn!(path = %req.path(), reason = %e, "rejected request");
                let res = e.into_response();
                Box::pin(async move { res })
            }
        }
    }
}

/// Compares two byte strings without short-circuiting on the first
/// mismatching byte. Only the length comparison returns early.
///
/// Best effort: `black_box` keeps the optimizer from turning the fold back
/// into an early-exit loop, but the standard library makes no timing
/// guarantee.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a.iter()
        .zip(b)
        .fold(0u8, |acc, (x, y)| hint::black_box(acc | (x ^ y)));
    hint::black_box(diff) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Method, Response, Router};
    use serde_json::{json, Value};

    async fn reached(_req: Request) -> &'static str {
        "reached"
    }

    fn app() -> Router {
        Router::new()
            .on(Method::Get, "/get", reached)
            .layer(RequireSecret::new("s3cret"))
    }

    fn error_of(res: &Response) -> Value {
        serde_json::from_slice::<Value>(res.body()).unwrap()["error"].clone()
    }

    #[test]
    fn verify_distinguishes_missing_from_wrong() {
        let guard = RequireSecret::new("s3cret");
        assert!(guard.verify(Some("s3cret")).is_ok());
        assert!(matches!(guard.verify(None), Err(ApiError::MissingSecret)));
        assert!(matches!(guard.verify(Some("")), Err(ApiError::MissingSecret)));
        assert!(matches!(guard.verify(Some("s3cre")), Err(ApiError::InvalidSecret)));
        assert!(matches!(guard.verify(Some("S3CRET")), Err(ApiError::InvalidSecret)));
    }

    #[test]
    fn constant_time_eq_matches_slice_eq() {
        assert!(constant_time_eq(b"", b""));
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }

    #[test]
    fn constant_time_eq_sees_mismatch_in_any_position() {
        let secret = b"shipping-secret";
        for i in 0..secret.len() {
            let mut presented = *secret;
            presented[i] ^= 0x01;
            assert!(!constant_time_eq(&presented, secret), "byte {i}");
        }
        assert!(constant_time_eq(secret, secret));
    }

    #[tokio::test]
    async fn missing_header_is_forbidden() {
        let res = app().handle(Request::test(Method::Get, "/get", &[], b"")).await;
        assert_eq!(res.status_code(), 403);
        assert_eq!(error_of(&res), json!("SHIPPING_SECRET_KEY is missing or invalid"));
    }

    #[tokio::test]
    async fn wrong_header_is_forbidden() {
        let req = Request::test(Method::Get, "/get", &[(SECRET_HEADER, "nope")], b"");
        let res = app().handle(req).await;
        assert_eq!(res.status_code(), 403);
        assert_eq!(error_of(&res), json!("Failed to authenticate SHIPPING_SECRET_KEY"));
    }

    #[tokio::test]
    async fn matching_header_in_any_case_passes() {
        let req = Request::test(Method::Get, "/get", &[("SHIPPING_SECRET_KEY", "s3cret")], b"");
        let res = app().handle(req).await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.body(), b"reached");
    }
}
