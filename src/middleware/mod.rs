//! Middleware layer.
//!
//! Middleware intercepts a request before its handler runs and may
//! short-circuit with its own response. It is the home of cross-cutting
//! concerns: request tracing and shared-secret authentication.
//!
//! Attach middleware with [`Router::layer`](crate::Router::layer):
//!
//! ```rust,no_run
//! use shipping_api::middleware::{RequireSecret, Trace};
//! use shipping_api::{Method, Request, Router};
//!
//! async fn list(_req: Request) -> &'static str { "[]" }
//!
//! let app = Router::new()
//!     .on(Method::Get, "/get", list)
//!     .layer(RequireSecret::new("s3cret"))
//!     .layer(Trace);
//! ```

mod secret;
mod trace;

use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::request::Request;

pub use secret::{RequireSecret, SECRET_HEADER};
pub use trace::Trace;

/// A request interceptor.
///
/// Call `next.run(req)` to continue down the chain, or return a response of
/// your own to stop it there.
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

pub(crate) type BoxedMiddleware = Arc<dyn Middleware>;

/// The remainder of the chain after the current middleware.
pub struct Next {
    handler: BoxedHandler,
}

impl Next {
    /// Runs the wrapped handler (and any inner middleware).
    pub fn run(self, req: Request) -> BoxFuture {
        self.handler.call(req)
    }
}

/// A route handler with one middleware in front of it.
pub(crate) struct Layered {
    middleware: BoxedMiddleware,
    inner: BoxedHandler,
}

impl Layered {
    pub(crate) fn new(middleware: BoxedMiddleware, inner: BoxedHandler) -> Self {
        Self { middleware, inner }
    }
}

impl ErasedHandler for Layered {
    fn call(&self, req: Request) -> BoxFuture {
        let next = Next { handler: Arc::clone(&self.inner) };
        self.middleware.call(req, next)
    }
}
