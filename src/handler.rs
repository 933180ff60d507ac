//! Handler trait, type erasure and state binding.
//!
//! The router stores handlers of different concrete types side by side, so
//! every handler is erased behind `Arc<dyn ErasedHandler>`:
//!
//! ```text
//! async fn list(state: AppState, req: Request) -> Response   ← application code
//!        ↓ with_state(&state, list)
//! move |req| list(state.clone(), req)                         ← Fn(Request) -> Fut
//!        ↓ Handler blanket impl
//! Arc::new(FnHandler(closure))                                ← BoxedHandler
//!        ↓ at request time
//! Box::pin(async { fut.await.into_response() })               ← BoxFuture
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` because it appears in the signature of the public
/// [`Handler`] trait and of [`Middleware`](crate::middleware::Middleware).
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler.
///
/// Satisfied automatically by any `Fn(Request) -> impl Future<Output = impl IntoResponse>`.
/// Handlers that need shared state are adapted with [`with_state`].
/// The trait is sealed; only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Holds a concrete handler `F` and bridges it to [`ErasedHandler`].
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// Binds a clone of `state` to a two-argument handler, producing a plain
/// `Fn(Request)` handler the router accepts.
///
/// ```rust,no_run
/// # use shipping_api::{handler::with_state, Method, Request, Response, Router};
/// #[derive(Clone)]
/// struct Counter(u32);
///
/// async fn show(state: Counter, _req: Request) -> Response {
///     Response::text(state.0.to_string())
/// }
///
/// let app = Router::new().on(Method::Get, "/count", with_state(&Counter(7), show));
/// ```
pub fn with_state<S, F, Fut>(state: &S, f: F) -> impl Fn(Request) -> Fut + Send + Sync + use<S, F, Fut>
where
    S: Clone + Send + Sync + 'static,
    F: Fn(S, Request) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
{
    let state = state.clone();
    move |req| f(state.clone(), req)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;

    #[tokio::test]
    async fn boxed_handler_converts_return_value() {
        async fn hello(_req: Request) -> &'static str {
            "hello"
        }

        let handler = hello.into_boxed_handler();
        let res = handler.call(Request::test(Method::Get, "/", &[], b"")).await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.body(), b"hello");
    }

    #[tokio::test]
    async fn with_state_passes_a_clone_per_call() {
        async fn echo(state: Arc<String>, _req: Request) -> String {
            state.as_str().to_owned()
        }

        let handler = with_state(&Arc::new("bound".to_owned()), echo).into_boxed_handler();
        for _ in 0..2 {
            let res = handler.call(Request::test(Method::Get, "/", &[], b"")).await;
            assert_eq!(res.body(), b"bound");
        }
    }
}
