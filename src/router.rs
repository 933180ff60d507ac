//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. Middleware is attached
//! with [`Router::layer`], which wraps every route registered so far; routers
//! are composed with [`Router::nest`].

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;
use serde_json::json;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{BoxedMiddleware, Layered, Middleware};
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::status::Status;

struct Route {
    method: Method,
    path: String,
    handler: BoxedHandler,
}

/// Answers unmatched requests under a nested prefix, behind that router's
/// layers.
struct Fallback {
    prefix: String,
    handler: BoxedHandler,
}

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Every builder method returns `self` so registrations chain:
///
/// ```rust,no_run
/// # use shipping_api::{Method, Request, Response, Router};
/// # async fn create(_: Request) -> Response { Response::text("") }
/// # async fn list(_: Request) -> Response { Response::text("") }
/// let shipping = Router::new()
///     .on(Method::Post, "/create", create)
///     .on(Method::Get,  "/get",    list);
///
/// let app = Router::new().nest("/api/shipping", shipping);
/// ```
pub struct Router {
    routes: Vec<Route>,
    trees: HashMap<Method, MatchitRouter<BoxedHandler>>,
    layers: Vec<BoxedMiddleware>,
    fallbacks: Vec<Fallback>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new(), trees: HashMap::new(), layers: Vec::new(), fallbacks: Vec::new() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route pattern or conflicts with an
    /// existing route for the same method.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.insert(Route { method, path: path.to_owned(), handler: handler.into_boxed_handler() });
        self
    }

    /// Wraps every route and nested fallback registered so far in
    /// `middleware`.
    ///
    /// Routes added afterwards are not affected. Layers applied later run
    /// first, so the last `layer` call is the outermost.
    pub fn layer(self, middleware: impl Middleware) -> Self {
        let middleware: BoxedMiddleware = Arc::new(middleware);
        let wrap = |handler: BoxedHandler| -> BoxedHandler {
            Arc::new(Layered::new(Arc::clone(&middleware), handler))
        };

        let mut router = Self::new();
        for r in self.routes {
            router.insert(Route { handler: wrap(r.handler), ..r });
        }
        router.fallbacks = self.fallbacks.into_iter()
            .map(|f| Fallback { handler: wrap(f.handler), ..f })
            .collect();
        router.layers = self.layers;
        router.layers.push(Arc::clone(&middleware));
        router
    }

    /// Mounts every route of `other` under `prefix`, keeping its layers.
    ///
    /// Requests under `prefix` that match none of `other`'s routes still pass
    /// through `other`'s layers before being answered with `404`.
    pub fn nest(mut self, prefix: &str, other: Router) -> Self {
        let prefix = prefix.trim_end_matches('/');
        for route in other.routes {
            let path = format!("{prefix}{}", route.path);
            self.insert(Route { path, ..route });
        }
        for fallback in other.fallbacks {
            let prefix = format!("{prefix}{}", fallback.prefix);
            self.fallbacks.push(Fallback { prefix, ..fallback });
        }

        let handler = other.layers.iter().fold(
            unmatched.into_boxed_handler(),
            |inner, mw| -> BoxedHandler { Arc::new(Layered::new(Arc::clone(mw), inner)) },
        );
        self.fallbacks.push(Fallback { prefix: prefix.to_owned(), handler });
        self
    }

    fn insert(&mut self, route: Route) {
        self.trees
            .entry(route.method)
            .or_default()
            .insert(route.path.clone(), Arc::clone(&route.handler))
            .unwrap_or_else(|e| panic!("invalid route `{}`: {e}", route.path));
        self.routes.push(route);
    }

    pub(crate) fn lookup(&self, method: Method, path: &str) -> Option<BoxedHandler> {
        let tree = self.trees.get(&method)?;
        let matched = tree.at(path).ok()?;
        Some(Arc::clone(matched.value))
    }

    /// The fallback with the longest prefix covering `path`.
    fn fallback(&self, path: &str) -> Option<BoxedHandler> {
        self.fallbacks.iter()
            .filter(|f| {
                path.strip_prefix(f.prefix.as_str())
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
            })
            .max_by_key(|f| f.prefix.len())
            .map(|f| Arc::clone(&f.handler))
    }

    /// Routes one request and produces one response. Unmatched requests get
    /// `404 {"error": "Not Found"}`, after any nested router's layers.
    pub(crate) async fn handle(&self, req: Request) -> Response {
        match self.lookup(req.method, &req.path).or_else(|| self.fallback(&req.path)) {
            Some(handler) => handler.call(req).await,
            None => not_found(),
        }
    }
}

async fn unmatched(_req: Request) -> Response {
    not_found()
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

pub(crate) fn not_found() -> Response {
    (Status::NotFound, Json(json!({ "error": "Not Found" }))).into_response()
}
